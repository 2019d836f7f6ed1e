//! Survey Data Loader Module
//! Handles spreadsheet loading into a Polars DataFrame of text columns.

use crate::data::schema;
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Survey file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Unsupported survey file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Workbook has no worksheets")]
    NoSheet,
    #[error("Survey sheet has no header row")]
    EmptySheet,
    #[error("Failed to build survey table: {0}")]
    Polars(#[from] PolarsError),
    #[error("Survey file is missing expected columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Survey file repeats columns after trimming headers: {}", .0.join(", "))]
    DuplicateColumns(Vec<String>),
}

/// Raw questionnaire answers, one row per respondent.
///
/// Every column is text with trimmed headers. The table is never mutated
/// after loading; callers share it by reference.
#[derive(Debug, Clone)]
pub struct ResponseTable {
    df: DataFrame,
    source: Option<PathBuf>,
}

impl ResponseTable {
    /// Normalize a DataFrame into a response table and check the schema.
    pub fn from_dataframe(df: DataFrame) -> Result<Self, LoadError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        let mut duplicates: Vec<String> = Vec::new();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) && !duplicates.contains(name) {
                duplicates.push(name.clone());
            }
        }
        if !duplicates.is_empty() {
            return Err(LoadError::DuplicateColumns(duplicates));
        }

        let columns = df
            .get_columns()
            .iter()
            .zip(names)
            .map(|(column, name)| {
                let mut text = column.cast(&DataType::String)?;
                text.rename(name.into());
                Ok(text)
            })
            .collect::<PolarsResult<Vec<Column>>>()?;
        let df = DataFrame::new(columns)?;

        let present = df.get_column_names();
        let missing: Vec<String> = schema::required_columns()
            .into_iter()
            .filter(|required| !present.iter().any(|name| name.as_str() == *required))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        Ok(Self { df, source: None })
    }

    /// Get list of column names.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get the number of respondents.
    pub fn get_row_count(&self) -> usize {
        self.df.height()
    }

    /// Get a reference to the underlying DataFrame.
    pub fn get_dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the file this table was read from, if any.
    pub fn get_source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Reads survey spreadsheets from disk.
pub struct DataSource;

impl DataSource {
    /// Load a survey file. Workbooks (`xlsx`, `xlsm`, `xls`, `ods`) are read from
    /// their first worksheet; `csv` files go through the Polars reader.
    pub fn load(path: impl AsRef<Path>) -> Result<ResponseTable, LoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let df = match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Self::read_workbook(path)?,
            "csv" => Self::read_csv(path)?,
            _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        };
        debug!(rows = df.height(), columns = df.width(), "read raw survey sheet");

        let mut table = ResponseTable::from_dataframe(df)?;
        table.source = Some(path.to_path_buf());

        info!(
            path = %path.display(),
            respondents = table.get_row_count(),
            "loaded survey responses"
        );
        Ok(table)
    }

    fn read_csv(path: &Path) -> Result<DataFrame, LoadError> {
        // Schema inference is disabled so every column stays text.
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;
        Ok(df)
    }

    fn read_workbook(path: &Path) -> Result<DataFrame, LoadError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range_at(0).ok_or(LoadError::NoSheet)??;

        let mut rows = range.rows();
        let header = rows.next().ok_or(LoadError::EmptySheet)?;
        let names: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell_text(cell) {
                Some(name) if !name.trim().is_empty() => name,
                _ => format!("column_{}", i + 1),
            })
            .collect();

        let mut values: Vec<Vec<Option<String>>> =
            vec![Vec::with_capacity(range.height().saturating_sub(1)); names.len()];
        for row in rows {
            for (i, column) in values.iter_mut().enumerate() {
                column.push(row.get(i).and_then(cell_text));
            }
        }

        let columns = names
            .into_iter()
            .zip(values)
            .map(|(name, vals)| Column::new(name.into(), vals))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Text form of a workbook cell; empty and error cells count as absent.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{frame, Respondent};

    #[test]
    fn headers_are_trimmed_and_values_become_text() {
        let mut df = frame(&[Respondent::cash()]);
        df.rename(schema::USAGE_COL, format!("{} ", schema::USAGE_COL).into())
            .unwrap();
        df.with_column(Column::new("Year".into(), vec![2023i64]))
            .unwrap();

        let table = ResponseTable::from_dataframe(df).unwrap();

        assert!(table.get_columns().iter().any(|c| c == schema::USAGE_COL));
        let year = table.get_dataframe().column("Year").unwrap();
        assert_eq!(year.dtype(), &DataType::String);
        assert_eq!(table.get_row_count(), 1);
    }

    #[test]
    fn missing_columns_are_named() {
        let df = frame(&[Respondent::cash()]);
        let df = df.drop(schema::INCOME_COL).unwrap();

        match ResponseTable::from_dataframe(df) {
            Err(LoadError::MissingColumns(missing)) => {
                assert_eq!(missing, vec![schema::INCOME_COL.to_string()]);
            }
            other => panic!("expected missing columns, got {other:?}"),
        }
    }

    #[test]
    fn headers_colliding_after_trim_are_named() {
        let mut df = frame(&[Respondent::cash()]);
        df.with_column(Column::new(
            format!("{} ", schema::REGION_COL).into(),
            vec!["Շիրակ"],
        ))
        .unwrap();

        match ResponseTable::from_dataframe(df) {
            Err(LoadError::DuplicateColumns(names)) => {
                assert_eq!(names, vec![schema::REGION_COL.to_string()]);
            }
            other => panic!("expected duplicate columns, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_reported() {
        let err = DataSource::load("does/not/exist.xlsx").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn cell_text_skips_empty_cells() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("Այո".into())), Some("Այո".into()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".into()));
    }
}
