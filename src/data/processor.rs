//! Data Processor Module
//! Derives the categorical fields the dashboard slices by.

use crate::data::schema;
use crate::data::ResponseTable;
use polars::prelude::*;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// True for absent answers and answers made only of whitespace.
pub fn is_blank(answer: Option<&str>) -> bool {
    answer.map_or(true, |s| s.trim().is_empty())
}

/// Trimmed answer, or `None` when blank.
pub fn non_blank(answer: Option<&str>) -> Option<&str> {
    answer.map(str::trim).filter(|s| !s.is_empty())
}

/// Payment habit of a respondent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum UsageType {
    #[serde(rename = "Cash")]
    Cash,
    #[serde(rename = "Non-Cash")]
    NonCash,
}

impl UsageType {
    pub const ALL: [UsageType; 2] = [UsageType::Cash, UsageType::NonCash];

    pub fn label(self) -> &'static str {
        match self {
            UsageType::Cash => "Cash",
            UsageType::NonCash => "Non-Cash",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.label() == label.trim())
    }
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EmploymentStatus {
    Employed,
    Unemployed,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 2] =
        [EmploymentStatus::Employed, EmploymentStatus::Unemployed];

    pub fn label(self) -> &'static str {
        match self {
            EmploymentStatus::Employed => "Employed",
            EmploymentStatus::Unemployed => "Unemployed",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label.trim())
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Monthly income bracket, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IncomeGroup {
    #[serde(rename = "Մինչև 100 000 դրամ")]
    UpTo100k,
    #[serde(rename = "101 001 - 200 000 դրամ")]
    From100kTo200k,
    #[serde(rename = "201 000 - 500 000 դրամ")]
    From200kTo500k,
    #[serde(rename = "501 000 - 1,000 000 դրամ")]
    From500kTo1m,
    #[serde(rename = "1,001 000 դրամ և ավել")]
    Above1m,
}

impl IncomeGroup {
    /// Brackets in display order.
    pub const ALL: [IncomeGroup; 5] = [
        IncomeGroup::UpTo100k,
        IncomeGroup::From100kTo200k,
        IncomeGroup::From200kTo500k,
        IncomeGroup::From500kTo1m,
        IncomeGroup::Above1m,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IncomeGroup::UpTo100k => "Մինչև 100 000 դրամ",
            IncomeGroup::From100kTo200k => "101 001 - 200 000 դրամ",
            IncomeGroup::From200kTo500k => "201 000 - 500 000 դրամ",
            IncomeGroup::From500kTo1m => "501 000 - 1,000 000 դրամ",
            IncomeGroup::Above1m => "1,001 000 դրամ և ավել",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.label() == label.trim())
    }
}

impl fmt::Display for IncomeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Employment answers that mean "not working".
pub const NOT_EMPLOYED_ANSWERS: [&str; 2] = [schema::ANSWER_NO, schema::ANSWER_NOT_WORKING];

/// "Yes" → non-cash, "No" → cash. Blank and unrecognized answers give `None`.
pub fn derive_usage_type(answer: Option<&str>) -> Option<UsageType> {
    match non_blank(answer)? {
        schema::ANSWER_YES => Some(UsageType::NonCash),
        schema::ANSWER_NO => Some(UsageType::Cash),
        _ => None,
    }
}

/// Blank answers and [`NOT_EMPLOYED_ANSWERS`] are unemployed.
///
/// Permissive default: any other answer counts as employed, including free
/// text that does not name an occupation. Survey answers are messy and are
/// bucketed rather than rejected.
pub fn derive_employment_status(answer: Option<&str>) -> EmploymentStatus {
    match non_blank(answer) {
        Some(a) if !NOT_EMPLOYED_ANSWERS.contains(&a) => EmploymentStatus::Employed,
        _ => EmploymentStatus::Unemployed,
    }
}

/// Exact bracket match; anything else stays unmatched.
pub fn derive_income_group(answer: Option<&str>) -> Option<IncomeGroup> {
    non_blank(answer).and_then(IncomeGroup::from_label)
}

/// The raw answers derivation reads, borrowed from one table row.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRow<'a> {
    pub usage: Option<&'a str>,
    pub employment: Option<&'a str>,
    pub region: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub income: Option<&'a str>,
}

/// A respondent with derived fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRow {
    /// `None` for a non-blank answer that is neither yes nor no.
    pub usage_type: Option<UsageType>,
    pub employment_status: EmploymentStatus,
    pub region: Option<String>,
    pub gender: Option<String>,
    pub income_group: Option<IncomeGroup>,
    /// Raw income answer, kept when it matches no bracket.
    pub income_answer: Option<String>,
}

impl DerivedRow {
    /// Derive a row; respondents who left the usage question blank are dropped.
    pub fn derive(row: &ResponseRow<'_>) -> Option<Self> {
        if is_blank(row.usage) {
            return None;
        }
        Some(Self {
            usage_type: derive_usage_type(row.usage),
            employment_status: derive_employment_status(row.employment),
            region: non_blank(row.region).map(str::to_string),
            gender: non_blank(row.gender).map(str::to_string),
            income_group: derive_income_group(row.income),
            income_answer: non_blank(row.income).map(str::to_string),
        })
    }
}

/// Survey table with derived columns, restricted to respondents who
/// answered the usage question.
#[derive(Debug, Clone)]
pub struct DerivedTable {
    df: DataFrame,
    rows: Vec<DerivedRow>,
}

impl DerivedTable {
    /// Derive every row of the response table.
    ///
    /// Output keeps all raw columns and adds: "Usage Type", "Employment Status",
    /// "Region", "Gender", "Income Group".
    pub fn from_responses(table: &ResponseTable) -> Result<Self, ProcessorError> {
        let raw = table.get_dataframe();
        let usage = text_column(raw, schema::USAGE_COL)?;
        let employment = text_column(raw, schema::EMPLOYMENT_COL)?;
        let region = text_column(raw, schema::REGION_COL)?;
        let gender = text_column(raw, schema::GENDER_COL)?;
        let income = text_column(raw, schema::INCOME_COL)?;

        let mut keep = Vec::with_capacity(raw.height());
        let mut rows = Vec::with_capacity(raw.height());
        for i in 0..raw.height() {
            let response = ResponseRow {
                usage: usage.get(i),
                employment: employment.get(i),
                region: region.get(i),
                gender: gender.get(i),
                income: income.get(i),
            };
            match DerivedRow::derive(&response) {
                Some(row) => {
                    keep.push(true);
                    rows.push(row);
                }
                None => keep.push(false),
            }
        }

        let mask: BooleanChunked = keep.into_iter().collect();
        let mut df = raw.filter(&mask)?;

        let usage_types: Vec<Option<&str>> = rows
            .iter()
            .map(|r| r.usage_type.map(UsageType::label))
            .collect();
        let statuses: Vec<&str> = rows.iter().map(|r| r.employment_status.label()).collect();
        let regions: Vec<Option<&str>> = rows.iter().map(|r| r.region.as_deref()).collect();
        let genders: Vec<Option<&str>> = rows.iter().map(|r| r.gender.as_deref()).collect();
        let incomes: Vec<Option<&str>> = rows
            .iter()
            .map(|r| r.income_group.map(IncomeGroup::label))
            .collect();

        df.with_column(Column::new(schema::USAGE_TYPE.into(), usage_types))?;
        df.with_column(Column::new(schema::EMPLOYMENT_STATUS.into(), statuses))?;
        df.with_column(Column::new(schema::REGION.into(), regions))?;
        df.with_column(Column::new(schema::GENDER.into(), genders))?;
        df.with_column(Column::new(schema::INCOME_GROUP.into(), incomes))?;

        let dropped = raw.height() - rows.len();
        if dropped > 0 {
            debug!(dropped, "excluded respondents with a blank usage answer");
        }
        let unmatched_income = rows
            .iter()
            .filter(|r| r.income_group.is_none() && r.income_answer.is_some())
            .count();
        if unmatched_income > 0 {
            debug!(unmatched_income, "income answers outside the bracket scale");
        }
        info!(respondents = rows.len(), "derived survey fields");

        Ok(Self { df, rows })
    }

    /// Get derived rows in table order.
    pub fn rows(&self) -> &[DerivedRow] {
        &self.rows
    }

    /// Get the DataFrame with raw and derived columns.
    pub fn get_dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn get_row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Borrow a text column from a DataFrame.
pub(crate) fn text_column<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<&'a StringChunked> {
    df.column(name)?.as_materialized_series().str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{frame, Respondent};

    fn table(respondents: &[Respondent]) -> DerivedTable {
        let responses = ResponseTable::from_dataframe(frame(respondents)).unwrap();
        DerivedTable::from_responses(&responses).unwrap()
    }

    #[test]
    fn blank_usage_rows_are_excluded() {
        let rows = [
            ResponseRow {
                usage: Some("Այո"),
                ..Default::default()
            },
            ResponseRow {
                usage: Some("Ոչ"),
                ..Default::default()
            },
            ResponseRow {
                usage: Some(""),
                ..Default::default()
            },
        ];
        let derived: Vec<DerivedRow> = rows.iter().filter_map(DerivedRow::derive).collect();

        assert_eq!(derived.len(), 2);
        assert_eq!(derived[0].usage_type, Some(UsageType::NonCash));
        assert_eq!(derived[1].usage_type, Some(UsageType::Cash));
    }

    #[test]
    fn employment_status_uses_exclusion_literals() {
        assert_eq!(
            derive_employment_status(Some("Ոչ")),
            EmploymentStatus::Unemployed
        );
        assert_eq!(
            derive_employment_status(Some("Չեմ աշխատում ")),
            EmploymentStatus::Unemployed
        );
        assert_eq!(
            derive_employment_status(Some("Teacher")),
            EmploymentStatus::Employed
        );
        assert_eq!(derive_employment_status(Some("")), EmploymentStatus::Unemployed);
        assert_eq!(derive_employment_status(None), EmploymentStatus::Unemployed);
        assert_eq!(
            derive_employment_status(Some("???")),
            EmploymentStatus::Employed
        );
    }

    #[test]
    fn income_brackets_are_ordered() {
        let mut groups: Vec<IncomeGroup> = ["1,001 000 դրամ և ավել", "Մինչև 100 000 դրամ", "501 000 - 1,000 000 դրամ"]
            .into_iter()
            .filter_map(|s| derive_income_group(Some(s)))
            .collect();
        groups.sort();

        assert_eq!(groups.last(), Some(&IncomeGroup::Above1m));
        assert_eq!(groups.first(), Some(&IncomeGroup::UpTo100k));
        assert_eq!(IncomeGroup::ALL.iter().max(), Some(&IncomeGroup::Above1m));
    }

    #[test]
    fn unknown_income_is_unmatched_not_coerced() {
        assert_eq!(derive_income_group(Some("շատ")), None);
        assert_eq!(derive_income_group(None), None);

        let row = DerivedRow::derive(&ResponseRow {
            usage: Some("Այո"),
            income: Some("շատ"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(row.income_group, None);
        assert_eq!(row.income_answer.as_deref(), Some("շատ"));
    }

    #[test]
    fn unrecognized_usage_keeps_the_row() {
        let row = DerivedRow::derive(&ResponseRow {
            usage: Some("Երբեմն"),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(row.usage_type, None);
    }

    #[test]
    fn derived_table_adds_columns_and_drops_blank_usage() {
        let derived = table(&[
            Respondent::cash(),
            Respondent::non_cash(),
            Respondent::cash().with(|r| r.usage = ""),
            Respondent::cash().with(|r| r.usage = "   "),
        ]);

        assert_eq!(derived.get_row_count(), 2);
        let df = derived.get_dataframe();
        assert_eq!(df.height(), 2);

        let usage = text_column(df, schema::USAGE_TYPE).unwrap();
        assert_eq!(usage.get(0), Some("Cash"));
        assert_eq!(usage.get(1), Some("Non-Cash"));
        let income = text_column(df, schema::INCOME_GROUP).unwrap();
        assert_eq!(income.get(1), Some("201 000 - 500 000 դրամ"));
    }

    #[test]
    fn derivation_is_deterministic() {
        let respondents = [
            Respondent::cash(),
            Respondent::non_cash().with(|r| r.employment = ""),
            Respondent::non_cash().with(|r| r.income = "unknown"),
        ];
        assert_eq!(table(&respondents).rows(), table(&respondents).rows());
    }
}
