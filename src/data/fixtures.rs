//! In-memory survey frames for unit tests.

use crate::data::schema;
use polars::prelude::*;

/// One synthetic respondent. Empty strings become absent cells.
#[derive(Debug, Clone, Default)]
pub struct Respondent {
    pub usage: &'static str,
    pub employment: &'static str,
    pub region: &'static str,
    pub gender: &'static str,
    pub income: &'static str,
    pub storage: &'static str,
    /// Indices into [`schema::REASON_COLUMNS`] this respondent ticked.
    pub reasons: Vec<usize>,
    /// Indices into [`schema::BANKING_COLUMNS`].
    pub banking: Vec<usize>,
    /// Indices into [`schema::WALLET_COLUMNS`].
    pub wallet: Vec<usize>,
}

impl Respondent {
    pub fn cash() -> Self {
        Self {
            usage: schema::ANSWER_NO,
            employment: "Ուսուցիչ",
            region: "Երևան",
            gender: "Իգական",
            income: "Մինչև 100 000 դրամ",
            storage: "Կանխիկ",
            ..Self::default()
        }
    }

    pub fn non_cash() -> Self {
        Self {
            usage: schema::ANSWER_YES,
            employment: "Ծրագրավորող",
            region: "Երևան",
            gender: "Արական",
            income: "201 000 - 500 000 դրամ",
            storage: "Անկանխիկ",
            ..Self::default()
        }
    }

    pub fn with(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

fn cell(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn ticked(selected: &[usize], index: usize, column: &str) -> Option<String> {
    selected
        .contains(&index)
        .then(|| schema::option_label(column).to_string())
}

fn text(
    respondents: &[Respondent],
    name: &str,
    f: impl Fn(&Respondent) -> Option<String>,
) -> Column {
    Column::new(name.into(), respondents.iter().map(f).collect::<Vec<_>>())
}

/// Build a raw survey frame carrying every required column.
pub fn frame(respondents: &[Respondent]) -> DataFrame {
    let rs = respondents;
    let mut columns = vec![
        text(rs, schema::USAGE_COL, |r| cell(r.usage)),
        text(rs, schema::EMPLOYMENT_COL, |r| cell(r.employment)),
        text(rs, schema::REGION_COL, |r| cell(r.region)),
        text(rs, schema::GENDER_COL, |r| cell(r.gender)),
        text(rs, schema::INCOME_COL, |r| cell(r.income)),
        text(rs, schema::STORAGE_COL, |r| cell(r.storage)),
    ];
    for (i, name) in schema::REASON_COLUMNS.iter().enumerate() {
        columns.push(text(rs, name, |r| ticked(&r.reasons, i, name)));
    }
    for (i, name) in schema::BANKING_COLUMNS.iter().enumerate() {
        columns.push(text(rs, name, |r| ticked(&r.banking, i, name)));
    }
    for (i, name) in schema::WALLET_COLUMNS.iter().enumerate() {
        columns.push(text(rs, name, |r| ticked(&r.wallet, i, name)));
    }

    DataFrame::new(columns).expect("fixture columns have equal length")
}
