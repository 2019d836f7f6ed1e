//! Aggregate Calculator Module
//! Filters survey scopes and turns them into counts and percentages for charts.

use crate::data::{non_blank, schema, text_column, IncomeGroup, UsageType};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Count and share of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

/// Category counts over a scope.
///
/// `Empty` means nothing in scope had an answer; charts show a placeholder
/// instead of zeroed slices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "categories", rename_all = "snake_case")]
pub enum AggregateResult {
    Empty,
    Categories(Vec<CategoryShare>),
}

impl AggregateResult {
    /// Percentages relative to the sum of all counts.
    fn from_counts(counts: Vec<(String, usize)>) -> Self {
        let total: usize = counts.iter().map(|(_, count)| count).sum();
        if total == 0 {
            return AggregateResult::Empty;
        }
        AggregateResult::Categories(
            counts
                .into_iter()
                .map(|(label, count)| CategoryShare {
                    percent: count as f64 / total as f64 * 100.0,
                    label,
                    count,
                })
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, AggregateResult::Empty)
    }

    pub fn categories(&self) -> &[CategoryShare] {
        match self {
            AggregateResult::Empty => &[],
            AggregateResult::Categories(categories) => categories,
        }
    }

    pub fn get(&self, label: &str) -> Option<&CategoryShare> {
        self.categories().iter().find(|c| c.label == label)
    }

    pub fn total_count(&self) -> usize {
        self.categories().iter().map(|c| c.count).sum()
    }
}

/// Share of a group's respondents with a given usage type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupShare {
    pub label: String,
    pub respondents: usize,
    pub matching: usize,
    pub percent: f64,
}

/// Respondent count for one income bracket and usage type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeUsageCount {
    pub income_group: IncomeGroup,
    pub usage_type: UsageType,
    pub count: usize,
}

/// Headline respondent figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Headline {
    pub respondents: usize,
    pub non_cash: usize,
    pub cash: usize,
}

/// Transaction type shares for both payment channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionShare {
    pub transaction_type: String,
    pub banking_percent: f64,
    pub wallet_percent: f64,
}

/// Stateless aggregation over survey scopes.
pub struct AggregateCalculator;

impl AggregateCalculator {
    /// Keep rows where every `field` equals its accepted value.
    ///
    /// A value that never occurs gives an empty scope; no predicates gives the
    /// whole input back.
    pub fn filter(
        scope: &DataFrame,
        predicates: &[(&str, &str)],
    ) -> Result<DataFrame, PipelineError> {
        let mut condition: Option<Expr> = None;
        for &(field, value) in predicates {
            if scope.column(field).is_err() {
                return Err(PipelineError::UnknownField(field.to_string()));
            }
            let expr = col(field).eq(lit(value));
            condition = Some(match condition {
                Some(acc) => acc.and(expr),
                None => expr,
            });
        }

        match condition {
            Some(condition) => Ok(scope.clone().lazy().filter(condition).collect()?),
            None => Ok(scope.clone()),
        }
    }

    /// Count non-blank values of `value_col` per distinct value.
    ///
    /// Percentages are taken over the answered rows in scope, largest
    /// category first (ties by label).
    pub fn aggregate_by_category(
        scope: &DataFrame,
        value_col: &str,
    ) -> Result<AggregateResult, PipelineError> {
        let values = Self::text(scope, value_col)?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values.into_iter().filter_map(non_blank) {
            *counts.entry(value).or_insert(0) += 1;
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Ok(AggregateResult::from_counts(counts))
    }

    /// Count answered cells of several yes/no-style columns.
    ///
    /// Each column is one category, in the given order. Percentages are taken
    /// over the total number of answered cells across all listed columns, not
    /// over the row count.
    pub fn aggregate_multi_column_group(
        scope: &DataFrame,
        columns: &[(&str, &str)],
    ) -> Result<AggregateResult, PipelineError> {
        let counts = columns
            .iter()
            .map(|&(label, column)| {
                let values = Self::text(scope, column)?;
                let count = values.into_iter().filter_map(non_blank).count();
                Ok((label.to_string(), count))
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(AggregateResult::from_counts(counts))
    }

    /// Non-blank values of a column in order of first appearance.
    pub fn distinct_values(scope: &DataFrame, column: &str) -> Result<Vec<String>, PipelineError> {
        let values = Self::text(scope, column)?;
        let mut seen: Vec<String> = Vec::new();
        for value in values.into_iter().filter_map(non_blank) {
            if !seen.iter().any(|s| s == value) {
                seen.push(value.to_string());
            }
        }
        Ok(seen)
    }

    /// Percentage of each group's rows whose usage type is `usage`,
    /// lowest share first.
    pub fn share_by_group(
        scope: &DataFrame,
        group_col: &str,
        usage: UsageType,
    ) -> Result<Vec<GroupShare>, PipelineError> {
        let groups = Self::text(scope, group_col)?;
        let usage_types = Self::text(scope, schema::USAGE_TYPE)?;

        let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
        for (group, usage_type) in groups.into_iter().zip(usage_types) {
            let Some(group) = non_blank(group) else {
                continue;
            };
            let entry = tally.entry(group).or_insert((0, 0));
            entry.0 += 1;
            if usage_type.and_then(UsageType::from_label) == Some(usage) {
                entry.1 += 1;
            }
        }

        let mut shares: Vec<GroupShare> = tally
            .into_iter()
            .map(|(label, (respondents, matching))| GroupShare {
                label: label.to_string(),
                respondents,
                matching,
                percent: matching as f64 / respondents as f64 * 100.0,
            })
            .collect();
        shares.sort_by(|a, b| {
            a.percent
                .total_cmp(&b.percent)
                .then_with(|| a.label.cmp(&b.label))
        });
        Ok(shares)
    }

    /// Respondents per income bracket and usage type, zero-filled, in bracket
    /// order. Unmatched incomes are left out.
    pub fn count_by_income_and_usage(
        scope: &DataFrame,
    ) -> Result<Vec<IncomeUsageCount>, PipelineError> {
        let incomes = Self::text(scope, schema::INCOME_GROUP)?;
        let usage_types = Self::text(scope, schema::USAGE_TYPE)?;

        let mut tally: HashMap<(IncomeGroup, UsageType), usize> = HashMap::new();
        for (income, usage_type) in incomes.into_iter().zip(usage_types) {
            let income = income.and_then(IncomeGroup::from_label);
            let usage_type = usage_type.and_then(UsageType::from_label);
            if let (Some(income), Some(usage_type)) = (income, usage_type) {
                *tally.entry((income, usage_type)).or_insert(0) += 1;
            }
        }

        Ok(IncomeGroup::ALL
            .into_iter()
            .flat_map(|income_group| {
                UsageType::ALL
                    .into_iter()
                    .map(move |usage_type| (income_group, usage_type))
            })
            .map(|(income_group, usage_type)| IncomeUsageCount {
                income_group,
                usage_type,
                count: tally.get(&(income_group, usage_type)).copied().unwrap_or(0),
            })
            .collect())
    }

    /// Respondent totals; everyone who is not a non-cash user counts as cash.
    pub fn headline(scope: &DataFrame) -> Result<Headline, PipelineError> {
        let usage_types = Self::text(scope, schema::USAGE_TYPE)?;
        let respondents = scope.height();
        let non_cash = usage_types
            .into_iter()
            .filter(|u| u.and_then(UsageType::from_label) == Some(UsageType::NonCash))
            .count();
        Ok(Headline {
            respondents,
            non_cash,
            cash: respondents - non_cash,
        })
    }

    /// Transaction type shares per channel, each channel normalized over its
    /// own answered cells. Types unused in both channels are dropped.
    pub fn transaction_comparison(
        scope: &DataFrame,
    ) -> Result<Vec<TransactionShare>, PipelineError> {
        let banking_cols: Vec<(&str, &str)> = schema::TRANSACTION_TYPES
            .into_iter()
            .zip(schema::BANKING_COLUMNS)
            .collect();
        let wallet_cols: Vec<(&str, &str)> = schema::TRANSACTION_TYPES
            .into_iter()
            .zip(schema::WALLET_COLUMNS)
            .collect();

        let banking = Self::aggregate_multi_column_group(scope, &banking_cols)?;
        let wallet = Self::aggregate_multi_column_group(scope, &wallet_cols)?;
        let percent = |result: &AggregateResult, label: &str| {
            result.get(label).map(|c| c.percent).unwrap_or(0.0)
        };

        Ok(schema::TRANSACTION_TYPES
            .into_iter()
            .map(|transaction_type| TransactionShare {
                transaction_type: transaction_type.to_string(),
                banking_percent: percent(&banking, transaction_type),
                wallet_percent: percent(&wallet, transaction_type),
            })
            .filter(|share| share.banking_percent > 0.0 || share.wallet_percent > 0.0)
            .collect())
    }

    fn text<'a>(scope: &'a DataFrame, column: &str) -> Result<&'a StringChunked, PipelineError> {
        if scope.column(column).is_err() {
            return Err(PipelineError::UnknownField(column.to_string()));
        }
        Ok(text_column(scope, column)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{frame, Respondent};
    use crate::data::{DerivedTable, ResponseTable};

    fn scope(respondents: &[Respondent]) -> DataFrame {
        let responses = ResponseTable::from_dataframe(frame(respondents)).unwrap();
        DerivedTable::from_responses(&responses)
            .unwrap()
            .get_dataframe()
            .clone()
    }

    fn sample() -> DataFrame {
        scope(&[
            Respondent::cash(),
            Respondent::cash().with(|r| {
                r.employment = "Չեմ աշխատում";
                r.region = "Շիրակ";
                r.storage = "";
                r.reasons = vec![0, 5];
            }),
            Respondent::cash().with(|r| {
                r.employment = "";
                r.region = "Շիրակ";
                r.gender = "Արական";
                r.reasons = vec![5];
            }),
            Respondent::non_cash().with(|r| {
                r.banking = vec![0, 2, 4];
                r.wallet = vec![2];
            }),
            Respondent::non_cash().with(|r| {
                r.income = "1,001 000 դրամ և ավել";
                r.banking = vec![2];
                r.wallet = vec![2, 3];
            }),
            Respondent::non_cash().with(|r| {
                r.region = "Շիրակ";
                r.income = "not sure";
            }),
        ])
    }

    fn assert_sums_to_100(result: &AggregateResult) {
        let sum: f64 = result.categories().iter().map(|c| c.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn category_percentages_sum_to_100() {
        let df = sample();
        for column in [schema::USAGE_TYPE, schema::GENDER, schema::STORAGE_COL] {
            let result = AggregateCalculator::aggregate_by_category(&df, column).unwrap();
            assert!(!result.is_empty());
            assert_sums_to_100(&result);
        }
    }

    #[test]
    fn category_counts_skip_blanks_and_sort_by_count() {
        let result = AggregateCalculator::aggregate_by_category(&sample(), schema::STORAGE_COL)
            .unwrap();
        let categories = result.categories();

        assert_eq!(result.total_count(), 5);
        assert_eq!(categories[0].label, "Անկանխիկ");
        assert_eq!(categories[0].count, 3);
        assert!((categories[0].percent - 60.0).abs() < 1e-9);
        assert_eq!(categories[1].label, "Կանխիկ");
    }

    #[test]
    fn empty_scope_gives_empty_result() {
        let df = sample();
        let none = AggregateCalculator::filter(&df, &[(schema::USAGE_TYPE, "Barter")]).unwrap();
        assert_eq!(none.height(), 0);

        let result = AggregateCalculator::aggregate_by_category(&none, schema::GENDER).unwrap();
        assert_eq!(result, AggregateResult::Empty);
        assert!(result.categories().iter().all(|c| !c.percent.is_nan()));
    }

    #[test]
    fn all_blank_column_gives_empty_result() {
        let df = scope(&[Respondent::cash().with(|r| r.storage = "")]);
        let result = AggregateCalculator::aggregate_by_category(&df, schema::STORAGE_COL).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn filter_intersects_predicates() {
        let df = sample();
        let cash_unemployed = AggregateCalculator::filter(
            &df,
            &[
                (schema::USAGE_TYPE, "Cash"),
                (schema::EMPLOYMENT_STATUS, "Unemployed"),
            ],
        )
        .unwrap();
        assert_eq!(cash_unemployed.height(), 2);

        let all = AggregateCalculator::filter(&df, &[]).unwrap();
        assert_eq!(all.height(), df.height());
    }

    #[test]
    fn filter_rejects_unknown_fields() {
        let err = AggregateCalculator::filter(&sample(), &[("Shoe Size", "42")]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownField(f) if f == "Shoe Size"));
    }

    #[test]
    fn multi_column_group_normalizes_by_total_occurrences() {
        let df = sample();
        let cash = AggregateCalculator::filter(&df, &[(schema::USAGE_TYPE, "Cash")]).unwrap();
        let columns: Vec<(&str, &str)> = schema::REASON_COLUMNS
            .iter()
            .map(|c| (schema::option_label(c), *c))
            .collect();

        let result = AggregateCalculator::aggregate_multi_column_group(&cash, &columns).unwrap();

        // Three ticks over three respondents: 1 knowledge, 2 habit.
        assert_eq!(result.categories().len(), 6);
        assert_eq!(result.total_count(), 3);
        let habit = result.get("Սովորություն").unwrap();
        assert_eq!(habit.count, 2);
        assert!((habit.percent - 200.0 / 3.0).abs() < 1e-9);
        assert_sums_to_100(&result);
    }

    #[test]
    fn multi_column_group_without_answers_is_empty() {
        let df = sample();
        let non_cash =
            AggregateCalculator::filter(&df, &[(schema::USAGE_TYPE, "Non-Cash")]).unwrap();
        let columns: Vec<(&str, &str)> = schema::REASON_COLUMNS
            .iter()
            .map(|c| (schema::option_label(c), *c))
            .collect();

        let result =
            AggregateCalculator::aggregate_multi_column_group(&non_cash, &columns).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn distinct_values_keep_first_appearance_order() {
        let values = AggregateCalculator::distinct_values(&sample(), schema::USAGE_TYPE).unwrap();
        assert_eq!(values, vec!["Cash".to_string(), "Non-Cash".to_string()]);
    }

    #[test]
    fn region_shares_sort_ascending() {
        let shares =
            AggregateCalculator::share_by_group(&sample(), schema::REGION, UsageType::NonCash)
                .unwrap();

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].label, "Շիրակ");
        assert_eq!(shares[0].respondents, 3);
        assert!((shares[0].percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(shares[1].label, "Երևան");
        assert!((shares[1].percent - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn income_counts_are_zero_filled_in_bracket_order() {
        let counts = AggregateCalculator::count_by_income_and_usage(&sample()).unwrap();

        assert_eq!(counts.len(), IncomeGroup::ALL.len() * UsageType::ALL.len());
        assert_eq!(counts[0].income_group, IncomeGroup::UpTo100k);
        assert_eq!(counts[0].usage_type, UsageType::Cash);
        assert_eq!(counts[0].count, 3);
        assert_eq!(counts.last().unwrap().income_group, IncomeGroup::Above1m);

        let total: usize = counts.iter().map(|c| c.count).sum();
        // The "not sure" income answer is unmatched.
        assert_eq!(total, 5);
    }

    #[test]
    fn headline_counts_cash_as_remainder() {
        let headline = AggregateCalculator::headline(&sample()).unwrap();
        assert_eq!(
            headline,
            Headline {
                respondents: 6,
                non_cash: 3,
                cash: 3
            }
        );
    }

    #[test]
    fn transaction_comparison_normalizes_per_channel_and_drops_unused() {
        let shares = AggregateCalculator::transaction_comparison(&sample()).unwrap();

        // Index 1 (cross-border transfers) is unused in both channels.
        assert_eq!(shares.len(), 4);
        assert!(shares
            .iter()
            .all(|s| s.transaction_type != schema::TRANSACTION_TYPES[1]));

        let payments = shares
            .iter()
            .find(|s| s.transaction_type == schema::TRANSACTION_TYPES[2])
            .unwrap();
        assert!((payments.banking_percent - 50.0).abs() < 1e-9);
        assert!((payments.wallet_percent - 200.0 / 3.0).abs() < 1e-9);

        let banking_sum: f64 = shares.iter().map(|s| s.banking_percent).sum();
        assert!((banking_sum - 100.0).abs() < 1e-9);
    }
}
