//! Dashboard Summary Module
//! Bundles the chart feeds of the Home and Overview pages.

use crate::data::{schema, DerivedTable, EmploymentStatus, UsageType};
use crate::stats::calculator::{
    AggregateCalculator, AggregateResult, GroupShare, Headline, IncomeUsageCount,
    PipelineError, TransactionShare,
};
use serde::Serialize;
use tracing::debug;

static EMPTY: AggregateResult = AggregateResult::Empty;

/// Gender split of one usage type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderBreakdown {
    pub usage_type: UsageType,
    pub genders: AggregateResult,
}

/// Everything the Home page draws. Independent of selectors except the
/// gender donut, which is precomputed for both usage types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeSummary {
    pub headline: Headline,
    pub survey_year: u16,
    pub coverage: String,
    pub usage: AggregateResult,
    pub gender_by_usage: Vec<GenderBreakdown>,
    pub region_non_cash_share: Vec<GroupShare>,
    pub income_usage: Vec<IncomeUsageCount>,
}

impl HomeSummary {
    pub fn build(
        table: &DerivedTable,
        survey_year: u16,
        coverage: &str,
    ) -> Result<Self, PipelineError> {
        let df = table.get_dataframe();

        let gender_by_usage = UsageType::ALL
            .into_iter()
            .map(|usage_type| {
                let scope =
                    AggregateCalculator::filter(df, &[(schema::USAGE_TYPE, usage_type.label())])?;
                Ok(GenderBreakdown {
                    usage_type,
                    genders: AggregateCalculator::aggregate_by_category(&scope, schema::GENDER)?,
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(Self {
            headline: AggregateCalculator::headline(df)?,
            survey_year,
            coverage: coverage.to_string(),
            usage: AggregateCalculator::aggregate_by_category(df, schema::USAGE_TYPE)?,
            gender_by_usage,
            region_non_cash_share: AggregateCalculator::share_by_group(
                df,
                schema::REGION,
                UsageType::NonCash,
            )?,
            income_usage: AggregateCalculator::count_by_income_and_usage(df)?,
        })
    }

    pub fn genders_for(&self, usage_type: UsageType) -> &AggregateResult {
        self.gender_by_usage
            .iter()
            .find(|g| g.usage_type == usage_type)
            .map(|g| &g.genders)
            .unwrap_or(&EMPTY)
    }
}

/// Everything the Overview page draws for one selector combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewSummary {
    pub usage_type: UsageType,
    pub employment_status: EmploymentStatus,
    pub respondents: usize,
    pub storage: AggregateResult,
    pub barriers: AggregateResult,
    pub transactions: Vec<TransactionShare>,
}

impl OverviewSummary {
    pub fn build(
        table: &DerivedTable,
        usage_type: UsageType,
        employment_status: EmploymentStatus,
    ) -> Result<Self, PipelineError> {
        let scope = AggregateCalculator::filter(
            table.get_dataframe(),
            &[
                (schema::USAGE_TYPE, usage_type.label()),
                (schema::EMPLOYMENT_STATUS, employment_status.label()),
            ],
        )?;
        debug!(
            usage = %usage_type,
            employment = %employment_status,
            respondents = scope.height(),
            "recomputing overview"
        );

        let reasons: Vec<(&str, &str)> = schema::REASON_COLUMNS
            .iter()
            .map(|column| (schema::option_label(column), *column))
            .collect();

        Ok(Self {
            usage_type,
            employment_status,
            respondents: scope.height(),
            storage: AggregateCalculator::aggregate_by_category(&scope, schema::STORAGE_COL)?,
            barriers: AggregateCalculator::aggregate_multi_column_group(&scope, &reasons)?,
            transactions: AggregateCalculator::transaction_comparison(&scope)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{frame, Respondent};
    use crate::data::ResponseTable;

    fn table() -> DerivedTable {
        let respondents = [
            Respondent::cash().with(|r| r.reasons = vec![1]),
            Respondent::cash().with(|r| r.gender = "Արական"),
            Respondent::non_cash().with(|r| r.banking = vec![3]),
        ];
        let responses = ResponseTable::from_dataframe(frame(&respondents)).unwrap();
        DerivedTable::from_responses(&responses).unwrap()
    }

    #[test]
    fn home_summary_covers_every_chart() {
        let home = HomeSummary::build(&table(), 2023, "Nationwide").unwrap();

        assert_eq!(home.headline.respondents, 3);
        assert_eq!(home.usage.get("Cash").map(|c| c.count), Some(2));
        assert_eq!(home.genders_for(UsageType::Cash).total_count(), 2);
        assert_eq!(home.genders_for(UsageType::NonCash).total_count(), 1);
        assert_eq!(home.region_non_cash_share.len(), 1);
        assert_eq!(home.income_usage.len(), 10);
    }

    #[test]
    fn overview_for_unmatched_selection_is_empty() {
        let overview =
            OverviewSummary::build(&table(), UsageType::NonCash, EmploymentStatus::Unemployed)
                .unwrap();

        assert_eq!(overview.respondents, 0);
        assert!(overview.storage.is_empty());
        assert!(overview.barriers.is_empty());
        assert!(overview.transactions.is_empty());
    }

    #[test]
    fn overview_slices_by_both_selectors() {
        let overview =
            OverviewSummary::build(&table(), UsageType::Cash, EmploymentStatus::Employed).unwrap();

        assert_eq!(overview.respondents, 2);
        assert_eq!(overview.barriers.total_count(), 1);
        assert_eq!(overview.storage.total_count(), 2);
    }

    #[test]
    fn summaries_serialize_to_json() {
        let home = HomeSummary::build(&table(), 2023, "Nationwide").unwrap();
        let json = serde_json::to_value(&home).unwrap();

        assert_eq!(json["headline"]["respondents"], 3);
        assert_eq!(json["usage"]["kind"], "categories");
        assert_eq!(json["gender_by_usage"][1]["usage_type"], "Non-Cash");
    }
}
