//! Stats module - scope filtering, aggregation and page summaries

mod calculator;
mod summary;

pub use calculator::{
    AggregateCalculator, AggregateResult, CategoryShare, GroupShare, Headline, IncomeUsageCount,
    PipelineError, TransactionShare,
};
pub use summary::{GenderBreakdown, HomeSummary, OverviewSummary};
