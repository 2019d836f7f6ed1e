//! Data module - survey loading and field derivation

mod loader;
mod processor;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use loader::{DataSource, LoadError, ResponseTable};
pub(crate) use processor::text_column;
pub use processor::{
    derive_employment_status, derive_income_group, derive_usage_type, is_blank, non_blank,
    DerivedRow, DerivedTable, EmploymentStatus, IncomeGroup, ProcessorError, ResponseRow,
    UsageType, NOT_EMPLOYED_ANSWERS,
};
