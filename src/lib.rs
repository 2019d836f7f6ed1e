//! Cash vs Non-Cash payment survey dashboard.
//!
//! Loads the survey spreadsheet, derives categorical fields per respondent
//! and computes the summaries behind the Home and Overview pages.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;
pub mod telemetry;
