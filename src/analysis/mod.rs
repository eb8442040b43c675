//! Analysis modules.
//!
//! `aggregator` holds the per-field statistics; `processing` composes them
//! into one result per dataset.

pub mod aggregator;
pub mod processing;

pub use processing::{
    analyze_csv_file, analyze_json_file, analyze_path, count_path, summarize_path, FieldSummary,
};
