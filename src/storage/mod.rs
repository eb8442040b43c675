//! Dataset storage.
//!
//! This module supplies record sequences to the analysis layer and handles
//! file housekeeping around the data directory.

pub mod file_ops;
pub mod records;

pub use records::{convert, kind_for, load_records};
