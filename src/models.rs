//! Data models for the analysis toolkit.
//!
//! This module contains the core data structures used throughout
//! the application for representing records, value counts, and
//! analysis results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// A single field value as loaded from a data source.
///
/// CSV sources only ever produce `Text` (or `Null` for short rows); JSON
/// sources keep the natively encoded type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Absent or JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// Integral JSON number.
    Integer(i64),
    /// Non-integral (or out of `i64` range) JSON number.
    Float(f64),
    /// Text value; every CSV cell lands here.
    Text(String),
}

impl FieldValue {
    /// Coerce the value to a float, the way numeric aggregates need it.
    ///
    /// Text is trimmed before parsing. `Null` never converts.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Text(s) => parse_number(s.trim()),
        }
    }

    /// Render the value as a CSV cell.
    pub fn to_csv_cell(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

// Floats compare by bit pattern so the type can key a hash map.
impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Null => {}
            FieldValue::Bool(b) => b.hash(state),
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "None"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(i) => write!(f, "{}", i),
            // Debug keeps the trailing ".0" on integral floats
            FieldValue::Float(x) => write!(f, "{:?}", x),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parse a float, accepting single underscores between digits as group
/// separators (`1_000`).
fn parse_number(text: &str) -> Option<f64> {
    if !text.contains('_') {
        return text.parse().ok();
    }

    let bytes = text.as_bytes();
    let grouped = bytes.iter().enumerate().all(|(i, &b)| {
        b != b'_'
            || (i > 0
                && i + 1 < bytes.len()
                && bytes[i - 1].is_ascii_digit()
                && bytes[i + 1].is_ascii_digit())
    });
    if !grouped {
        return None;
    }

    text.replace('_', "").parse().ok()
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// One row/entity: field name to value, in source order.
pub type Record = IndexMap<String, FieldValue>;

/// Value frequencies in first-occurrence order.
pub type ValueCounts = IndexMap<FieldValue, usize>;

/// Format of a dataset file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JSON array of flat objects.
    Json,
    /// CSV with a header row.
    Csv,
}

impl SourceKind {
    /// Infer the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Some(SourceKind::Json),
            Some("csv") => Some(SourceKind::Csv),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Json => write!(f, "JSON"),
            SourceKind::Csv => write!(f, "CSV"),
        }
    }
}

/// Aggregate output describing one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Name of the analyzed file.
    pub source: String,
    /// Number of records loaded.
    pub record_count: usize,
    /// Mean of the `age` field.
    pub average_age: f64,
    /// Mean of the `salary` field (CSV datasets only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_salary: Option<f64>,
    /// Frequency of each `city` value (CSV datasets only).
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_distribution"
    )]
    pub city_distribution: Option<ValueCounts>,
    /// Minimum and maximum `salary` (CSV datasets only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<(f64, f64)>,
}

/// JSON object keys must be strings, so distribution keys go out as their
/// display form.
fn serialize_distribution<S>(dist: &Option<ValueCounts>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dist {
        Some(counts) => {
            let as_text: IndexMap<String, usize> = counts
                .iter()
                .map(|(value, count)| (value.to_string(), *count))
                .collect();
            as_text.serialize(serializer)
        }
        None => serializer.serialize_none(),
    }
}
