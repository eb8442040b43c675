//! Dataset-level analysis.
//!
//! Composes aggregator calls into one [`AnalysisResult`] per dataset. Field
//! names are fixed by the dataset shape: `age` for every dataset, plus
//! `salary` and `city` for CSV datasets.

use super::aggregator::{average, count_by_value, min_max, sum_field};
use crate::config::Config;
use crate::error::{DataError, StatsError};
use crate::models::{AnalysisResult, Record, SourceKind, ValueCounts};
use crate::storage::{kind_for, load_records};
use std::path::Path;
use tracing::{debug, info};

const AGE_FIELD: &str = "age";
const SALARY_FIELD: &str = "salary";
const CITY_FIELD: &str = "city";

/// Analyze an in-memory record sequence.
///
/// Any aggregator failure aborts the whole analysis.
pub fn analyze(
    records: &[Record],
    source: &str,
    kind: SourceKind,
) -> Result<AnalysisResult, StatsError> {
    debug!("Analyzing {} records from {} ({})", records.len(), source, kind);

    let average_age = average(records, AGE_FIELD)?;

    let mut result = AnalysisResult {
        source: source.to_string(),
        record_count: records.len(),
        average_age,
        average_salary: None,
        city_distribution: None,
        salary_range: None,
    };

    if kind == SourceKind::Csv {
        result.average_salary = Some(average(records, SALARY_FIELD)?);
        result.city_distribution = Some(count_by_value(records, CITY_FIELD));
        result.salary_range = Some(min_max(records, SALARY_FIELD)?);
    }

    Ok(result)
}

/// Load `path` as `kind` and analyze it under `source`.
fn analyze_file(path: &Path, source: &str, kind: SourceKind) -> Result<AnalysisResult, DataError> {
    info!("Loading {} dataset: {}", kind, path.display());
    let records = load_records(path, kind)?;
    Ok(analyze(&records, source, kind)?)
}

/// Analyze a JSON dataset from the data directory (configured default when
/// `filename` is `None`).
pub fn analyze_json_file(
    config: &Config,
    filename: Option<&str>,
) -> Result<AnalysisResult, DataError> {
    let filename = filename.unwrap_or(&config.data.json_file);
    analyze_file(&config.data_path(filename), filename, SourceKind::Json)
}

/// Analyze a CSV dataset from the data directory (configured default when
/// `filename` is `None`).
pub fn analyze_csv_file(
    config: &Config,
    filename: Option<&str>,
) -> Result<AnalysisResult, DataError> {
    let filename = filename.unwrap_or(&config.data.csv_file);
    analyze_file(&config.data_path(filename), filename, SourceKind::Csv)
}

/// Analyze an arbitrary dataset path, inferring the format from its extension.
pub fn analyze_path(path: &Path) -> Result<AnalysisResult, DataError> {
    let kind = kind_for(path)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    analyze_file(path, &source, kind)
}

/// Numeric summary of one arbitrary field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSummary {
    pub field: String,
    pub record_count: usize,
    pub sum: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarize a numeric field. Fails like the underlying aggregates do.
pub fn summarize_field(records: &[Record], field: &str) -> Result<FieldSummary, StatsError> {
    let (min, max) = min_max(records, field)?;

    Ok(FieldSummary {
        field: field.to_string(),
        record_count: records.len(),
        sum: sum_field(records, field)?,
        average: average(records, field)?,
        min,
        max,
    })
}

/// Load a dataset by path and summarize one numeric field.
pub fn summarize_path(path: &Path, field: &str) -> Result<FieldSummary, DataError> {
    let records = load_path(path)?;
    Ok(summarize_field(&records, field)?)
}

/// Load a dataset by path and count the values of one field.
pub fn count_path(path: &Path, field: &str) -> Result<ValueCounts, DataError> {
    let records = load_path(path)?;
    Ok(count_by_value(&records, field))
}

fn load_path(path: &Path) -> Result<Vec<Record>, DataError> {
    load_records(path, kind_for(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use tempfile::TempDir;

    const PEOPLE_CSV: &str = "\
name,age,city,salary
Anna,28,Stockholm,42000
Erik,35,Göteborg,51000
Maja,42,Stockholm,38000
Olle,31,Malmö,45500
";

    const DATA_JSON: &str = r#"[
    {"name": "Anna", "age": 28},
    {"name": "Erik", "age": 35.5},
    {"name": "Maja", "age": "42"}
]"#;

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::default();
        config.data.data_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_analyze_json_shape() {
        let records: Vec<Record> = serde_json::from_str(DATA_JSON).unwrap();
        let result = analyze(&records, "data.json", SourceKind::Json).unwrap();

        assert_eq!(result.source, "data.json");
        assert_eq!(result.record_count, 3);
        assert!((result.average_age - 35.166666666666664).abs() < 1e-9);
        assert_eq!(result.average_salary, None);
        assert_eq!(result.city_distribution, None);
        assert_eq!(result.salary_range, None);
    }

    #[test]
    fn test_analyze_csv_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("people.csv"), PEOPLE_CSV).unwrap();

        let result = analyze_csv_file(&config_for(dir.path()), None).unwrap();
        assert_eq!(result.source, "people.csv");
        assert_eq!(result.record_count, 4);
        assert_eq!(result.average_age, 34.0);
        assert!((result.average_salary.unwrap() - 44125.0).abs() < 1e-6);
        assert_eq!(result.salary_range, Some((38000.0, 51000.0)));

        let dist = result.city_distribution.unwrap();
        let pairs: Vec<_> = dist.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        assert_eq!(
            pairs,
            vec![
                ("Stockholm".to_string(), 2),
                ("Göteborg".to_string(), 1),
                ("Malmö".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_analyze_json_file_named() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("team.json"), DATA_JSON).unwrap();

        let result = analyze_json_file(&config_for(dir.path()), Some("team.json")).unwrap();
        assert_eq!(result.source, "team.json");
        assert_eq!(result.record_count, 3);
    }

    #[test]
    fn test_empty_dataset_aborts() {
        let err = analyze(&[], "empty.csv", SourceKind::Csv).unwrap_err();
        assert_eq!(err, StatsError::EmptyDataset { operation: "average" });
    }

    #[test]
    fn test_bad_salary_aborts() {
        let mut record = Record::new();
        record.insert("age".to_string(), FieldValue::from("30"));
        record.insert("salary".to_string(), FieldValue::from("lots"));
        record.insert("city".to_string(), FieldValue::from("Lund"));

        assert!(analyze(&[record.clone()], "x.json", SourceKind::Json).is_ok());
        assert!(matches!(
            analyze(&[record], "x.csv", SourceKind::Csv),
            Err(StatsError::NonNumericField { field, .. }) if field == "salary"
        ));
    }

    #[test]
    fn test_summarize_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        std::fs::write(&path, PEOPLE_CSV).unwrap();

        let summary = summarize_path(&path, "age").unwrap();
        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.sum, 136.0);
        assert_eq!(summary.average, 34.0);
        assert_eq!((summary.min, summary.max), (28.0, 42.0));

        assert!(matches!(
            summarize_path(&path, "name"),
            Err(DataError::Stats(StatsError::NonNumericField { .. }))
        ));
        assert!(matches!(
            summarize_path(&path, "height"),
            Err(DataError::Stats(StatsError::MissingField { .. }))
        ));

        let counts = count_path(&path, "height").unwrap();
        assert_eq!(counts.get(&FieldValue::Null), Some(&4));
    }

    #[test]
    fn test_analyze_path() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("people.csv");
        std::fs::write(&csv_path, PEOPLE_CSV).unwrap();

        let result = analyze_path(&csv_path).unwrap();
        assert_eq!(result.source, "people.csv");
        assert!(result.salary_range.is_some());

        let txt_path = dir.path().join("people.txt");
        std::fs::write(&txt_path, PEOPLE_CSV).unwrap();
        assert!(matches!(
            analyze_path(&txt_path),
            Err(DataError::UnknownFormat { .. })
        ));

        assert!(matches!(
            analyze_path(&dir.path().join("missing.json")),
            Err(DataError::NotFound { .. })
        ));
    }
}
