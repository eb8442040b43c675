//! Field aggregation and statistics.
//!
//! Stateless functions computing averages, sums, extremes, and value
//! frequencies over one field of a record sequence.

use crate::error::StatsError;
use crate::models::{FieldValue, Record, ValueCounts};

/// Look up `field` and coerce it to a float, failing on absence or bad data.
fn numeric_value(record: &Record, field: &str) -> Result<f64, StatsError> {
    let value = record.get(field).ok_or_else(|| StatsError::MissingField {
        field: field.to_string(),
    })?;

    value.to_f64().ok_or_else(|| StatsError::NonNumericField {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Arithmetic mean of a numeric field over all records.
///
/// Every record must carry the field and its value must convert to a float;
/// the first offending record aborts the computation.
pub fn average(records: &[Record], field: &str) -> Result<f64, StatsError> {
    if records.is_empty() {
        return Err(StatsError::EmptyDataset { operation: "average" });
    }

    let mut mean = 0.0;
    for (i, record) in records.iter().enumerate() {
        let value = numeric_value(record, field)?;
        // Running mean: identical inputs reproduce themselves exactly, and
        // skipping equal values keeps infinities from turning into NaN
        if value != mean {
            mean += (value - mean) / (i + 1) as f64;
        }
    }

    Ok(mean)
}

/// Sum of a numeric field. Empty input sums to `0.0`.
pub fn sum_field(records: &[Record], field: &str) -> Result<f64, StatsError> {
    records.iter().try_fold(0.0_f64, |acc, record| {
        numeric_value(record, field).map(|value| acc + value)
    })
}

/// Count occurrences of each value of `field`.
///
/// A record without the field counts under [`FieldValue::Null`]. Keys keep
/// the order in which each value was first seen.
pub fn count_by_value(records: &[Record], field: &str) -> ValueCounts {
    let mut counts = ValueCounts::new();

    for record in records {
        let value = record.get(field).cloned().unwrap_or(FieldValue::Null);
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
}

/// Minimum and maximum of a numeric field.
///
/// An extreme is only replaced on a strict comparison, so the first of
/// several equal values wins.
pub fn min_max(records: &[Record], field: &str) -> Result<(f64, f64), StatsError> {
    let (first, rest) = records
        .split_first()
        .ok_or(StatsError::EmptyDataset { operation: "min/max" })?;

    let initial = numeric_value(first, field)?;
    let (mut min, mut max) = (initial, initial);

    for record in rest {
        let value = numeric_value(record, field)?;
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
    }

    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    fn ages(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|v| create_test_record(&[("age", v)]))
            .collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0), "{a} != {b}");
    }

    #[test]
    fn test_average_of_two() {
        let records = ages(&["30", "40"]);
        assert_eq!(average(&records, "age").unwrap(), 35.0);
    }

    #[test]
    fn test_average_identical_values_is_exact() {
        for n in [1, 2, 3, 7, 10, 101] {
            let records: Vec<Record> = (0..n)
                .map(|_| {
                    let mut r = Record::new();
                    r.insert("score".to_string(), FieldValue::Float(0.1));
                    r
                })
                .collect();
            assert_eq!(average(&records, "score").unwrap(), 0.1, "n = {n}");
        }
    }

    #[test]
    fn test_average_identical_infinities() {
        assert_eq!(average(&ages(&["inf", "inf"]), "age").unwrap(), f64::INFINITY);
        assert_eq!(
            average(&ages(&["-inf", "-inf", "-inf"]), "age").unwrap(),
            f64::NEG_INFINITY
        );
        assert_eq!(average(&ages(&["0", "0", "0"]), "age").unwrap(), 0.0);
        assert!(average(&ages(&["inf", "-inf"]), "age").unwrap().is_nan());
    }

    #[test]
    fn test_average_empty_fails() {
        assert_eq!(
            average(&[], "age"),
            Err(StatsError::EmptyDataset { operation: "average" })
        );
    }

    #[test]
    fn test_average_missing_field() {
        let records = vec![
            create_test_record(&[("age", "30")]),
            create_test_record(&[("name", "Eva")]),
        ];
        assert_eq!(
            average(&records, "age"),
            Err(StatsError::MissingField {
                field: "age".to_string()
            })
        );
    }

    #[test]
    fn test_average_non_numeric() {
        let records = ages(&["abc"]);
        assert!(matches!(
            average(&records, "age"),
            Err(StatsError::NonNumericField { .. })
        ));
    }

    #[test]
    fn test_average_null_is_non_numeric() {
        let mut record = Record::new();
        record.insert("age".to_string(), FieldValue::Null);
        assert!(matches!(
            average(&[record], "age"),
            Err(StatsError::NonNumericField { .. })
        ));
    }

    #[test]
    fn test_average_mixed_native_types() {
        let mut a = Record::new();
        a.insert("age".to_string(), FieldValue::Integer(20));
        let mut b = Record::new();
        b.insert("age".to_string(), FieldValue::Float(25.0));
        let c = create_test_record(&[("age", "30")]);
        assert_eq!(average(&[a, b, c], "age").unwrap(), 25.0);
    }

    #[test]
    fn test_sum_field() {
        assert_eq!(sum_field(&[], "age").unwrap(), 0.0);
        assert_eq!(sum_field(&ages(&["1.5", "2.5", "6"]), "age").unwrap(), 10.0);
    }

    #[test]
    fn test_sum_field_failures() {
        assert!(matches!(
            sum_field(&ages(&["1", "x"]), "age"),
            Err(StatsError::NonNumericField { .. })
        ));
        assert!(matches!(
            sum_field(&ages(&["1"]), "salary"),
            Err(StatsError::MissingField { .. })
        ));
    }

    #[test]
    fn test_sum_equals_average_times_len() {
        let records = ages(&["23", "41.5", "37", "19.25", "60", "0.1", "0.2"]);
        let sum = sum_field(&records, "age").unwrap();
        let avg = average(&records, "age").unwrap();
        assert_close(sum, avg * records.len() as f64);
    }

    #[test]
    fn test_count_by_value() {
        let records = vec![
            create_test_record(&[("city", "X")]),
            create_test_record(&[("city", "Y")]),
            create_test_record(&[("city", "X")]),
        ];
        let counts = count_by_value(&records, "city");

        let pairs: Vec<_> = counts.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        assert_eq!(pairs, vec![("X".to_string(), 2), ("Y".to_string(), 1)]);
    }

    #[test]
    fn test_count_by_value_missing_counts_as_null() {
        let records = vec![
            create_test_record(&[("name", "Ann")]),
            create_test_record(&[("city", "Lund")]),
            create_test_record(&[("name", "Bo")]),
        ];
        let counts = count_by_value(&records, "city");

        assert_eq!(counts.get(&FieldValue::Null), Some(&2));
        assert_eq!(counts.get(&FieldValue::from("Lund")), Some(&1));
        assert_eq!(counts.get_index(0).map(|(k, _)| k), Some(&FieldValue::Null));
        assert_eq!(counts.values().sum::<usize>(), records.len());
    }

    #[test]
    fn test_count_by_value_empty() {
        assert!(count_by_value(&[], "city").is_empty());
    }

    #[test]
    fn test_min_max() {
        let records = ages(&["30", "12", "45", "12"]);
        assert_eq!(min_max(&records, "age").unwrap(), (12.0, 45.0));
    }

    #[test]
    fn test_min_max_single_record() {
        assert_eq!(min_max(&ages(&["7.5"]), "age").unwrap(), (7.5, 7.5));
    }

    #[test]
    fn test_min_max_failures() {
        assert_eq!(
            min_max(&[], "age"),
            Err(StatsError::EmptyDataset { operation: "min/max" })
        );
        assert!(matches!(
            min_max(&ages(&["1", "n/a"]), "age"),
            Err(StatsError::NonNumericField { .. })
        ));
        assert!(matches!(
            min_max(&ages(&["1"]), "salary"),
            Err(StatsError::MissingField { .. })
        ));
    }
}
