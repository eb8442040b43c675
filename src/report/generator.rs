//! Text and JSON report generation.
//!
//! This module renders analysis results as prefixed text lines or as a
//! JSON document.

use crate::analysis::FieldSummary;
use crate::config::Config;
use crate::models::{AnalysisResult, ValueCounts};
use anyhow::Result;

/// Render `value` with exactly `decimals` digits after the decimal point.
///
/// The exact binary value is rounded, ties going to even.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Render `value` with `decimals` digits, or the configured default.
pub fn format_number(value: f64, decimals: Option<usize>, config: &Config) -> String {
    format_fixed(value, decimals.unwrap_or(config.report.decimal_places))
}

/// Prefix a message with the configured log prefix.
pub fn prefixed(config: &Config, message: &str) -> String {
    format!("{} {}", config.general.log_prefix, message)
}

/// Build the report lines for one analysis result, without prefixes.
pub fn report_lines(result: &AnalysisResult, config: &Config) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Analysis of {}", result.source));
    lines.push(format!("Total records: {}", result.record_count));
    lines.push(format!(
        "Average age: {}",
        format_number(result.average_age, None, config)
    ));

    if let (Some(average_salary), Some((min, max))) = (result.average_salary, result.salary_range)
    {
        let currency = &config.report.currency;
        lines.push(format!(
            "Average salary: {} {}",
            format_number(average_salary, Some(0), config),
            currency
        ));
        lines.push(format!(
            "Salary range: {} - {} {}",
            format_number(min, Some(0), config),
            format_number(max, Some(0), config),
            currency
        ));
    }

    if let Some(ref distribution) = result.city_distribution {
        lines.push("City distribution:".to_string());
        for (city, count) in distribution {
            lines.push(format!("  {}: {}", city, count));
        }
    }

    lines
}

/// Lines describing a numeric field summary.
pub fn summary_lines(summary: &FieldSummary, config: &Config) -> Vec<String> {
    vec![
        format!("Field: {}", summary.field),
        format!("Records: {}", summary.record_count),
        format!("Sum: {}", format_number(summary.sum, None, config)),
        format!("Average: {}", format_number(summary.average, None, config)),
        format!(
            "Range: {} - {}",
            format_number(summary.min, None, config),
            format_number(summary.max, None, config)
        ),
    ]
}

/// Lines listing value counts of a field, in first-occurrence order.
pub fn distribution_lines(field: &str, counts: &ValueCounts) -> Vec<String> {
    let mut lines = vec![format!("Distribution of {}:", field)];
    lines.extend(
        counts
            .iter()
            .map(|(value, count)| format!("  {}: {}", value, count)),
    );
    lines
}

/// Render one analysis result as newline-terminated, prefixed text.
pub fn render_text_report(result: &AnalysisResult, config: &Config) -> String {
    let mut output = String::new();

    for line in report_lines(result, config) {
        output.push_str(&prefixed(config, &line));
        output.push('\n');
    }

    output
}

/// Generate a JSON report covering all results.
pub fn generate_json_report(results: &[AnalysisResult]) -> Result<String> {
    serde_json::to_string_pretty(results).map_err(Into::into)
}
