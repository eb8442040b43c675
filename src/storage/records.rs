//! Loading and saving record sequences as JSON or CSV.
//!
//! JSON keeps each value's native type; CSV yields text for every cell.

use super::file_ops::ensure_directory;
use crate::error::DataError;
use crate::models::{FieldValue, Record, SourceKind};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Load a JSON array of flat objects.
pub fn load_json(path: &Path) -> Result<Vec<Record>, DataError> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;

    let records: Vec<Record> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Save records as pretty-printed JSON with a four-space indent.
pub fn save_json(records: &[Record], path: &Path) -> Result<(), DataError> {
    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    records
        .serialize(&mut serializer)
        .map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    writer.flush().map_err(|e| DataError::io(path, e))?;

    debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Load a CSV file with a header row.
///
/// Short rows get `Null` for the missing trailing fields; cells past the
/// header are dropped.
pub fn load_csv(path: &Path) -> Result<Vec<Record>, DataError> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut records = Vec::new();

    for (line, row) in reader.records().enumerate() {
        let row = row.map_err(csv_err)?;

        if row.len() > headers.len() {
            debug!(
                "{}: row {} has {} extra cells, ignoring them",
                path.display(),
                line + 1,
                row.len() - headers.len()
            );
        }

        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let value = row
                    .get(i)
                    .map(FieldValue::from)
                    .unwrap_or(FieldValue::Null);
                (name.to_string(), value)
            })
            .collect();

        records.push(record);
    }

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Save records as CSV.
///
/// Field names default to the first record's keys. Fields a record lacks are
/// written empty; a record field outside the field names is an error.
pub fn save_csv(
    records: &[Record],
    path: &Path,
    fieldnames: Option<&[String]>,
) -> Result<(), DataError> {
    let first = records.first().ok_or(DataError::EmptyCsv)?;

    let fieldnames: Vec<String> = match fieldnames {
        Some(names) => names.to_vec(),
        None => first.keys().cloned().collect(),
    };

    if let Some(field) = records
        .iter()
        .flat_map(|r| r.keys())
        .find(|key| !fieldnames.contains(key))
    {
        return Err(DataError::UnknownCsvField {
            field: field.clone(),
        });
    }

    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    let csv_err = |source| DataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));
    writer.write_record(&fieldnames).map_err(csv_err)?;

    for record in records {
        let row = fieldnames.iter().map(|name| {
            record
                .get(name)
                .map(FieldValue::to_csv_cell)
                .unwrap_or_default()
        });
        writer.write_record(row).map_err(csv_err)?;
    }

    writer.flush().map_err(|e| DataError::io(path, e))?;

    debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}

/// Format of a dataset path, inferred from its extension.
pub fn kind_for(path: &Path) -> Result<SourceKind, DataError> {
    SourceKind::from_path(path).ok_or_else(|| DataError::UnknownFormat {
        path: path.to_path_buf(),
    })
}

/// Load a dataset of the given format.
pub fn load_records(path: &Path, kind: SourceKind) -> Result<Vec<Record>, DataError> {
    match kind {
        SourceKind::Json => load_json(path),
        SourceKind::Csv => load_csv(path),
    }
}

/// Save records in the given format.
pub fn save_records(records: &[Record], path: &Path, kind: SourceKind) -> Result<(), DataError> {
    match kind {
        SourceKind::Json => save_json(records, path),
        SourceKind::Csv => save_csv(records, path, None),
    }
}

/// Convert a dataset file between formats, inferred from the extensions.
///
/// The output directory is created when missing. Returns the number of
/// records written.
pub fn convert(input: &Path, output: &Path) -> Result<usize, DataError> {
    let (input_kind, output_kind) = (kind_for(input)?, kind_for(output)?);

    let records = load_records(input, input_kind)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }
    save_records(&records, output, output_kind)?;

    info!(
        "Converted {} records: {} -> {}",
        records.len(),
        input.display(),
        output.display()
    );
    Ok(records.len())
}
