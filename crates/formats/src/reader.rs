//! Unified dataset reader abstraction
//!
//! Provides a common interface for reading `(id, text)` datasets from
//! different formats with format detection based on file extensions.

use crate::{csv_reader::CsvReader, jsonl::JsonlReader, Error, Record, Result};
use serde_json::Value;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Trait for dataset readers providing unified interface
pub trait DatasetReader: Iterator<Item = Result<Record>> {
    /// Get the number of source rows processed, including skipped ones
    fn records_processed(&self) -> usize;
}

/// JSONL dataset reader yielding rows that carry `id` and `text`
pub struct JsonlDatasetReader {
    reader: JsonlReader<Box<dyn Read>>,
}

impl Iterator for JsonlDatasetReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let value = match self.reader.next()? {
                Ok(value) => value,
                Err(e) => return Some(Err(e)),
            };

            match Record::from_value(&value) {
                Some(record) => return Some(Ok(record)),
                None => {
                    warn!(
                        "Skipping line {}: missing string 'id' or 'text' field",
                        self.reader.lines_processed()
                    );
                    continue;
                }
            }
        }
    }
}

impl DatasetReader for JsonlDatasetReader {
    fn records_processed(&self) -> usize {
        self.reader.lines_processed()
    }
}

/// Delimited-text dataset reader wrapper
pub struct CsvDatasetReader {
    reader: CsvReader<File>,
}

impl Iterator for CsvDatasetReader {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}

impl DatasetReader for CsvDatasetReader {
    fn records_processed(&self) -> usize {
        self.reader.rows_read()
    }
}

fn extension_of(path: &Path) -> Result<&str> {
    path.extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| Error::UnsupportedFormat("No file extension found".to_string()))
}

/// Factory function to open a dataset with automatic format detection
///
/// Supported formats:
/// - `.csv`, `.tsv` - headerless `id,text` rows
/// - `.jsonl`, `.json` - JSON Lines with `id` and `text` fields
/// - `.gz` - Gzip-compressed JSON Lines
pub fn open_dataset<P: AsRef<Path>>(path: P) -> Result<Box<dyn DatasetReader>> {
    let path = path.as_ref();
    let extension = extension_of(path)?;

    info!("Opening dataset: {:?} (format: {})", path, extension);

    match extension {
        "csv" | "tsv" => Ok(Box::new(CsvDatasetReader {
            reader: CsvReader::open(path)?,
        })),
        "jsonl" | "json" | "gz" => Ok(Box::new(JsonlDatasetReader {
            reader: JsonlReader::open(path)?,
        })),
        _ => Err(Error::UnsupportedFormat(format!(
            "Unsupported file extension: {}",
            extension
        ))),
    }
}

/// Read a whole dataset into memory, in source order
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    open_dataset(path)?.collect()
}

/// Read raw JSON rows from a JSONL file without requiring any fields
///
/// Used to validate previously exported datasets, whose rows may be
/// incomplete. Unlike dataset loading, an unparseable line is an error.
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<Value>> {
    let path = path.as_ref();
    match extension_of(path)? {
        "jsonl" | "json" | "gz" => JsonlReader::open(path)?.strict().collect(),
        other => Err(Error::UnsupportedFormat(format!(
            "Raw rows can only be read from JSON Lines, got: {}",
            other
        ))),
    }
}
