//! Dataset readers and writers for message cleaning
//!
//! This crate loads raw `(id, text)` datasets from delimited text or
//! JSON Lines, and writes the cleaned dataset, the statistics log and
//! the validation report.

pub mod csv_reader;
pub mod error;
pub mod jsonl;
pub mod reader;
pub mod record;
pub mod writer;

pub use error::{Error, Result};
pub use jsonl::{write_jsonl, JsonlReader, JsonlWriter};
pub use reader::{open_dataset, read_dataset, read_rows, DatasetReader};
pub use record::{EnrichedRecord, Record};
pub use writer::{append_csv_row, write_json_pretty};
