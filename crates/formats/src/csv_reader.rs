//! Headerless two-column (`id`, `text`) delimited reader

use crate::{Error, Record, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Streaming reader over `id,text` rows without a header line
pub struct CsvReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    delimiter: char,
    rows_read: usize,
}

impl CsvReader<File> {
    /// Open a delimited file; `.tsv` files are read tab-separated
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some("tsv") => b'\t',
            _ => b',',
        };
        debug!("Opening delimited file: {:?} (delimiter {:?})", path, delimiter as char);
        Ok(Self::with_delimiter(File::open(path)?, delimiter))
    }
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_delimiter(reader, b',')
    }

    pub fn with_delimiter(reader: R, delimiter: u8) -> Self {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader)
            .into_records();

        Self {
            records,
            delimiter: char::from(delimiter),
            rows_read: 0,
        }
    }

    /// Number of rows consumed so far, including skipped ones
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }
}

impl<R: Read> Iterator for CsvReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.records.next()? {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Some(Err(Error::Csv(e))),
                Err(e) => {
                    self.rows_read += 1;
                    warn!("Skipping unreadable row {}: {}", self.rows_read, e);
                    continue;
                }
            };
            self.rows_read += 1;

            if row.len() < 2 {
                warn!(
                    "Skipping row {}: expected 2 columns, found {}",
                    self.rows_read,
                    row.len()
                );
                continue;
            }

            // An unquoted delimiter inside the message splits it; rejoin the tail
            let text = if row.len() > 2 {
                warn!(
                    "Row {} has {} columns, joining columns 2.. into the text",
                    self.rows_read,
                    row.len()
                );
                row.iter()
                    .skip(1)
                    .collect::<Vec<_>>()
                    .join(&self.delimiter.to_string())
            } else {
                row[1].to_string()
            };

            return Some(Ok(Record::new(&row[0], text)));
        }
    }
}
