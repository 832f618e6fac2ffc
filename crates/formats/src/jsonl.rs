//! Streaming JSONL (JSON Lines) reader and writer
//!
//! The reader yields one JSON value per non-empty line, with automatic
//! gzip decompression for `.gz` files. The writer emits one compact JSON
//! object per line.

use crate::{Error, Result};
use flate2::read::GzDecoder;
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Buffer size for BufReader
const BUFFER_SIZE: usize = 64 * 1024;

/// Streaming JSONL reader that processes files line-by-line
pub struct JsonlReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    bytes_read: u64,
    total_bytes: Option<u64>,
    strict: bool,
}

impl JsonlReader<Box<dyn Read>> {
    /// Open a JSONL file, auto-detecting gzip compression
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let total_bytes = file.metadata()?.len();

        match path.extension().and_then(|e| e.to_str()) {
            Some("gz") => {
                debug!("Opening gzip-compressed JSONL file: {:?}", path);
                let reader: Box<dyn Read> = Box::new(GzDecoder::new(file));
                Ok(Self::with_total(reader, None))
            }
            _ => {
                debug!("Opening plain JSONL file: {:?}", path);
                let reader: Box<dyn Read> = Box::new(file);
                Ok(Self::with_total(reader, Some(total_bytes)))
            }
        }
    }
}

impl<R: Read> JsonlReader<R> {
    /// Create a new JSONL reader from any Read source
    pub fn new(reader: R) -> Self {
        Self::with_total(reader, None)
    }

    fn with_total(reader: R, total_bytes: Option<u64>) -> Self {
        Self {
            reader: BufReader::with_capacity(BUFFER_SIZE, reader),
            line_number: 0,
            bytes_read: 0,
            total_bytes,
            strict: false,
        }
    }

    /// Fail on the first unparseable line instead of skipping it
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Get the number of lines processed
    pub fn lines_processed(&self) -> usize {
        self.line_number
    }

    /// Get the number of bytes read
    pub fn bytes_processed(&self) -> u64 {
        self.bytes_read
    }

    /// Get total file size if known
    pub fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }
}

impl<R: Read> Iterator for JsonlReader<R> {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();

        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(n) => {
                    self.bytes_read += n as u64;
                    self.line_number += 1;

                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<Value>(trimmed) {
                        Ok(value) => return Some(Ok(value)),
                        Err(e) if self.strict => {
                            return Some(Err(Error::MalformedLine {
                                line: self.line_number,
                                source: e,
                            }))
                        }
                        Err(e) => {
                            warn!(
                                "Failed to parse JSON at line {}: {} - Error: {}",
                                self.line_number, trimmed, e
                            );
                            continue;
                        }
                    }
                }
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}

/// Buffered JSONL writer
pub struct JsonlWriter<W: Write> {
    writer: BufWriter<W>,
    written: usize,
}

impl JsonlWriter<File> {
    /// Create (or truncate) a JSONL file, creating parent directories
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Write one item as a JSON line
    pub fn write<T: Serialize>(&mut self, item: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, item)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered output, returning the number of lines written
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.written)
    }
}

/// Write every item to `path` as JSON Lines, overwriting the file
pub fn write_jsonl<P, T>(path: P, items: &[T]) -> Result<usize>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let mut writer = JsonlWriter::create(path)?;
    for item in items {
        writer.write(item)?;
    }
    writer.finish()
}
