//! JSON line-delimited run logging.
//!
//! One serialized record per line, flushed immediately so a killed run still
//! leaves a readable log up to its last completed epoch.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

/// Appends serialized records to a log file, one JSON object per line.
pub struct RunLogger {
    writer: BufWriter<File>,
}

impl RunLogger {
    /// Creates (or truncates) the log file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Writes one record as a JSON line and flushes.
    pub fn log<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
