//! Accumulation and CSV export of summary rows.

use chrono::{DateTime, Local};
use csv::WriterBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;

/// A serializable summary row with a fixed column order.
pub trait SummaryRow: Serialize {
    /// Header names, in the order the serialized fields appear.
    const COLUMNS: &'static [&'static str];
}

/// Append-only store of summary rows in evaluation order.
#[derive(Debug, Clone)]
pub struct ResultAccumulator<R> {
    rows: Vec<R>,
    created_at: DateTime<Local>,
}

impl<R> Default for ResultAccumulator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ResultAccumulator<R> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            created_at: Local::now(),
        }
    }

    pub fn push(&mut self, row: R) -> &R {
        self.rows.push(row);
        &self.rows[self.rows.len() - 1]
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// `<created_at>-result.csv`, fixed for the accumulator's lifetime.
    pub fn file_name(&self) -> String {
        format!("{}-result.csv", self.created_at.format("%Y-%m-%d-%H-%M-%S"))
    }
}

impl<R: SummaryRow> ResultAccumulator<R> {
    /// Writes every row, header first, in accumulation order. An empty
    /// accumulator still writes the header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
        if self.rows.is_empty() {
            writer.write_record(R::COLUMNS)?;
        }
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the rows to [`file_name`](Self::file_name) inside `dir`.
    pub fn export(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name());
        debug!(path = %path.display(), rows = self.rows.len(), "Exporting summary rows");

        let file = std::fs::File::create(&path)?;
        self.write_csv(file)?;

        info!(path = %path.display(), rows = self.rows.len(), "Summary exported");
        Ok(path)
    }
}

/// Reads back rows written by [`ResultAccumulator::write_csv`].
pub fn read_rows<R: DeserializeOwned, Rd: Read>(reader: Rd) -> Result<Vec<R>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}
