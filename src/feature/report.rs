//! CSV report of reported feature values.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;

use crate::domain::Symbol;
use crate::error::{Result, StorageError};
use crate::storage::file_stamp;

/// Appends one CSV row per graph change for a single symbol.
pub struct ReportWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ReportWriter {
    /// Create `{symbol}-{timestamp}.csv` under `dir` and write the header.
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be created.
    pub fn create(dir: &Path, symbol: &Symbol, names: &[&str]) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Open {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = dir.join(format!("{symbol}-{}.csv", file_stamp()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::Open {
                path: path.clone(),
                source,
            })?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "ts,{}", names.join(","))?;
        writer.flush()?;

        Ok(Self { path, writer })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row; `None` values become empty cells.
    ///
    /// # Errors
    ///
    /// Fails on write errors.
    pub fn write_row(&mut self, ts: u64, values: &[(&'static str, Option<Decimal>)]) -> Result<()> {
        let cells: Vec<String> = values
            .iter()
            .map(|(_, v)| v.map(|d| d.to_string()).unwrap_or_default())
            .collect();
        writeln!(self.writer, "{ts},{}", cells.join(","))?;
        self.writer.flush()?;
        Ok(())
    }
}
