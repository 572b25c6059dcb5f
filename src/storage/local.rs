//! Append-only JSON-lines file.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{Result, StorageError};

const DEFAULT_MAX_ROWS: usize = 100;

/// `strftime` pattern of [`file_stamp`].
pub const FILE_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Local-time stamp used in every generated file name.
#[must_use]
pub fn file_stamp() -> String {
    Local::now().format(FILE_STAMP_FORMAT).to_string()
}

/// Writes one JSON document per line and flushes every `max_rows` rows.
pub struct LocalStorage<T> {
    path: PathBuf,
    writer: BufWriter<File>,
    max_rows: usize,
    rows: usize,
    _marker: PhantomData<fn(&T)>,
}

/// Builder for [`LocalStorage`].
#[derive(Debug, Clone)]
pub struct LocalStorageBuilder<T> {
    folder: PathBuf,
    file_name: String,
    max_rows: usize,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Serialize> LocalStorage<T> {
    #[must_use]
    pub fn builder(folder: impl Into<PathBuf>) -> LocalStorageBuilder<T> {
        LocalStorageBuilder {
            folder: folder.into(),
            file_name: String::new(),
            max_rows: DEFAULT_MAX_ROWS,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    /// Rows written since the last flush.
    #[must_use]
    pub const fn pending_rows(&self) -> usize {
        self.rows
    }

    /// Append `event` as a JSON line. Failures are logged, not returned.
    pub fn on_event(&mut self, event: &T) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to serialize event");
                return;
            }
        };
        if let Err(e) = writeln!(self.writer, "{line}") {
            error!(path = %self.path.display(), error = %e, "Failed to write event");
            return;
        }

        self.rows += 1;
        if self.rows >= self.max_rows {
            self.flush();
        }
    }

    /// Push buffered rows to disk. Failures are logged.
    pub fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!(path = %self.path.display(), error = %e, "Failed to flush storage file");
            return;
        }
        self.rows = 0;
    }
}

impl<T: Serialize> LocalStorageBuilder<T> {
    /// Target file name inside the folder. Empty means a local timestamp.
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    /// Rows appended between flushes. Zero is treated as one.
    #[must_use]
    pub fn max_rows(mut self, rows: usize) -> Self {
        self.max_rows = rows.max(1);
        self
    }

    /// Create the folder and open the file for appending.
    ///
    /// # Errors
    ///
    /// Fails if the folder or file cannot be created.
    pub fn build(self) -> Result<LocalStorage<T>> {
        fs::create_dir_all(&self.folder).map_err(|source| StorageError::Open {
            path: self.folder.clone(),
            source,
        })?;

        let file_name = if self.file_name.is_empty() {
            format!("{}.json", file_stamp())
        } else {
            self.file_name
        };
        let path = self.folder.join(file_name);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::Open {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), max_rows = self.max_rows, "Opened storage file");

        Ok(LocalStorage {
            path,
            writer: BufWriter::new(file),
            max_rows: self.max_rows,
            rows: 0,
            _marker: PhantomData,
        })
    }
}

impl<T> Drop for LocalStorage<T> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
