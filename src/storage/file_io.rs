//! JSON data files
//!
//! Each repository owns one [`JsonFile`]. A store goes through a staging file
//! next to the target (`<name>.json.tmp`) that is synced and renamed over it,
//! so the target always holds either the previous snapshot or the new one.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::LedgerError;

/// State of a data file as seen by `ledger config`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Missing,
    Valid,
    Corrupt,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileStatus::Missing => "missing",
            FileStatus::Valid => "ok",
            FileStatus::Corrupt => "corrupt",
        })
    }
}

/// One JSON snapshot file in the data directory
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// File name for messages, e.g. `envelopes.json`
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn error(&self, action: &str, e: impl fmt::Display) -> LedgerError {
        LedgerError::Storage(format!("Failed to {} {}: {}", action, self.path.display(), e))
    }

    /// Read the snapshot. A file that was never written reads as empty.
    pub fn load<T>(&self) -> Result<T, LedgerError>
    where
        T: DeserializeOwned + Default,
    {
        if !self.path.exists() {
            return Ok(T::default());
        }

        let file = File::open(&self.path).map_err(|e| self.error("open", e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| self.error("parse", e))
    }

    /// Replace the snapshot with `data`.
    ///
    /// On error the previous snapshot is untouched and the staging file is
    /// removed when possible.
    pub fn store<T: Serialize>(&self, data: &T) -> Result<(), LedgerError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.error("create directory for", e))?;
        }

        let staging = self.staging_path();
        let written = write_synced(&staging, data);
        let result = written.and_then(|()| {
            fs::rename(&staging, &self.path).map_err(|e| self.error("replace", e))
        });

        if result.is_err() && staging.is_file() {
            let _ = fs::remove_file(&staging);
        }
        result
    }

    /// Whether the file exists and holds well-formed JSON
    pub fn status(&self) -> FileStatus {
        if !self.path.exists() {
            return FileStatus::Missing;
        }
        match self.load::<Option<serde_json::Value>>() {
            Ok(_) => FileStatus::Valid,
            Err(_) => FileStatus::Corrupt,
        }
    }
}

fn write_synced<T: Serialize>(staging: &Path, data: &T) -> Result<(), LedgerError> {
    let fail = |action: &str, e: &dyn fmt::Display| {
        LedgerError::Storage(format!("Failed to {} {}: {}", action, staging.display(), e))
    };

    let file = File::create(staging).map_err(|e| fail("create", &e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data).map_err(|e| fail("serialize into", &e))?;
    writer.flush().map_err(|e| fail("flush", &e))?;
    writer.get_ref().sync_all().map_err(|e| fail("sync", &e))
}
