//! Latest-reading store: the most recent reading per channel.
//!
//! The in-memory map is the source of truth; every upsert rewrites the full
//! durable snapshot (JSON lines, ordered by channel) through a temp file +
//! rename, so a reader never observes a half-written table and a crash
//! leaves either the old or the new snapshot intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::warn;
use tempfile::NamedTempFile;

use crate::error::PersistError;
use crate::reading::Reading;

/// An upsert was rejected without mutating the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertError {
    /// The reading carries no usable channel.
    MissingChannel,
}

impl core::fmt::Display for UpsertError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingChannel => write!(f, "reading has no channel"),
        }
    }
}

pub struct LatestStore {
    path: PathBuf,
    map: BTreeMap<u32, Reading>,
}

impl LatestStore {
    /// Open the store, loading any existing snapshot. Corrupt lines are
    /// skipped with a warning; a missing file is an empty table.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut map = BTreeMap::new();

        match fs::File::open(&path) {
            Ok(file) => {
                for line in BufReader::new(file).lines().map_while(Result::ok) {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Reading>(&line) {
                        Ok(reading) => {
                            if let Some(channel) = reading.channel {
                                map.insert(channel, reading);
                            }
                        }
                        Err(e) => warn!("skipping corrupt snapshot line: {e}"),
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("snapshot {} unreadable: {e}", path.display()),
        }

        Self { path, map }
    }

    /// Replace the entry for the reading's channel and persist the table.
    ///
    /// Persistence failure is logged and swallowed: the in-memory table has
    /// already moved on and the next successful write repairs the file.
    pub fn upsert(&mut self, reading: Reading) -> Result<(), UpsertError> {
        let Some(channel) = reading.channel else {
            return Err(UpsertError::MissingChannel);
        };
        self.map.insert(channel, reading);

        if let Err(e) = self.persist() {
            warn!("snapshot write failed: {e}");
        }
        Ok(())
    }

    /// The current table, keyed and ordered by channel.
    pub fn snapshot(&self) -> &BTreeMap<u32, Reading> {
        &self.map
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), PersistError> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        for reading in self.map.values() {
            serde_json::to_writer(&mut tmp, reading)?;
            tmp.write_all(b"\n")?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(())
    }
}
