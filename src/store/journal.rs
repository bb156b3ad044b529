//! Append-only reading log and forward cursor.
//!
//! Every ingested reading is appended as one JSON line and fsynced before
//! `append` returns, so an acknowledged record can never be lost to a crash.
//! The cursor is a durable byte offset: everything strictly before it has
//! been accepted by the collector. It never moves backward and never past
//! the end of the log, including across restarts.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::PersistError;
use crate::reading::Reading;

pub struct Journal {
    log_path: PathBuf,
    cursor_path: PathBuf,
    cursor: u64,
}

impl Journal {
    /// Open the journal, loading and clamping the persisted cursor.
    pub fn open(
        log_path: impl Into<PathBuf>,
        cursor_path: impl Into<PathBuf>,
    ) -> Result<Self, PersistError> {
        let log_path = log_path.into();
        let cursor_path = cursor_path.into();

        let stored = match fs::read_to_string(&cursor_path) {
            Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!("cursor file corrupt, resetting to 0");
                0
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };

        let mut journal = Self {
            log_path,
            cursor_path,
            cursor: 0,
        };
        // Clamp: the cursor may never exceed the log (e.g. after a log file
        // was rotated away underneath a stale cursor file).
        journal.cursor = stored.min(journal.len());
        Ok(journal)
    }

    /// Append one reading and return the new end-of-log offset.
    ///
    /// The write is flushed and fsynced before returning.
    pub fn append(&mut self, reading: &Reading) -> Result<u64, PersistError> {
        let mut line = serde_json::to_string(reading)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        file.write_all(line.as_bytes())?;
        file.sync_all()?;
        Ok(file.seek(SeekFrom::End(0))?)
    }

    /// Current end-of-log offset (0 if the log does not exist yet).
    pub fn len(&self) -> u64 {
        fs::metadata(&self.log_path).map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset below which everything has been accepted by the collector.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Advance the cursor, clamped to be non-decreasing and within the log.
    ///
    /// The in-memory cursor always moves; the file write is best-effort and
    /// repaired by the next successful advance.
    pub fn advance_cursor(&mut self, offset: u64) {
        let clamped = offset.min(self.len());
        if clamped <= self.cursor {
            return;
        }
        self.cursor = clamped;
        if let Err(e) = fs::write(&self.cursor_path, format!("{}\n", self.cursor)) {
            warn!("cursor write failed: {e}");
        }
    }

    /// Iterate records from `offset` to end-of-log, yielding each record's
    /// end offset alongside it. Unparseable lines are skipped (they can
    /// never be delivered) but still advance the yielded offsets.
    pub fn read_from(&self, offset: u64) -> Result<RecordIter, PersistError> {
        let file = match File::open(&self.log_path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(RecordIter {
                    reader: None,
                    pos: offset,
                });
            }
            Err(e) => return Err(e.into()),
        };
        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset))?;
        Ok(RecordIter {
            reader: Some(reader),
            pos: offset,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

/// Iterator over `(end_offset, reading)` pairs from a log position.
pub struct RecordIter {
    reader: Option<BufReader<File>>,
    pos: u64,
}

impl Iterator for RecordIter {
    type Item = (u64, Reading);

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        loop {
            let mut line = String::new();
            let n = reader.read_line(&mut line).ok()?;
            if n == 0 {
                return None;
            }
            self.pos += n as u64;
            match serde_json::from_str::<Reading>(line.trim_end()) {
                Ok(reading) => return Some((self.pos, reading)),
                Err(_) => continue, // corrupt line: skip, offset still moves
            }
        }
    }
}
