use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::metrics::SessionResult;

/// One finished session as stored in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: DateTime<Local>,
    pub session_secs: u32,
    pub elapsed_secs: u32,
    pub words: usize,
    pub wpm: f64,
    pub accuracy: f64,
}

impl HistoryRecord {
    pub fn new(result: &SessionResult, session_secs: u32) -> Self {
        Self {
            date: Local::now(),
            session_secs,
            elapsed_secs: result.elapsed_seconds,
            words: result.word_count,
            wpm: result.words_per_minute(),
            accuracy: result.accuracy(),
        }
    }
}

/// Append-only CSV log of session results.
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, record: &HistoryRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log file doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record).map_err(io::Error::other)?;
        writer.flush()
    }

    pub fn read_all(&self) -> io::Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(io::Error::other)?;
        reader
            .deserialize()
            .collect::<Result<Vec<HistoryRecord>, _>>()
            .map_err(io::Error::other)
    }
}
