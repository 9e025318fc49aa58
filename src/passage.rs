use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use thiserror::Error;

use crate::runtime::EngineEvent;

pub const DEFAULT_PASSAGE: &str = "The quick brown fox jumps over the lazy dog.";

/// Errors that can occur while obtaining passage text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PassageError {
    #[error("could not read passage from {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("passage at {path} is empty")]
    Empty { path: String },
}

/// Anything that can supply the text to type.
pub trait PassageSource: fmt::Debug + Send + 'static {
    fn fetch(&self) -> Result<String, PassageError>;
}

#[derive(Debug, Clone)]
pub struct StaticPassage(pub String);

impl PassageSource for StaticPassage {
    fn fetch(&self) -> Result<String, PassageError> {
        Ok(self.0.clone())
    }
}

/// Reads a passage from a text file, folding line breaks into spaces.
#[derive(Debug, Clone)]
pub struct FilePassage {
    path: PathBuf,
}

impl FilePassage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PassageSource for FilePassage {
    fn fetch(&self) -> Result<String, PassageError> {
        let path = self.path.display().to_string();
        let raw = fs::read_to_string(&self.path).map_err(|e| PassageError::Unreadable {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let text = normalize(&raw);
        if text.is_empty() {
            return Err(PassageError::Empty { path });
        }
        Ok(text)
    }
}

fn normalize(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fetch a passage on a background thread and deliver it as an event.
///
/// A failed fetch is logged and delivered as no content at all.
pub fn spawn_fetch<S: PassageSource>(source: S, tx: Sender<EngineEvent>) -> JoinHandle<()> {
    thread::spawn(move || match source.fetch() {
        Ok(text) => {
            info!("passage fetched ({} chars)", text.chars().count());
            if tx.send(EngineEvent::Passage(text)).is_err() {
                debug!("event loop is gone, dropping fetched passage");
            }
        }
        Err(e) => warn!("{}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_static_passage() {
        let source = StaticPassage(DEFAULT_PASSAGE.to_string());

        assert_eq!(source.fetch().unwrap(), DEFAULT_PASSAGE);
    }

    #[test]
    fn test_file_passage_folds_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("passage.txt");
        fs::write(&path, "  first line\n\nsecond line  \n").unwrap();

        assert_eq!(
            FilePassage::new(&path).fetch().unwrap(),
            "first line second line"
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();

        assert_matches!(
            FilePassage::new(dir.path().join("nope.txt")).fetch(),
            Err(PassageError::Unreadable { .. })
        );
    }

    #[test]
    fn test_blank_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        fs::write(&path, "\n   \n").unwrap();

        assert_matches!(FilePassage::new(&path).fetch(), Err(PassageError::Empty { .. }));
    }

    #[test]
    fn test_spawn_fetch_delivers_event() {
        let (tx, rx) = mpsc::channel();

        spawn_fetch(StaticPassage("late text".into()), tx);

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            EngineEvent::Passage(text) => assert_eq!(text, "late text"),
            other => panic!("expected Passage event, got {:?}", other),
        }
    }

    #[test]
    fn test_spawn_fetch_survives_closed_channel() {
        let (tx, rx) = mpsc::channel();
        drop(rx);

        let handle = spawn_fetch(StaticPassage("nobody listens".into()), tx);

        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_spawn_fetch_failure_sends_nothing() {
        let dir = tempdir().unwrap();
        let (tx, rx) = mpsc::channel();

        spawn_fetch(FilePassage::new(dir.path().join("nope.txt")), tx);

        // sender is dropped once the fetch thread gives up
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
    }
}
