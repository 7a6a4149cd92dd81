//! Unanswered query log
//!
//! Append-only, newline-delimited record of queries the matching chain could
//! not answer: one raw (trimmed, lowercased) query per line, no deduplication.
//! Appends are serialized behind a mutex, and failures are swallowed after a
//! warning; the hot path never errors.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

pub struct UnansweredLog {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl UnansweredLog {
    /// Open (or create) the log file in append mode.
    ///
    /// A file that cannot be opened leaves the log in a no-op state; the
    /// service keeps answering either way.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to open unanswered log");
                None
            }
        };

        Self {
            path,
            file: Mutex::new(file),
        }
    }

    /// Append one query to the log.
    pub fn record(&self, query: &str) {
        let line = query.trim().to_lowercase();
        if line.is_empty() {
            return;
        }

        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(file) = guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", line) {
                warn!(path = %self.path.display(), error = %e, "Failed to append unanswered query");
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
