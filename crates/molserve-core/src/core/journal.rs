//! Timestamped error journal.
//!
//! One journal file is created per process start. Each entry is a single line
//! `[HH:MM:SS]<error text>`, written and flushed immediately so that entries
//! survive an abrupt exit.

use chrono::Local;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

const FILE_NAME_FORMAT: &str = "Server_exceptions_%d_%m_%y_%H_%M_%S.log";
const ENTRY_TIME_FORMAT: &str = "%H:%M:%S";

pub struct ErrorJournal {
    sink: Mutex<Box<dyn Write + Send>>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for ErrorJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorJournal")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ErrorJournal {
    /// Creates `dir` if needed and opens a new journal file named after the
    /// current local time.
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Local::now().format(FILE_NAME_FORMAT).to_string());
        let file: File = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            sink: Mutex::new(Box::new(file)),
            path: Some(path),
        })
    }

    /// Wraps an arbitrary sink, e.g. an in-memory buffer.
    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(writer)),
            path: None,
        }
    }

    /// A journal that discards every entry.
    pub fn disabled() -> Self {
        Self::from_writer(io::sink())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Appends one entry. Write failures are reported through tracing and
    /// otherwise swallowed; the journal must never take a caller down.
    pub fn record(&self, error: &dyn Display) {
        let line = format_entry(&Local::now().format(ENTRY_TIME_FORMAT), error);
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|_| sink.flush()) {
            warn!("Failed to write error journal entry: {}", e);
        }
    }
}

fn format_entry(time: &dyn Display, error: &dyn Display) -> String {
    format!("[{}]{}\n", time, error)
}
