use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_FILE: &str = "card.log";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

#[derive(Debug)]
enum LogSink {
    File(PathBuf),
    Memory(Mutex<Vec<LogEntry>>),
}

/// JSON-lines activity log shared by the scheduler worker and the card.
#[derive(Debug)]
pub struct ActivityLog {
    sink: LogSink,
    guard: Mutex<()>,
}

impl ActivityLog {
    pub fn in_dir(logs_dir: &Path) -> Self {
        Self {
            sink: LogSink::File(logs_dir.join(LOG_FILE)),
            guard: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            sink: LogSink::Memory(Mutex::new(Vec::new())),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            LogSink::File(path) => Some(path),
            LogSink::Memory(_) => None,
        }
    }

    pub fn log_info(&self, source: &str, message: &str) {
        self.append("info", source, message);
    }

    pub fn log_error(&self, source: &str, message: &str) {
        self.append("error", source, message);
    }

    /// Entries recorded by an in-memory log; empty for file logs.
    pub fn entries(&self) -> Vec<LogEntry> {
        match &self.sink {
            LogSink::Memory(entries) => entries
                .lock()
                .map(|entries| entries.clone())
                .unwrap_or_default(),
            LogSink::File(_) => Vec::new(),
        }
    }

    fn append(&self, level: &str, source: &str, message: &str) {
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        let entry = LogEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level.to_string(),
            source: source.to_string(),
            message: message.to_string(),
        };

        match &self.sink {
            LogSink::File(path) => {
                let Ok(payload) = serde_json::to_string(&entry) else {
                    return;
                };
                if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                    let _ = writeln!(file, "{payload}");
                }
            }
            LogSink::Memory(entries) => {
                if let Ok(mut entries) = entries.lock() {
                    entries.push(entry);
                }
            }
        }
    }
}
