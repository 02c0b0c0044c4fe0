//! Audit trace.
//!
//! Append-only JSON-lines record of pipeline stage activity: one entry per
//! stage start/complete (and per evidence re-collection request) carrying
//! the stage name, the identifiers touched, and a wall-clock timestamp.
//! Write failures are logged and swallowed; tracing never aborts a run.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TraceEntry<'a> {
    ts: String,
    stage: &'a str,
    step: &'a str,
    data: serde_json::Value,
}

pub struct TraceLog {
    file: Mutex<Option<File>>,
}

impl TraceLog {
    /// Trace into a JSONL file, created (or truncated) up front.
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(Some(file)),
        })
    }

    /// No-op trace for callers that do not persist a run directory.
    pub fn disabled() -> Self {
        Self {
            file: Mutex::new(None),
        }
    }

    pub fn record(&self, stage: &str, step: &str, data: serde_json::Value) {
        let entry = TraceEntry {
            ts: chrono::Utc::now().to_rfc3339(),
            stage,
            step,
            data,
        };

        let mut guard = self.file.lock();
        if let Some(file) = guard.as_mut() {
            let result = serde_json::to_string(&entry)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
                .and_then(|json| writeln!(file, "{}", json));
            if let Err(e) = result {
                log::warn!("trace write failed ({} {}): {}", stage, step, e);
            }
        }
    }
}
