//! Raw log readers.
//!
//! Line-delimited JSON only; the heavy protocol dissection already happened
//! in the sensors that produced these files. Malformed lines are counted and
//! skipped, never fatal. A missing file yields an empty batch with a warning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub mod suricata;
pub mod zeek;

pub use suricata::SuricataReader;
pub use zeek::ZeekReader;

/// One parsed log file (or group of files) plus its skip counter.
#[derive(Debug, Default)]
pub struct IngestBatch {
    pub records: Vec<serde_json::Value>,
    pub skipped: usize,
}

impl IngestBatch {
    pub fn merge(&mut self, other: IngestBatch) {
        self.records.extend(other.records);
        self.skipped += other.skipped;
    }
}

/// Read a line-delimited JSON file. Blank lines are ignored; lines starting
/// with `#` are ignored when `skip_comments` is set (Zeek writes header
/// comments even in JSON mode). Unreadable or malformed lines increment the
/// skip counter.
pub(crate) fn read_json_lines(path: &Path, skip_comments: bool) -> std::io::Result<IngestBatch> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut batch = IngestBatch::default();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                log::warn!("{}: line {}: read error: {}", path.display(), line_no + 1, e);
                batch.skipped += 1;
                continue;
            }
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || (skip_comments && trimmed.starts_with('#')) {
            continue;
        }

        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) => batch.records.push(value),
            Err(e) => {
                log::warn!(
                    "{}: line {}: JSON parse error: {}",
                    path.display(),
                    line_no + 1,
                    e
                );
                batch.skipped += 1;
            }
        }
    }

    Ok(batch)
}

/// Tag a record with the fields the normalizer keys on. Existing values win
/// so sensors that already label their records are left alone.
pub(crate) fn tag_record(record: &mut serde_json::Value, sensor: &str, event_type: Option<&str>) {
    if let Some(obj) = record.as_object_mut() {
        obj.entry("sensor".to_string())
            .or_insert_with(|| serde_json::json!(sensor));
        if let Some(et) = event_type {
            obj.entry("event_type".to_string())
                .or_insert_with(|| serde_json::json!(et));
        }
    }
}
