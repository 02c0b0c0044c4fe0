//! Suricata EVE reader.
//!
//! Reads `eve.json` from a log directory. Suricata labels its own records
//! with `event_type` (alert, dns, flow, http, ...) so only the sensor tag is
//! added here.

use std::path::PathBuf;

use super::{read_json_lines, tag_record, IngestBatch};

pub struct SuricataReader {
    log_dir: PathBuf,
}

impl SuricataReader {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn parse_eve_json(&self) -> IngestBatch {
        let path = self.log_dir.join("eve.json");
        if !path.exists() {
            log::warn!("eve.json not found at {}", path.display());
            return IngestBatch::default();
        }

        let mut batch = match read_json_lines(&path, false) {
            Ok(b) => b,
            Err(e) => {
                log::error!("error reading {}: {}", path.display(), e);
                return IngestBatch::default();
            }
        };

        for record in &mut batch.records {
            tag_record(record, "suricata", None);
        }

        log::info!(
            "parsed {} events from {}",
            batch.records.len(),
            path.display()
        );
        batch
    }

    pub fn parse_all(&self) -> IngestBatch {
        self.parse_eve_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_eve_keeps_native_event_type() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("eve.json")).unwrap();
        writeln!(
            f,
            r#"{{"timestamp": "2024-01-15T10:30:00.000000+0000", "event_type": "alert", "src_ip": "10.0.0.5"}}"#
        )
        .unwrap();
        writeln!(f, "{{broken").unwrap();

        let batch = SuricataReader::new(dir.path()).parse_all();

        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.records[0]["sensor"], "suricata");
        assert_eq!(batch.records[0]["event_type"], "alert");
    }

    #[test]
    fn test_missing_eve_yields_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let batch = SuricataReader::new(dir.path()).parse_all();
        assert!(batch.records.is_empty());
    }
}
