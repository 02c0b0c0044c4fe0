//! Zeek log reader.
//!
//! Reads `conn.log` and `dns.log` written by Zeek's JSON writer from a log
//! directory and tags each record with `sensor`/`event_type` for the
//! normalizer.

use std::path::PathBuf;

use super::{read_json_lines, tag_record, IngestBatch};

pub struct ZeekReader {
    log_dir: PathBuf,
}

impl ZeekReader {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn parse_conn_log(&self) -> IngestBatch {
        self.parse_log("conn.log", "conn")
    }

    pub fn parse_dns_log(&self) -> IngestBatch {
        self.parse_log("dns.log", "dns")
    }

    /// All recognized Zeek logs, connection events first.
    pub fn parse_all(&self) -> IngestBatch {
        let mut batch = self.parse_conn_log();
        batch.merge(self.parse_dns_log());
        batch
    }

    fn parse_log(&self, file_name: &str, event_type: &str) -> IngestBatch {
        let path = self.log_dir.join(file_name);
        if !path.exists() {
            log::warn!("{} not found at {}", file_name, path.display());
            return IngestBatch::default();
        }

        let mut batch = match read_json_lines(&path, true) {
            Ok(b) => b,
            Err(e) => {
                log::error!("error reading {}: {}", path.display(), e);
                return IngestBatch::default();
            }
        };

        for record in &mut batch.records {
            tag_record(record, "zeek", Some(event_type));
        }

        log::info!(
            "parsed {} {} events from {}",
            batch.records.len(),
            event_type,
            path.display()
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_conn_log_tags_records() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("conn.log")).unwrap();
        writeln!(f, "#separator \\x09").unwrap();
        writeln!(
            f,
            r#"{{"ts": 1705312200.0, "id.orig_h": "10.0.0.5", "id.resp_h": "10.0.0.9"}}"#
        )
        .unwrap();
        writeln!(f, "not json at all").unwrap();
        writeln!(f, r#"{{"ts": 1705312201.0, "id.orig_h": "10.0.0.5"}}"#).unwrap();

        let batch = ZeekReader::new(dir.path()).parse_conn_log();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.records[0]["sensor"], "zeek");
        assert_eq!(batch.records[0]["event_type"], "conn");
    }

    #[test]
    fn test_missing_file_yields_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let batch = ZeekReader::new(dir.path()).parse_all();
        assert!(batch.records.is_empty());
        assert_eq!(batch.skipped, 0);
    }

    #[test]
    fn test_parse_all_combines_conn_and_dns() {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = std::fs::File::create(dir.path().join("conn.log")).unwrap();
        writeln!(conn, r#"{{"ts": 1.0, "id.orig_h": "10.0.0.1"}}"#).unwrap();
        let mut dns = std::fs::File::create(dir.path().join("dns.log")).unwrap();
        writeln!(dns, r#"{{"ts": 2.0, "query": "example.test"}}"#).unwrap();

        let batch = ZeekReader::new(dir.path()).parse_all();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0]["event_type"], "conn");
        assert_eq!(batch.records[1]["event_type"], "dns");
    }
}
