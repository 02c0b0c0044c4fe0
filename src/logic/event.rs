//! Canonical event schema shared by every pipeline stage.
//!
//! Events are created once by the normalizer and read-only afterwards.
//! The run collection is the normalizer output stably sorted by timestamp,
//! so a slice index doubles as an (ingestion-order-stable) event reference.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata fields that may carry the queried DNS name.
const DOMAIN_FIELDS: &[&str] = &["query", "domain", "qname", "rrname"];

/// Metadata fields that may carry the DNS response code.
const RCODE_FIELDS: &[&str] = &["rcode", "rcode_name"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensor {
    Zeek,
    Suricata,
}

impl std::fmt::Display for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sensor::Zeek => write!(f, "zeek"),
            Sensor::Suricata => write!(f, "suricata"),
        }
    }
}

/// One normalized telemetry record.
///
/// `metadata` holds every raw field that did not map onto a canonical
/// column, keyed in sorted order so serialization is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// UTC epoch seconds.
    pub ts: f64,
    pub sensor: Sensor,
    pub event_type: String,
    pub src_ip: Option<String>,
    pub dst_ip: Option<String>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    /// Lowercase protocol name, possibly empty.
    pub proto: String,
    /// Sensor-native identifier: Zeek `uid` or Suricata `flow_id`.
    pub correlation_id: Option<String>,
    pub severity: Option<u8>,
    pub signature: Option<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl NormalizedEvent {
    /// Connection-class events feed the recon/scan detector.
    pub fn is_connection(&self) -> bool {
        matches!(self.event_type.as_str(), "conn" | "flow")
    }

    pub fn is_dns(&self) -> bool {
        self.event_type == "dns"
    }

    /// Queried domain name, if any of the known metadata fields carry one.
    pub fn domain(&self) -> Option<&str> {
        DOMAIN_FIELDS
            .iter()
            .find_map(|f| self.metadata.get(*f).and_then(|v| v.as_str()))
            .filter(|s| !s.is_empty())
    }

    pub fn is_nxdomain(&self) -> bool {
        RCODE_FIELDS.iter().any(|f| {
            self.metadata
                .get(*f)
                .and_then(|v| v.as_str())
                .map_or(false, |s| s.eq_ignore_ascii_case("NXDOMAIN"))
        })
    }

    /// True when the event involves `ip` on either end.
    pub fn touches_ip(&self, ip: &str) -> bool {
        self.src_ip.as_deref() == Some(ip) || self.dst_ip.as_deref() == Some(ip)
    }
}

/// Parsed vs. dropped record counts for one sensor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorStats {
    pub parsed: usize,
    pub dropped: usize,
}

/// Per-sensor normalization counters, reported in the run manifest.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub zeek: SensorStats,
    pub suricata: SensorStats,
}

impl NormalizeStats {
    pub fn total_parsed(&self) -> usize {
        self.zeek.parsed + self.suricata.parsed
    }

    pub fn total_dropped(&self) -> usize {
        self.zeek.dropped + self.suricata.dropped
    }
}

/// Stable sort by timestamp; ingestion order breaks ties.
///
/// Every time-windowed computation downstream relies on this ordering.
pub fn sort_by_timestamp(events: &mut [NormalizedEvent]) {
    events.sort_by(|a, b| a.ts.partial_cmp(&b.ts).unwrap_or(std::cmp::Ordering::Equal));
}
