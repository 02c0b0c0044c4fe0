use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    ReconScan,
    DnsBeacon,
}

impl std::fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionKind::ReconScan => write!(f, "recon_scan"),
            DetectionKind::DnsBeacon => write!(f, "dns_beacon"),
        }
    }
}

/// One detector hit. Never mutated after creation; many detections may
/// reference the same source IP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: DetectionKind,
    /// Start of the flagged window, UTC epoch seconds.
    pub ts: f64,
    pub src_ip: String,
    /// Absent when the detection aggregates many destinations.
    pub dst_ip: Option<String>,
    /// Within [0, 1].
    pub confidence: f64,
    /// Evidence-specific counts, keyed in sorted order for stable output.
    pub details: BTreeMap<String, serde_json::Value>,
}

impl Detection {
    /// Queried domain recorded by the DNS detector, if any.
    pub fn detail_domain(&self) -> Option<&str> {
        self.details.get("domain").and_then(|v| v.as_str())
    }
}
