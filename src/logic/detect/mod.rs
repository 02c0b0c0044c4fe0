//! Baseline detectors.
//!
//! Two independent, stateless heuristics over the full run collection. Both
//! require the collection to be ts-sorted (stable, ingestion order breaking
//! ties) and never mutate their input. Detection order is deterministic:
//! recon hits first, then DNS hits, each in partition-key order.

mod dns_beacon;
mod recon;
pub mod types;

pub use types::{Detection, DetectionKind};

use crate::logic::config::DetectorConfig;
use crate::logic::event::NormalizedEvent;

pub struct BaselineDetector {
    config: DetectorConfig,
}

impl BaselineDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run every enabled detector. Empty input produces zero detections.
    pub fn detect(&self, events: &[NormalizedEvent]) -> Vec<Detection> {
        let mut detections = Vec::new();

        if self.config.recon_scanning.enabled {
            detections.extend(recon::detect(events, &self.config.recon_scanning));
        }
        if self.config.dns_beaconing.enabled {
            detections.extend(dns_beacon::detect(events, &self.config.dns_beaconing));
        }

        detections
    }
}

// ============================================================================
// TESTS
// ============================================================================
