//! Triage: detections -> candidate cases.
//!
//! Grouping key is (kind, source IP, time bucket), where the bucket floors
//! the detection timestamp to the window length of the originating detector.
//! Case ids are assigned in discovery order, so a deterministic detection
//! sequence yields a reproducible case list.

use std::collections::HashMap;

use crate::logic::config::DetectorConfig;
use crate::logic::detect::{Detection, DetectionKind};

use super::types::Case;

pub struct CaseAssembler {
    recon_window_seconds: u64,
    dns_window_seconds: u64,
}

impl CaseAssembler {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            recon_window_seconds: config.recon_scanning.time_window_seconds,
            dns_window_seconds: config.dns_beaconing.time_window_seconds,
        }
    }

    pub fn assemble(&self, detections: &[Detection]) -> Vec<Case> {
        let mut cases: Vec<Case> = Vec::new();
        let mut index: HashMap<(DetectionKind, String, i64), usize> = HashMap::new();

        for detection in detections {
            let bucket = self.bucket(detection);
            let key = (detection.kind, detection.src_ip.clone(), bucket);

            match index.get(&key) {
                Some(&i) => cases[i].absorb(detection.clone()),
                None => {
                    index.insert(key, cases.len());
                    cases.push(Case::from_detection(detection.clone()));
                }
            }
        }

        for (i, case) in cases.iter_mut().enumerate() {
            case.case_id = format!("CASE_{:04}", i + 1);
        }

        log::info!(
            "triage grouped {} detections into {} cases",
            detections.len(),
            cases.len()
        );
        cases
    }

    fn bucket(&self, detection: &Detection) -> i64 {
        let window = match detection.kind {
            DetectionKind::ReconScan => self.recon_window_seconds,
            DetectionKind::DnsBeacon => self.dns_window_seconds,
        };
        (detection.ts / window as f64).floor() as i64
    }
}
