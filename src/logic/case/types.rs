use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::logic::detect::{Detection, DetectionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Pending,
    Accepted,
    NeedsEvidence,
    Rejected,
}

/// Critic verdict. All three checks are always evaluated; one reason is
/// recorded per failed check, none are short-circuited away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub has_min_evidence: bool,
    pub meets_confidence: bool,
    pub references_covered: bool,
    /// Mean confidence of the member detections.
    pub aggregate_confidence: f64,
    pub evidence_count: usize,
    pub reasons: Vec<String>,
}

impl Validation {
    pub fn passed(&self) -> bool {
        self.has_min_evidence && self.meets_confidence && self.references_covered
    }
}

/// The unit of analyst review.
///
/// A case exclusively owns its detection and evidence lists for the run;
/// evidence entries are indices into the run's immutable event collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    /// Zero-padded sequential id in discovery order, e.g. `CASE_0007`.
    pub case_id: String,
    pub kind: DetectionKind,
    pub src_ip: String,
    pub dst_ips: BTreeSet<String>,
    /// DNS cases only.
    pub domains: BTreeSet<String>,
    pub window_start: f64,
    pub window_end: f64,
    /// Insertion order = discovery order.
    pub detections: Vec<Detection>,
    /// Ascending indices into the run collection, capped by configuration.
    pub evidence: Vec<usize>,
    pub validation: Option<Validation>,
    pub status: CaseStatus,
}

impl Case {
    pub fn from_detection(detection: Detection) -> Self {
        let mut case = Self {
            case_id: String::new(),
            kind: detection.kind,
            src_ip: detection.src_ip.clone(),
            dst_ips: BTreeSet::new(),
            domains: BTreeSet::new(),
            window_start: detection.ts,
            window_end: detection.ts,
            detections: Vec::new(),
            evidence: Vec::new(),
            validation: None,
            status: CaseStatus::Pending,
        };
        case.absorb(detection);
        case
    }

    /// Merge one more detection into the case: widen the window and union
    /// the referenced destinations/domains from the detection details.
    pub fn absorb(&mut self, detection: Detection) {
        if detection.ts < self.window_start {
            self.window_start = detection.ts;
        }
        if detection.ts > self.window_end {
            self.window_end = detection.ts;
        }

        if let Some(dst) = &detection.dst_ip {
            self.dst_ips.insert(dst.clone());
        }
        if let Some(domain) = detection.detail_domain() {
            self.domains.insert(domain.to_string());
        }

        self.detections.push(detection);
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, CaseStatus::Accepted | CaseStatus::Rejected)
    }
}
