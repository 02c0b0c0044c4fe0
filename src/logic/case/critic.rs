//! Case critic.
//!
//! Validates case completeness with three named checks, evaluated in fixed
//! order and never short-circuited - a failed case reports every reason, not
//! just the first. The critic itself is pure; the orchestrator drives the
//! bounded retry state machine around it.

use crate::logic::config::CaseConfig;
use crate::logic::event::NormalizedEvent;

use super::types::{Case, Validation};

pub struct CaseCritic {
    min_evidence_rows: usize,
    confidence_threshold: f64,
}

impl CaseCritic {
    pub fn new(config: &CaseConfig) -> Self {
        Self {
            min_evidence_rows: config.min_evidence_rows,
            confidence_threshold: config.confidence_threshold,
        }
    }

    pub fn validate(&self, case: &Case, events: &[NormalizedEvent]) -> Validation {
        let evidence_count = case.evidence.len();
        let mut reasons = Vec::new();

        // Check 1: minimum evidence rows.
        let has_min_evidence = evidence_count >= self.min_evidence_rows;
        if !has_min_evidence {
            reasons.push(format!(
                "insufficient evidence rows: {} < {}",
                evidence_count, self.min_evidence_rows
            ));
        }

        // Check 2: aggregate detection confidence.
        let aggregate_confidence = aggregate_confidence(case);
        let meets_confidence = aggregate_confidence >= self.confidence_threshold;
        if !meets_confidence {
            reasons.push(format!(
                "aggregate confidence {:.2} below threshold {:.2}",
                aggregate_confidence, self.confidence_threshold
            ));
        }

        // Check 3: every referenced IP/domain covered by evidence.
        let uncovered = uncovered_references(case, events);
        let references_covered = uncovered.is_empty();
        if !references_covered {
            reasons.push(format!("uncovered references: {}", uncovered.join(", ")));
        }

        let validation = Validation {
            has_min_evidence,
            meets_confidence,
            references_covered,
            aggregate_confidence,
            evidence_count,
            reasons,
        };

        log::info!(
            "critic validated {}: passed={}, confidence={:.2}",
            case.case_id,
            validation.passed(),
            aggregate_confidence
        );
        validation
    }
}

fn aggregate_confidence(case: &Case) -> f64 {
    if case.detections.is_empty() {
        return 0.0;
    }
    case.detections.iter().map(|d| d.confidence).sum::<f64>() / case.detections.len() as f64
}

fn uncovered_references(case: &Case, events: &[NormalizedEvent]) -> Vec<String> {
    let rows: Vec<&NormalizedEvent> = case
        .evidence
        .iter()
        .filter_map(|&i| events.get(i))
        .collect();

    let mut uncovered = Vec::new();

    let ip_covered = |ip: &str| rows.iter().any(|ev| ev.touches_ip(ip));
    if !ip_covered(&case.src_ip) {
        uncovered.push(case.src_ip.clone());
    }
    for dst in &case.dst_ips {
        if !ip_covered(dst) {
            uncovered.push(dst.clone());
        }
    }
    for domain in &case.domains {
        let covered = rows.iter().any(|ev| ev.domain() == Some(domain.as_str()));
        if !covered {
            uncovered.push(domain.clone());
        }
    }

    uncovered
}
