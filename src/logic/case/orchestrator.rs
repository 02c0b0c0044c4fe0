//! Case assembly driver.
//!
//! Runs triage -> evidence -> critic sequentially over in-memory
//! collections and owns the audit trace. The critic loop is an explicit
//! state machine over [`CaseStatus`] with a retry budget of exactly one:
//! a case short on evidence gets one widened re-collection, then settles
//! into Accepted or Rejected.

use serde_json::json;

use crate::logic::config::PipelineConfig;
use crate::logic::detect::Detection;
use crate::logic::event::NormalizedEvent;
use crate::logic::trace::TraceLog;

use super::critic::CaseCritic;
use super::evidence::{EvidenceCollector, EvidenceScope};
use super::triage::CaseAssembler;
use super::types::{Case, CaseStatus};

pub struct Orchestrator<'a> {
    events: &'a [NormalizedEvent],
    config: &'a PipelineConfig,
    trace: &'a TraceLog,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        events: &'a [NormalizedEvent],
        config: &'a PipelineConfig,
        trace: &'a TraceLog,
    ) -> Self {
        Self {
            events,
            config,
            trace,
        }
    }

    /// Run the full assembly pipeline and return every case in a terminal
    /// state. Zero detections yield zero cases, not an error.
    pub fn run(&self, detections: &[Detection]) -> Vec<Case> {
        self.trace.record(
            "orchestrator",
            "start",
            json!({"detection_count": detections.len()}),
        );

        // Stage 1: triage.
        self.trace.record("triage", "start", json!({}));
        let assembler = CaseAssembler::new(&self.config.detectors);
        let mut cases = assembler.assemble(detections);
        self.trace.record(
            "triage",
            "complete",
            json!({"case_count": cases.len(), "case_ids": case_ids(&cases)}),
        );

        // Stage 2: initial evidence collection.
        let collector = EvidenceCollector::new(self.events, self.config);
        self.trace
            .record("evidence", "start", json!({"case_ids": case_ids(&cases)}));
        for case in &mut cases {
            case.evidence = collector.collect(case, EvidenceScope::Initial);
        }
        self.trace.record(
            "evidence",
            "complete",
            json!({"cases_processed": cases.len()}),
        );

        // Stage 3: critic validation with the bounded retry.
        let critic = CaseCritic::new(&self.config.case_assembly);
        self.trace
            .record("critic", "start", json!({"case_ids": case_ids(&cases)}));
        for case in &mut cases {
            self.settle(case, &collector, &critic);
        }
        let accepted = cases
            .iter()
            .filter(|c| c.status == CaseStatus::Accepted)
            .count();
        self.trace.record(
            "critic",
            "complete",
            json!({"cases_validated": cases.len(), "accepted": accepted}),
        );

        self.trace.record(
            "orchestrator",
            "complete",
            json!({"final_case_count": cases.len()}),
        );
        cases
    }

    /// Drive one case from Pending to a terminal state.
    fn settle(&self, case: &mut Case, collector: &EvidenceCollector, critic: &CaseCritic) {
        let first = critic.validate(case, self.events);

        if first.passed() {
            case.validation = Some(first);
            case.status = CaseStatus::Accepted;
            return;
        }

        if !first.has_min_evidence {
            // Sparse evidence earns exactly one widened re-collection.
            case.status = CaseStatus::NeedsEvidence;
            self.trace.record(
                "critic",
                "request_evidence",
                json!({"case_id": case.case_id, "reasons": first.reasons}),
            );

            case.evidence = collector.collect(case, EvidenceScope::Widened);
            let second = critic.validate(case, self.events);
            case.status = if second.passed() {
                CaseStatus::Accepted
            } else {
                CaseStatus::Rejected
            };
            case.validation = Some(second);
            return;
        }

        // Evidence was sufficient but another check failed; no amount of
        // re-collection changes that.
        case.validation = Some(first);
        case.status = CaseStatus::Rejected;
    }
}

fn case_ids(cases: &[Case]) -> Vec<&str> {
    cases.iter().map(|c| c.case_id.as_str()).collect()
}
