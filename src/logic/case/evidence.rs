//! Evidence collection.
//!
//! Pulls supporting rows for a case out of the run's immutable event
//! collection. Pure function of (case, scope): calling twice with the same
//! inputs yields the same rows, which the critic's retry loop relies on.
//!
//! The widened scope gives sparse cases a second chance: the time span is
//! doubled, IP matching relaxes to either endpoint, and the DNS domain
//! restriction is dropped.

use crate::logic::config::PipelineConfig;
use crate::logic::detect::DetectionKind;
use crate::logic::event::NormalizedEvent;

use super::types::Case;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceScope {
    Initial,
    Widened,
}

pub struct EvidenceCollector<'a> {
    events: &'a [NormalizedEvent],
    max_rows: usize,
    recon_window_seconds: u64,
    dns_window_seconds: u64,
}

impl<'a> EvidenceCollector<'a> {
    pub fn new(events: &'a [NormalizedEvent], config: &PipelineConfig) -> Self {
        Self {
            events,
            max_rows: config.case_assembly.max_evidence_rows,
            recon_window_seconds: config.detectors.recon_scanning.time_window_seconds,
            dns_window_seconds: config.detectors.dns_beaconing.time_window_seconds,
        }
    }

    /// Up to `max_evidence_rows` indices into the run collection, ascending.
    /// The collection is ts-sorted, so index order is timestamp order with
    /// ingestion order breaking ties.
    pub fn collect(&self, case: &Case, scope: EvidenceScope) -> Vec<usize> {
        let (start, end) = self.time_bounds(case, scope);

        let mut rows = Vec::new();
        for (index, ev) in self.events.iter().enumerate() {
            if ev.ts < start {
                continue;
            }
            if ev.ts > end {
                break;
            }
            if self.matches(case, ev, scope) {
                rows.push(index);
                if rows.len() == self.max_rows {
                    break;
                }
            }
        }
        rows
    }

    fn time_bounds(&self, case: &Case, scope: EvidenceScope) -> (f64, f64) {
        match scope {
            EvidenceScope::Initial => (case.window_start, case.window_end),
            EvidenceScope::Widened => {
                let span = case.window_end - case.window_start;
                let pad = if span > 0.0 {
                    span / 2.0
                } else {
                    // A single-detection case has a zero-span window; fall
                    // back to half the originating detector's window.
                    self.detector_window(case.kind) / 2.0
                };
                (case.window_start - pad, case.window_end + pad)
            }
        }
    }

    fn detector_window(&self, kind: DetectionKind) -> f64 {
        match kind {
            DetectionKind::ReconScan => self.recon_window_seconds as f64,
            DetectionKind::DnsBeacon => self.dns_window_seconds as f64,
        }
    }

    fn matches(&self, case: &Case, ev: &NormalizedEvent, scope: EvidenceScope) -> bool {
        let class_ok = match case.kind {
            DetectionKind::ReconScan => ev.is_connection(),
            DetectionKind::DnsBeacon => ev.is_dns(),
        };
        if !class_ok {
            return false;
        }

        match scope {
            EvidenceScope::Initial => {
                if ev.src_ip.as_deref() != Some(case.src_ip.as_str()) {
                    return false;
                }
                if !case.dst_ips.is_empty() {
                    match ev.dst_ip.as_deref() {
                        Some(dst) if case.dst_ips.contains(dst) => {}
                        _ => return false,
                    }
                }
                if case.kind == DetectionKind::DnsBeacon && !case.domains.is_empty() {
                    match ev.domain() {
                        Some(domain) if case.domains.contains(domain) => {}
                        _ => return false,
                    }
                }
                true
            }
            EvidenceScope::Widened => {
                ev.touches_ip(&case.src_ip)
                    || case.dst_ips.iter().any(|ip| ev.touches_ip(ip))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::event::{sort_by_timestamp, Sensor};
    use std::collections::BTreeMap;

    fn conn(ts: f64, src: &str, dst: &str) -> NormalizedEvent {
        NormalizedEvent {
            ts,
            sensor: Sensor::Zeek,
            event_type: "conn".to_string(),
            src_ip: Some(src.to_string()),
            dst_ip: Some(dst.to_string()),
            src_port: None,
            dst_port: Some(80),
            proto: "tcp".to_string(),
            correlation_id: None,
            severity: None,
            signature: None,
            metadata: BTreeMap::new(),
        }
    }

    fn recon_case(src: &str, start: f64, end: f64) -> Case {
        use crate::logic::detect::Detection;
        let mut case = Case::from_detection(Detection {
            kind: DetectionKind::ReconScan,
            ts: start,
            src_ip: src.to_string(),
            dst_ip: None,
            confidence: 0.8,
            details: BTreeMap::new(),
        });
        case.window_end = end;
        case
    }

    fn fixture() -> Vec<NormalizedEvent> {
        let mut events = vec![
            conn(90.0, "10.0.0.5", "10.1.0.1"),  // before window
            conn(100.0, "10.0.0.5", "10.1.0.1"), // in window
            conn(150.0, "10.0.0.9", "10.0.0.5"), // other direction
            conn(200.0, "10.0.0.5", "10.1.0.2"), // in window (boundary)
            conn(250.0, "10.0.0.5", "10.1.0.3"), // after window
        ];
        sort_by_timestamp(&mut events);
        events
    }

    #[test]
    fn test_initial_scope_filters_window_and_source() {
        let events = fixture();
        let collector = EvidenceCollector::new(&events, &PipelineConfig::default());
        let case = recon_case("10.0.0.5", 100.0, 200.0);

        let rows = collector.collect(&case, EvidenceScope::Initial);

        // Window is inclusive on both ends; the reverse-direction event and
        // the out-of-window ones are excluded.
        assert_eq!(rows, vec![1, 3]);
    }

    #[test]
    fn test_collect_is_idempotent() {
        let events = fixture();
        let collector = EvidenceCollector::new(&events, &PipelineConfig::default());
        let case = recon_case("10.0.0.5", 100.0, 200.0);

        let first = collector.collect(&case, EvidenceScope::Initial);
        let second = collector.collect(&case, EvidenceScope::Initial);
        assert_eq!(first, second);

        let widened_first = collector.collect(&case, EvidenceScope::Widened);
        let widened_second = collector.collect(&case, EvidenceScope::Widened);
        assert_eq!(widened_first, widened_second);
    }

    #[test]
    fn test_widened_scope_doubles_span_and_relaxes_direction() {
        let events = fixture();
        let collector = EvidenceCollector::new(&events, &PipelineConfig::default());
        let case = recon_case("10.0.0.5", 100.0, 200.0);

        let rows = collector.collect(&case, EvidenceScope::Widened);

        // Span 100 widens to [50, 250]; either-endpoint matching now also
        // admits the inbound event.
        assert_eq!(rows, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_widened_zero_span_uses_detector_window() {
        let events = fixture();
        let collector = EvidenceCollector::new(&events, &PipelineConfig::default());
        let case = recon_case("10.0.0.5", 150.0, 150.0);

        // Recon window 300 pads 150 on each side: [0, 300] covers everything.
        let rows = collector.collect(&case, EvidenceScope::Widened);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_cap_is_respected() {
        let mut events: Vec<NormalizedEvent> = (0..50)
            .map(|i| conn(100.0 + i as f64, "10.0.0.5", "10.1.0.1"))
            .collect();
        sort_by_timestamp(&mut events);

        let mut config = PipelineConfig::default();
        config.case_assembly.max_evidence_rows = 7;
        let collector = EvidenceCollector::new(&events, &config);
        let case = recon_case("10.0.0.5", 100.0, 200.0);

        let rows = collector.collect(&case, EvidenceScope::Initial);
        assert_eq!(rows.len(), 7);
        // Earliest rows win.
        assert_eq!(rows, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_destination_set_narrows_match() {
        let events = fixture();
        let collector = EvidenceCollector::new(&events, &PipelineConfig::default());
        let mut case = recon_case("10.0.0.5", 90.0, 250.0);
        case.dst_ips.insert("10.1.0.2".to_string());

        let rows = collector.collect(&case, EvidenceScope::Initial);
        assert_eq!(rows, vec![3]);
    }

    #[test]
    fn test_rows_are_subset_of_run_collection() {
        let events = fixture();
        let collector = EvidenceCollector::new(&events, &PipelineConfig::default());
        let case = recon_case("10.0.0.5", 100.0, 200.0);

        for scope in [EvidenceScope::Initial, EvidenceScope::Widened] {
            for index in collector.collect(&case, scope) {
                let ev = &events[index];
                assert!(ev.is_connection());
            }
        }
    }
}
