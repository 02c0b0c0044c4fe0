//! Markdown case reports.
//!
//! Consumes validated cases plus the run collection and emits the analyst
//! view: executive summary, detail tables, evidence rows, and the detector's
//! reasoning. Only reads the structures it is handed.

use crate::logic::case::{Case, CaseStatus};
use crate::logic::detect::DetectionKind;
use crate::logic::event::NormalizedEvent;

/// Evidence rows shown per case; the full set stays in the events snapshot.
const EVIDENCE_DISPLAY_ROWS: usize = 20;

/// Consolidated report: a header plus one section per case.
pub fn render_report(cases: &[Case], events: &[NormalizedEvent]) -> String {
    let mut s = String::new();
    s.push_str("# SOC Case Report\n\n");
    s.push_str(&format!("**Generated Cases:** {}\n\n", cases.len()));
    s.push_str("---\n\n");

    for (i, case) in cases.iter().enumerate() {
        s.push_str(&format!("## Case {}: {}\n\n", i + 1, case.case_id));
        s.push_str(&render_case(case, events));
        s.push_str("\n---\n\n");
    }

    s
}

/// One case section.
pub fn render_case(case: &Case, events: &[NormalizedEvent]) -> String {
    let mut s = String::new();

    render_summary(&mut s, case);
    render_details(&mut s, case);
    render_timeline(&mut s, case);
    render_evidence(&mut s, case, events);
    render_reasoning(&mut s, case);
    render_confidence(&mut s, case);

    s
}

fn render_summary(s: &mut String, case: &Case) {
    s.push_str("### Executive Summary\n\n");
    let evidence_count = case.evidence.len();
    let detection_count = case.detections.len();
    match case.kind {
        DetectionKind::ReconScan => s.push_str(&format!(
            "This case involves reconnaissance and scanning activity originating from {}. \
             The source exhibited high fan-out connections to multiple destination IPs \
             within a short time window. {} detection(s) were generated, supported by {} \
             evidence row(s).\n\n",
            case.src_ip, detection_count, evidence_count
        )),
        DetectionKind::DnsBeacon => s.push_str(&format!(
            "This case involves DNS beaconing activity originating from {}. \
             The source exhibited repeated queries to specific domains, consistent with \
             command and control communication. {} detection(s) were generated, supported \
             by {} evidence row(s).\n\n",
            case.src_ip, detection_count, evidence_count
        )),
    }
}

fn render_details(s: &mut String, case: &Case) {
    s.push_str("### Case Details\n\n");
    s.push_str("| Field | Value |\n|-------|-------|\n");
    s.push_str(&format!("| Case ID | {} |\n", case.case_id));
    s.push_str(&format!("| Detection Type | {} |\n", case.kind));
    s.push_str(&format!("| Source IP | {} |\n", case.src_ip));
    s.push_str(&format!("| Status | {} |\n", status_label(case.status)));
    s.push_str(&format!("| Detections | {} |\n", case.detections.len()));
    s.push_str(&format!("| Evidence Rows | {} |\n", case.evidence.len()));
    if !case.dst_ips.is_empty() {
        let dsts: Vec<&str> = case.dst_ips.iter().map(String::as_str).collect();
        s.push_str(&format!("| Destinations | {} |\n", dsts.join(", ")));
    }
    if !case.domains.is_empty() {
        let domains: Vec<&str> = case.domains.iter().map(String::as_str).collect();
        s.push_str(&format!("| Domains | {} |\n", domains.join(", ")));
    }
    s.push('\n');
}

fn render_timeline(s: &mut String, case: &Case) {
    s.push_str("### Timeline\n\n");
    s.push_str("| Event | Timestamp |\n|-------|----------|\n");
    s.push_str(&format!(
        "| Case Start | {} |\n",
        format_ts(case.window_start)
    ));
    s.push_str(&format!("| Case End | {} |\n", format_ts(case.window_end)));
    let duration = case.window_end - case.window_start;
    s.push_str(&format!("| Duration | {} |\n\n", format_duration(duration)));
}

fn render_evidence(s: &mut String, case: &Case, events: &[NormalizedEvent]) {
    s.push_str("### Evidence\n\n");
    if case.evidence.is_empty() {
        s.push_str("*No evidence rows available for this case.*\n\n");
        return;
    }

    s.push_str("| Timestamp | Sensor | Event Type | Source IP | Dest IP | Ports | Signature |\n");
    s.push_str("|-----------|--------|------------|-----------|---------|-------|-----------|\n");

    for &index in case.evidence.iter().take(EVIDENCE_DISPLAY_ROWS) {
        let Some(ev) = events.get(index) else {
            continue;
        };
        s.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            format_ts(ev.ts),
            ev.sensor,
            ev.event_type,
            ev.src_ip.as_deref().unwrap_or("N/A"),
            ev.dst_ip.as_deref().unwrap_or("N/A"),
            format_ports(ev),
            format_signature(ev),
        ));
    }

    if case.evidence.len() > EVIDENCE_DISPLAY_ROWS {
        s.push_str(&format!(
            "\n*Showing top {} of {} evidence rows. Full rows available in the events snapshot.*\n",
            EVIDENCE_DISPLAY_ROWS,
            case.evidence.len()
        ));
    }
    s.push('\n');
}

fn render_reasoning(s: &mut String, case: &Case) {
    s.push_str("### Detector Reasoning\n\n");
    match case.kind {
        DetectionKind::ReconScan => s.push_str(
            "**Why this case was flagged:**\n\n\
             - High fan-out: the source connected to an unusually high number of unique destination IPs\n\
             - Time concentration: the connections occurred within a short window\n\
             - Pattern consistency: the behavior matches network scanning preceding an attack\n\n",
        ),
        DetectionKind::DnsBeacon => s.push_str(
            "**Why this case was flagged:**\n\n\
             - Repeated queries: the source repeatedly queried the same domain(s)\n\
             - Query frequency: the pattern suggests periodic automated communication\n\
             - Resolution failures: NXDOMAIN responses can indicate DGA-style lookups\n\n",
        ),
    }
}

fn render_confidence(s: &mut String, case: &Case) {
    s.push_str("### Confidence & Validation\n\n");
    let Some(v) = &case.validation else {
        s.push_str("*Case has not been validated.*\n\n");
        return;
    };

    s.push_str(&format!(
        "**Confidence Score:** {:.2} ({})\n\n",
        v.aggregate_confidence,
        confidence_label(v.aggregate_confidence)
    ));

    if v.reasons.is_empty() {
        s.push_str("All validation checks passed.\n\n");
    } else {
        s.push_str("**Validation findings:**\n\n");
        for reason in &v.reasons {
            s.push_str(&format!("- {}\n", reason));
        }
        s.push('\n');
    }
}

fn status_label(status: CaseStatus) -> &'static str {
    match status {
        CaseStatus::Pending => "PENDING",
        CaseStatus::Accepted => "ACCEPTED",
        CaseStatus::NeedsEvidence => "NEEDS_EVIDENCE",
        CaseStatus::Rejected => "REJECTED",
    }
}

fn confidence_label(confidence: f64) -> &'static str {
    if confidence >= 0.8 {
        "High"
    } else if confidence >= 0.6 {
        "Medium"
    } else {
        "Low"
    }
}

fn format_ts(ts: f64) -> String {
    let secs = ts.floor() as i64;
    let nanos = ((ts - secs as f64) * 1e9) as u32;
    match chrono::DateTime::from_timestamp(secs, nanos) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{:.3}", ts),
    }
}

fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1} seconds", seconds)
    } else if seconds < 3600.0 {
        format!("{:.1} minutes", seconds / 60.0)
    } else {
        format!("{:.1} hours", seconds / 3600.0)
    }
}

fn format_ports(ev: &NormalizedEvent) -> String {
    match (ev.src_port, ev.dst_port) {
        (Some(s), Some(d)) => format!("{}:{}", s, d),
        (None, Some(d)) => d.to_string(),
        _ => "N/A".to_string(),
    }
}

fn format_signature(ev: &NormalizedEvent) -> String {
    match ev.signature.as_deref() {
        Some(sig) if sig.chars().count() > 40 => {
            format!("{}...", sig.chars().take(37).collect::<String>())
        }
        Some(sig) => sig.to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::case::Validation;
    use crate::logic::detect::Detection;
    use crate::logic::event::Sensor;
    use std::collections::BTreeMap;

    fn sample_case_and_events() -> (Case, Vec<NormalizedEvent>) {
        let events = vec![NormalizedEvent {
            ts: 1705312200.0,
            sensor: Sensor::Zeek,
            event_type: "conn".to_string(),
            src_ip: Some("10.0.0.5".to_string()),
            dst_ip: Some("10.1.0.1".to_string()),
            src_port: Some(40000),
            dst_port: Some(445),
            proto: "tcp".to_string(),
            correlation_id: None,
            severity: None,
            signature: None,
            metadata: BTreeMap::new(),
        }];

        let mut case = Case::from_detection(Detection {
            kind: DetectionKind::ReconScan,
            ts: 1705312200.0,
            src_ip: "10.0.0.5".to_string(),
            dst_ip: None,
            confidence: 0.8,
            details: BTreeMap::new(),
        });
        case.case_id = "CASE_0001".to_string();
        case.evidence = vec![0];
        case.status = CaseStatus::Accepted;
        case.validation = Some(Validation {
            has_min_evidence: true,
            meets_confidence: true,
            references_covered: true,
            aggregate_confidence: 0.8,
            evidence_count: 1,
            reasons: vec![],
        });
        (case, events)
    }

    #[test]
    fn test_case_section_contains_all_parts() {
        let (case, events) = sample_case_and_events();
        let md = render_case(&case, &events);

        assert!(md.contains("### Executive Summary"));
        assert!(md.contains("### Case Details"));
        assert!(md.contains("### Timeline"));
        assert!(md.contains("### Evidence"));
        assert!(md.contains("### Detector Reasoning"));
        assert!(md.contains("| Case ID | CASE_0001 |"));
        assert!(md.contains("| Status | ACCEPTED |"));
        assert!(md.contains("10.0.0.5"));
        assert!(md.contains("40000:445"));
        assert!(md.contains("High"));
    }

    #[test]
    fn test_rejected_case_lists_reasons() {
        let (mut case, events) = sample_case_and_events();
        case.status = CaseStatus::Rejected;
        case.validation = Some(Validation {
            has_min_evidence: false,
            meets_confidence: true,
            references_covered: true,
            aggregate_confidence: 0.8,
            evidence_count: 1,
            reasons: vec!["insufficient evidence rows: 1 < 5".to_string()],
        });

        let md = render_case(&case, &events);
        assert!(md.contains("insufficient evidence rows"));
        assert!(md.contains("| Status | REJECTED |"));
    }

    #[test]
    fn test_report_header_counts_cases() {
        let (case, events) = sample_case_and_events();
        let md = render_report(std::slice::from_ref(&case), &events);

        assert!(md.starts_with("# SOC Case Report"));
        assert!(md.contains("**Generated Cases:** 1"));
        assert!(md.contains("## Case 1: CASE_0001"));
    }

    #[test]
    fn test_empty_evidence_note() {
        let (mut case, events) = sample_case_and_events();
        case.evidence.clear();

        let md = render_case(&case, &events);
        assert!(md.contains("*No evidence rows available for this case.*"));
    }
}
