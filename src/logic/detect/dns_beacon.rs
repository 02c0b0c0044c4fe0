//! DNS beaconing detector.
//!
//! Partitions DNS events by (source IP, queried domain) and windows each
//! partition the same way the recon detector does. A window is flagged when
//! its query count reaches `repeated_query_threshold` or its NXDOMAIN
//! fraction reaches `nxdomain_ratio_threshold`.
//!
//! Confidence blends the two signals with fixed weights: query volume is the
//! stronger beaconing indicator, the NXDOMAIN ratio corroborates DGA-style
//! lookups. The query score saturates at twice the threshold.

use std::collections::BTreeMap;

use serde_json::json;

use crate::logic::config::DnsBeaconConfig;
use crate::logic::event::NormalizedEvent;

use super::types::{Detection, DetectionKind};

const QUERY_WEIGHT: f64 = 0.7;
const NXDOMAIN_WEIGHT: f64 = 0.3;

pub(super) fn detect(events: &[NormalizedEvent], config: &DnsBeaconConfig) -> Vec<Detection> {
    let mut by_key: BTreeMap<(&str, &str), Vec<&NormalizedEvent>> = BTreeMap::new();
    for ev in events.iter().filter(|e| e.is_dns()) {
        if let (Some(src), Some(domain)) = (ev.src_ip.as_deref(), ev.domain()) {
            by_key.entry((src, domain)).or_default().push(ev);
        }
    }

    let window = config.time_window_seconds as f64;
    let mut detections = Vec::new();

    for ((src_ip, domain), partition) in by_key {
        let mut i = 0;
        while i < partition.len() {
            let window_start = partition[i].ts;
            let boundary = window_start + window;

            let mut nxdomain = 0usize;
            let mut j = i;
            while j < partition.len() && partition[j].ts < boundary {
                if partition[j].is_nxdomain() {
                    nxdomain += 1;
                }
                j += 1;
            }

            let count = j - i;
            let window_end = partition[j - 1].ts;
            if let Some(detection) = evaluate_window(
                config,
                src_ip,
                domain,
                count,
                nxdomain,
                window_start,
                window_end,
            ) {
                detections.push(detection);
            }

            i = j;
        }
    }

    log::info!("dns beaconing detector flagged {} windows", detections.len());
    detections
}

#[allow(clippy::too_many_arguments)]
fn evaluate_window(
    config: &DnsBeaconConfig,
    src_ip: &str,
    domain: &str,
    count: usize,
    nxdomain: usize,
    window_start: f64,
    window_end: f64,
) -> Option<Detection> {
    let nxdomain_ratio = nxdomain as f64 / count as f64;
    let repeated = count >= config.repeated_query_threshold;
    let nx_trigger = nxdomain_ratio >= config.nxdomain_ratio_threshold;
    if !repeated && !nx_trigger {
        return None;
    }

    let query_score =
        (count as f64 / (2.0 * config.repeated_query_threshold as f64)).min(1.0);
    let confidence =
        (QUERY_WEIGHT * query_score + NXDOMAIN_WEIGHT * nxdomain_ratio).min(1.0);

    let mut details = BTreeMap::new();
    details.insert("domain".to_string(), json!(domain));
    details.insert("query_count".to_string(), json!(count));
    details.insert("nxdomain_count".to_string(), json!(nxdomain));
    details.insert("nxdomain_ratio".to_string(), json!(nxdomain_ratio));
    details.insert("window_start".to_string(), json!(window_start));
    details.insert("window_end".to_string(), json!(window_end));
    details.insert(
        "time_window_seconds".to_string(),
        json!(config.time_window_seconds),
    );

    Some(Detection {
        kind: DetectionKind::DnsBeacon,
        ts: window_start,
        src_ip: src_ip.to_string(),
        // Queries fan through resolvers; there is no single destination.
        dst_ip: None,
        confidence,
        details,
    })
}
