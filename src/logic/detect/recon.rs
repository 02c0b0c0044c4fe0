//! Recon/scan detector.
//!
//! Partitions connection events by source IP and slides a fixed-size,
//! non-overlapping window over each partition: the window opens at the first
//! unconsumed event and closes `time_window_seconds` later. A window is
//! flagged when its distinct-destination count reaches `fan_out_threshold`
//! or its total connection count reaches `burst_threshold`.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::json;

use crate::logic::config::ReconConfig;
use crate::logic::event::NormalizedEvent;

use super::types::{Detection, DetectionKind};

/// Confidence is 0.5 exactly at threshold and grows with the excess.
const CONFIDENCE_AT_THRESHOLD: f64 = 0.5;

pub(super) fn detect(events: &[NormalizedEvent], config: &ReconConfig) -> Vec<Detection> {
    let mut by_src: BTreeMap<&str, Vec<&NormalizedEvent>> = BTreeMap::new();
    for ev in events.iter().filter(|e| e.is_connection()) {
        if let Some(src) = ev.src_ip.as_deref() {
            by_src.entry(src).or_default().push(ev);
        }
    }

    let window = config.time_window_seconds as f64;
    let mut detections = Vec::new();

    for (src_ip, partition) in by_src {
        // The run collection is ts-sorted, so each partition is too.
        let mut i = 0;
        while i < partition.len() {
            let window_start = partition[i].ts;
            let boundary = window_start + window;

            let mut dst_ips: BTreeSet<&str> = BTreeSet::new();
            let mut j = i;
            while j < partition.len() && partition[j].ts < boundary {
                if let Some(dst) = partition[j].dst_ip.as_deref() {
                    dst_ips.insert(dst);
                }
                j += 1;
            }

            let total = j - i;
            let window_end = partition[j - 1].ts;
            if let Some(detection) = evaluate_window(
                config,
                src_ip,
                &dst_ips,
                total,
                window_start,
                window_end,
            ) {
                detections.push(detection);
            }

            i = j;
        }
    }

    log::info!("recon detector flagged {} windows", detections.len());
    detections
}

fn evaluate_window(
    config: &ReconConfig,
    src_ip: &str,
    dst_ips: &BTreeSet<&str>,
    total: usize,
    window_start: f64,
    window_end: f64,
) -> Option<Detection> {
    let fan_out_ratio = dst_ips.len() as f64 / config.fan_out_threshold as f64;
    let burst_ratio = total as f64 / config.burst_threshold as f64;
    if fan_out_ratio < 1.0 && burst_ratio < 1.0 {
        return None;
    }

    let confidence =
        (CONFIDENCE_AT_THRESHOLD * fan_out_ratio.max(burst_ratio)).min(1.0);

    let mut details = BTreeMap::new();
    details.insert("unique_destinations".to_string(), json!(dst_ips.len()));
    details.insert("connection_count".to_string(), json!(total));
    details.insert("window_start".to_string(), json!(window_start));
    details.insert("window_end".to_string(), json!(window_end));
    details.insert(
        "time_window_seconds".to_string(),
        json!(config.time_window_seconds),
    );

    Some(Detection {
        kind: DetectionKind::ReconScan,
        ts: window_start,
        src_ip: src_ip.to_string(),
        // A single destination is worth naming; a spread is not.
        dst_ip: if dst_ips.len() == 1 {
            dst_ips.iter().next().map(|s| s.to_string())
        } else {
            None
        },
        confidence,
        details,
    })
}
