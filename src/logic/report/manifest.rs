//! Run manifest.
//!
//! One JSON document per run recording what went in, what came out, and the
//! exact configuration used, so a run can be reproduced and audited later.

use serde::Serialize;

use crate::logic::case::{Case, CaseStatus};
use crate::logic::config::PipelineConfig;
use crate::logic::event::NormalizeStats;

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CaseCounts {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
}

#[derive(Debug, Serialize)]
pub struct RunManifest {
    pub run_id: String,
    pub generated_at: String,
    pub version: String,
    pub normalize_stats: NormalizeStats,
    pub detection_count: usize,
    pub case_counts: CaseCounts,
    pub config: PipelineConfig,
    pub outputs: Vec<String>,
}

impl RunManifest {
    pub fn new(
        stats: NormalizeStats,
        detection_count: usize,
        cases: &[Case],
        config: &PipelineConfig,
        outputs: &[&str],
    ) -> Self {
        let mut counts = CaseCounts {
            total: cases.len(),
            ..CaseCounts::default()
        };
        for case in cases {
            match case.status {
                CaseStatus::Accepted => counts.accepted += 1,
                CaseStatus::Rejected => counts.rejected += 1,
                _ => {}
            }
        }

        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            normalize_stats: stats,
            detection_count,
            case_counts: counts,
            config: config.clone(),
            outputs: outputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}
