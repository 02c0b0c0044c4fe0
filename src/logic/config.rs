//! Pipeline Configuration
//!
//! Detector thresholds and case-assembly knobs. Loaded from a YAML or JSON
//! file; every field has a default so a partial file is enough. Validation
//! runs once at startup and is fatal - nothing is processed with a bad
//! threshold.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("invalid value for `{option}`: {reason}")]
    Invalid { option: &'static str, reason: String },
}

// ============================================================================
// DETECTOR CONFIG
// ============================================================================

/// Recon/scan detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Window length for fan-out statistics.
    #[serde(default = "default_recon_window")]
    pub time_window_seconds: u64,
    /// Minimum distinct destination IPs in one window to flag.
    #[serde(default = "default_fan_out")]
    pub fan_out_threshold: usize,
    /// Minimum total connection count in one window to flag.
    #[serde(default = "default_burst")]
    pub burst_threshold: usize,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time_window_seconds: default_recon_window(),
            fan_out_threshold: default_fan_out(),
            burst_threshold: default_burst(),
        }
    }
}

/// DNS beaconing detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DnsBeaconConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_dns_window")]
    pub time_window_seconds: u64,
    /// Minimum identical-domain queries per source in one window.
    #[serde(default = "default_repeated_query")]
    pub repeated_query_threshold: usize,
    /// NXDOMAIN fraction that triggers beaconing suspicion on its own.
    #[serde(default = "default_nxdomain_ratio")]
    pub nxdomain_ratio_threshold: f64,
}

impl Default for DnsBeaconConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time_window_seconds: default_dns_window(),
            repeated_query_threshold: default_repeated_query(),
            nxdomain_ratio_threshold: default_nxdomain_ratio(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    #[serde(default)]
    pub recon_scanning: ReconConfig,
    #[serde(default)]
    pub dns_beaconing: DnsBeaconConfig,
}

// ============================================================================
// CASE ASSEMBLY CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    /// Evidence rows retained per case.
    #[serde(default = "default_max_evidence")]
    pub max_evidence_rows: usize,
    /// Critic check 1: rows required for a case to stand.
    #[serde(default = "default_min_evidence")]
    pub min_evidence_rows: usize,
    /// Critic check 2: aggregate detection confidence floor.
    #[serde(default = "default_confidence")]
    pub confidence_threshold: f64,
}

impl Default for CaseConfig {
    fn default() -> Self {
        Self {
            max_evidence_rows: default_max_evidence(),
            min_evidence_rows: default_min_evidence(),
            confidence_threshold: default_confidence(),
        }
    }
}

// ============================================================================
// TOP LEVEL
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub detectors: DetectorConfig,
    #[serde(default)]
    pub case_assembly: CaseConfig,
}

impl PipelineConfig {
    /// Load from a YAML or JSON file, picked by extension (`.json` = JSON,
    /// anything else = YAML).
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path.extension().map_or(false, |ext| ext == "json");
        let config: Self = if is_json {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject unusable thresholds before any processing begins.
    pub fn validate(&self) -> ConfigResult<()> {
        let recon = &self.detectors.recon_scanning;
        if recon.time_window_seconds == 0 {
            return Err(invalid("recon_scanning.time_window_seconds", "must be > 0"));
        }
        if recon.fan_out_threshold == 0 {
            return Err(invalid("recon_scanning.fan_out_threshold", "must be >= 1"));
        }
        if recon.burst_threshold == 0 {
            return Err(invalid("recon_scanning.burst_threshold", "must be >= 1"));
        }

        let dns = &self.detectors.dns_beaconing;
        if dns.time_window_seconds == 0 {
            return Err(invalid("dns_beaconing.time_window_seconds", "must be > 0"));
        }
        if dns.repeated_query_threshold == 0 {
            return Err(invalid("dns_beaconing.repeated_query_threshold", "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&dns.nxdomain_ratio_threshold) {
            return Err(invalid(
                "dns_beaconing.nxdomain_ratio_threshold",
                "must be within [0.0, 1.0]",
            ));
        }

        let case = &self.case_assembly;
        if case.max_evidence_rows == 0 {
            return Err(invalid("case_assembly.max_evidence_rows", "must be >= 1"));
        }
        if !(0.0..=1.0).contains(&case.confidence_threshold) {
            return Err(invalid(
                "case_assembly.confidence_threshold",
                "must be within [0.0, 1.0]",
            ));
        }

        Ok(())
    }
}

fn invalid(option: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        option,
        reason: reason.to_string(),
    }
}

fn default_true() -> bool {
    true
}

fn default_recon_window() -> u64 {
    300
}

fn default_fan_out() -> usize {
    50
}

fn default_burst() -> usize {
    200
}

fn default_dns_window() -> u64 {
    600
}

fn default_repeated_query() -> usize {
    10
}

fn default_nxdomain_ratio() -> f64 {
    0.5
}

fn default_max_evidence() -> usize {
    20
}

fn default_min_evidence() -> usize {
    5
}

fn default_confidence() -> f64 {
    0.6
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detectors.recon_scanning.fan_out_threshold, 50);
        assert_eq!(config.detectors.dns_beaconing.repeated_query_threshold, 10);
        assert_eq!(config.case_assembly.min_evidence_rows, 5);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "detectors:\n  recon_scanning:\n    fan_out_threshold: 5\n";
        let config: PipelineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.detectors.recon_scanning.fan_out_threshold, 5);
        assert_eq!(config.detectors.recon_scanning.time_window_seconds, 300);
        assert_eq!(config.case_assembly.max_evidence_rows, 20);
    }

    #[test]
    fn test_validation_names_the_option() {
        let mut config = PipelineConfig::default();
        config.detectors.recon_scanning.fan_out_threshold = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("recon_scanning.fan_out_threshold"));
    }

    #[test]
    fn test_ratio_bounds_rejected() {
        let mut config = PipelineConfig::default();
        config.detectors.dns_beaconing.nxdomain_ratio_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.case_assembly.confidence_threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detector.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "case_assembly:\n  min_evidence_rows: 3").unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.case_assembly.min_evidence_rows, 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/detector.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/detector.yaml"));
    }
}
