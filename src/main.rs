//! Netriage - Command-line entry point.
//!
//! Wires the file-based collaborators around the core pipeline: reads the
//! sensor logs, loads and validates configuration, runs the stages, and
//! persists the run artifacts into a timestamped directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use netriage::logic::config::PipelineConfig;
use netriage::logic::export;
use netriage::logic::ingest::{SuricataReader, ZeekReader};
use netriage::logic::pipeline::{self, PipelineError};
use netriage::logic::report::{render_report, RunManifest};
use netriage::logic::trace::TraceLog;

#[derive(Parser, Debug)]
#[command(name = "netriage", version, about = "Network telemetry triage pipeline")]
struct Cli {
    /// Zeek log directory (conn.log, dns.log)
    #[arg(long, default_value = "data/zeek")]
    zeek_dir: PathBuf,

    /// Suricata log directory (eve.json)
    #[arg(long, default_value = "data/suricata")]
    suricata_dir: PathBuf,

    /// Detector configuration file (YAML or JSON)
    #[arg(short, long, default_value = "configs/detector.yaml")]
    config: PathBuf,

    /// Output directory; each run gets a timestamped subdirectory
    #[arg(short, long, default_value = "reports/runs")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // Configuration problems are fatal before any processing begins.
    let config = PipelineConfig::from_file(&cli.config)?;

    log::info!("reading Zeek logs from {}", cli.zeek_dir.display());
    let zeek = ZeekReader::new(&cli.zeek_dir).parse_all();
    log::info!("reading Suricata logs from {}", cli.suricata_dir.display());
    let suricata = SuricataReader::new(&cli.suricata_dir).parse_all();

    if zeek.records.is_empty() && suricata.records.is_empty() {
        return Err(PipelineError::NoInput {
            zeek: cli.zeek_dir.display().to_string(),
            suricata: cli.suricata_dir.display().to_string(),
        }
        .into());
    }

    let run_dir = cli
        .output
        .join(chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string());
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create run directory {}", run_dir.display()))?;

    let trace = TraceLog::to_file(&run_dir.join("agent_trace.jsonl"))
        .with_context(|| format!("failed to open trace log in {}", run_dir.display()))?;

    let output = pipeline::run(&zeek.records, &suricata.records, &config, &trace)?;

    export::write_jsonl(&run_dir.join("events.jsonl"), &output.events)?;
    export::write_jsonl(&run_dir.join("detections.jsonl"), &output.detections)?;
    export::write_markdown(
        &run_dir.join("case_report.md"),
        &render_report(&output.cases, &output.events),
    )?;

    let manifest = RunManifest::new(
        output.stats,
        output.detections.len(),
        &output.cases,
        &config,
        &[
            "events.jsonl",
            "detections.jsonl",
            "case_report.md",
            "agent_trace.jsonl",
        ],
    );
    export::write_manifest(&run_dir.join("run_manifest.json"), &manifest)?;

    log::info!(
        "run {} complete: {} events, {} detections, {} cases ({} accepted) -> {}",
        manifest.run_id,
        output.events.len(),
        output.detections.len(),
        output.cases.len(),
        manifest.case_counts.accepted,
        run_dir.display()
    );

    Ok(())
}
