//! roi-replay - feeds recorded detection frames through an ROI engine
//!
//! Reads a zones document plus a JSONL file of detection frames and replays
//! them against a single engine instance on a manually driven clock, printing
//! each emitted event payload as a JSON line. Stands in for the live video
//! pipeline when tuning zone layouts offline.

use anyhow::Context;
use clap::Parser;
use roi_engine::domain::types::Detection;
use roi_engine::infra::clock::ManualClock;
use roi_engine::io::EventLog;
use roi_engine::services::{RoiEngine, ZoneRegistry};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// Replay recorded detection frames through the ROI engine
#[derive(Parser, Debug)]
#[command(name = "roi-replay", version, about)]
struct Args {
    /// Path to the zones JSON document
    #[arg(short, long, default_value = "config/zones.json")]
    zones: String,

    /// Path to the detection frames file (JSONL, one frame per line)
    #[arg(short, long)]
    frames: String,

    /// Optional JSONL file to append event payloads to
    #[arg(short, long)]
    out: Option<String>,

    /// Frame rate used when a frame carries no explicit timestamp
    #[arg(long, default_value_t = 10.0)]
    fps: f64,
}

/// One recorded frame: optional monotonic offset in seconds plus detections
#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    t: Option<f64>,
    #[serde(default)]
    detections: Vec<Detection>,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    let args = Args::parse();

    let mut registry = ZoneRegistry::new();
    let summary = registry.load_from_file(&args.zones);
    info!(
        zones_file = %args.zones,
        loaded = %summary.loaded,
        total = %summary.total,
        "registry_ready"
    );

    let clock = Arc::new(ManualClock::new());
    let mut engine = RoiEngine::with_clock(registry, clock.clone());
    let event_log = args.out.as_deref().map(EventLog::new);

    let file = File::open(&args.frames)
        .with_context(|| format!("failed to open frames file {}", args.frames))?;
    let reader = BufReader::new(file);

    let mut frame_count = 0usize;
    let mut event_count = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read frame line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: FrameRecord = serde_json::from_str(&line)
            .with_context(|| format!("malformed frame record at line {}", index + 1))?;

        let elapsed = frame.t.unwrap_or(index as f64 / args.fps);
        clock.set(Duration::from_secs_f64(elapsed));

        let events = engine.process_frame(&frame.detections);
        frame_count += 1;
        event_count += events.len();

        for event in &events {
            println!("{}", serde_json::to_string(&event.payload())?);
        }
        if let Some(ref log) = event_log {
            log.write_events(&events);
        }
    }

    info!(frames = %frame_count, events = %event_count, "replay_complete");
    Ok(())
}
