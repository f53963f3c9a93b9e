// src/main.rs
//
// Replay driver. Reads JSON-lines keypoint frames (from a file or stdin),
// runs them through per-session detectors and writes the resulting events
// as JSON lines on stdout. Logs go to stderr.
//
// Input line:  {"session": "cam-1", "timestamp_ms": 33.3, "keypoints": [..]}
// Close:       {"session": "cam-1", "end": true}

use anyhow::{Context, Result};
use gesture_detection::pipeline::{GestureEvent, SessionRegistry};
use gesture_detection::{Config, GestureDetector, SignatureStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Deserialize)]
struct FrameMessage {
    #[serde(default = "default_session")]
    session: String,
    #[serde(default)]
    timestamp_ms: Option<f64>,
    #[serde(default)]
    keypoints: Option<Vec<f64>>,
    #[serde(default)]
    end: bool,
}

fn default_session() -> String {
    "default".to_string()
}

#[derive(Serialize)]
struct FrameLine<'a> {
    session: &'a str,
    #[serde(flatten)]
    result: &'a gesture_detection::DetectionResult,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path =
        std::env::var("GESTURE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = Config::load(&config_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("gesture_detection={}", config.logging.level))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("✋ Gesture Detection starting");
    info!("✓ Configuration loaded from {}", config_path);

    if let Some(input) = std::env::args().nth(1) {
        config.replay.input = input;
    }

    let store = Arc::new(
        SignatureStore::load(&config.signatures.dir)
            .with_context(|| format!("loading signatures from {}", config.signatures.dir))?,
    );
    let detector = Arc::new(GestureDetector::new(store, config.detector.clone())?);
    let mut registry = SessionRegistry::new(detector);

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = if config.replay.input.is_empty() {
        info!("Reading frames from stdin");
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        info!("Reading frames from {}", config.replay.input);
        let file = tokio::fs::File::open(&config.replay.input)
            .await
            .with_context(|| format!("opening {}", config.replay.input))?;
        Box::new(BufReader::new(file))
    };

    let replay_start = Instant::now();
    let mut lines = reader.lines();
    let mut line_no: u64 = 0;
    let mut malformed_lines: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message: FrameMessage = match serde_json::from_str(line) {
            Ok(m) => m,
            Err(e) => {
                warn!("Line {}: malformed message: {}", line_no, e);
                malformed_lines += 1;
                continue;
            }
        };

        if message.end {
            registry.end_session(&message.session);
        } else {
            let now = match message.timestamp_ms {
                Some(ts) if ts.is_finite() && (0.0..1e12).contains(&ts) => {
                    replay_start + Duration::from_secs_f64(ts / 1000.0)
                }
                _ => Instant::now(),
            };
            let keypoints = message.keypoints.unwrap_or_default();
            let result = registry.process(&message.session, &keypoints, now);

            if config.replay.emit_all {
                emit(&FrameLine {
                    session: &message.session,
                    result: &result,
                });
            }
        }

        flush_events(&mut registry, config.replay.emit_all);
    }

    for session in registry.session_ids() {
        registry.end_session(&session);
    }
    flush_events(&mut registry, config.replay.emit_all);

    let stats = registry.metrics().summary();
    info!("\n✓ Replay finished");
    info!("  Total frames: {}", stats.total_frames);
    info!("  Gestures detected: {}", stats.detections);
    info!(
        "  Rejected frames: {} (no hand {}, invalid {}, threshold {}, low confidence {}, ambiguous {})",
        stats.rejected_frames(),
        stats.no_hand_frames,
        stats.invalid_frames,
        stats.above_threshold,
        stats.low_confidence,
        stats.ambiguous
    );
    info!("  Cooldown suppressions: {}", stats.cooldown_suppressed);
    if malformed_lines > 0 {
        warn!("  Malformed input lines: {}", malformed_lines);
    }
    info!("  Processing Speed: {:.1} FPS", stats.fps);

    Ok(())
}

/// With `emit_all` every frame is already printed, so events are only drained
fn flush_events(registry: &mut SessionRegistry, emit_all: bool) {
    let events: Vec<GestureEvent> = registry.drain_events();
    if !emit_all {
        for event in &events {
            emit(event);
        }
    }
}

fn emit<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize output: {}", e),
    }
}
