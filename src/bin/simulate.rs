use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use territory_sim::arena::Arena;
use territory_sim::config::{ArenaConfig, SimulationConfig};
use territory_sim::constants::FRAME_MS;
use territory_sim::control::{InputController, InputEvent};
use territory_sim::error::{ConfigError, GridError, MapError};
use territory_sim::obstacle::{ImageLevel, ObstacleSource, OpenField, TileMap};
use territory_sim::render::MaskBuffer;
use territory_sim::types::{ArenaSnapshot, Cell, Side};

const DEFAULT_SECONDS: f32 = 10.0;
const MAX_SECONDS: f32 = 3600.0;
const DEFAULT_HOLD_MS: u64 = 1500;
const DEFAULT_RELEASE_MS: u64 = 1000;
const CHECKPOINT_MS: u64 = 1000;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    map: Option<PathBuf>,
    #[arg(long)]
    width: Option<i32>,
    #[arg(long)]
    height: Option<i32>,
    #[arg(long)]
    seconds: Option<f32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    hold_ms: Option<u64>,
    #[arg(long)]
    release_ms: Option<u64>,
    #[arg(long)]
    player_auto: bool,
    #[arg(long)]
    ascii: bool,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    run_id: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InputScript {
    hold_ms: u64,
    release_ms: u64,
}

impl InputScript {
    fn event_at(&self, elapsed_ms: u64) -> InputEvent {
        let period = self.hold_ms + self.release_ms;
        if period == 0 || elapsed_ms % period < self.hold_ms {
            InputEvent::Press
        } else {
            InputEvent::Release
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "generatedAtIso")]
    generated_at_iso: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    seed: u32,
    #[serde(rename = "simulatedMs")]
    simulated_ms: u64,
    #[serde(rename = "inputChanges")]
    input_changes: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    anomalies: Vec<String>,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    snapshot: ArenaSnapshot,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let started_at_ms = now_ms();
    let seed = cli.seed.map(normalize_seed).unwrap_or_else(rand::random::<u32>);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed, started_at_ms));

    let (config, source) = match resolve_setup(&cli, seed) {
        Ok(setup) => setup,
        Err(error) => fail(&run_id, "setup_failed", json!({ "error": error.to_string() })),
    };
    let sinks = [MaskBuffer::default(), MaskBuffer::default()];
    let mut arena = match Arena::new(&config, &*source, sinks) {
        Ok(arena) => arena,
        Err(error) => fail(&run_id, "setup_failed", json!({ "error": error.to_string() })),
    };

    let total_ms = resolve_total_ms(cli.seconds);
    let script = (!config.player.auto_run).then(|| InputScript {
        hold_ms: cli.hold_ms.unwrap_or(DEFAULT_HOLD_MS),
        release_ms: cli.release_ms.unwrap_or(DEFAULT_RELEASE_MS),
    });
    emit_log(
        "info",
        "run_started",
        &run_id,
        None,
        None,
        json!({
            "seed": seed,
            "width": arena.grid().width(),
            "height": arena.grid().height(),
            "obstacleCells": arena.grid().count(Cell::Obstacle),
            "simulatedMs": total_ms,
            "playerAuto": config.player.auto_run,
            "enemyAuto": config.enemy.auto_run,
            "map": config.map.as_ref().map(|path| path.to_string_lossy().to_string()),
        }),
    );

    let mut input = InputController::new(Side::Player);
    let mut input_changes = 0usize;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut next_checkpoint_ms = CHECKPOINT_MS;

    while arena.elapsed_ms() < total_ms {
        if let Some(script) = script {
            let event = script.event_at(arena.elapsed_ms());
            if let Some(mode) = input.apply(&mut arena, event) {
                input_changes += 1;
                emit_log(
                    "info",
                    "input_changed",
                    &run_id,
                    Some(Side::Player),
                    Some(arena.tick_counter()),
                    json!({ "event": format!("{event:?}"), "mode": mode }),
                );
            }
        }

        arena.step(FRAME_MS);
        for message in collect_anomalies(&arena) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                arena.tick_counter(),
                message,
            );
        }

        if arena.elapsed_ms() >= next_checkpoint_ms {
            next_checkpoint_ms += CHECKPOINT_MS;
            let snapshot = arena.snapshot();
            for view in &snapshot.sides {
                emit_log(
                    "info",
                    "checkpoint",
                    &run_id,
                    Some(view.side),
                    Some(snapshot.tick),
                    json!({
                        "elapsedMs": snapshot.elapsed_ms,
                        "mode": view.mode,
                        "cells": view.cells,
                        "waveDepth": view.wave_depth,
                        "frontierSize": view.frontier_size,
                    }),
                );
            }
        }
    }

    for record in &anomaly_records {
        emit_log(
            "warn",
            "anomaly_detected",
            &run_id,
            None,
            Some(record.tick),
            json!({ "message": record.message }),
        );
    }

    if cli.ascii {
        print!("{}", arena.grid().render_ascii());
    }

    let summary = RunSummary {
        run_id: run_id.clone(),
        generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        started_at_ms,
        finished_at_ms: now_ms(),
        seed,
        simulated_ms: arena.elapsed_ms(),
        input_changes,
        anomaly_count: anomaly_records.len(),
        anomalies,
        anomaly_records,
        snapshot: arena.snapshot(),
    };
    match serde_json::to_string(&summary) {
        Ok(text) => println!("{text}"),
        Err(error) => fail(&run_id, "summary_serialize_failed", json!({ "error": error.to_string() })),
    }

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            fail(
                &run_id,
                "summary_write_failed",
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        Some(summary.snapshot.tick),
        json!({
            "simulatedMs": summary.simulated_ms,
            "sides": summary.snapshot.sides,
            "anomalyCount": summary.anomaly_count,
            "summaryOut": summary_out_written,
        }),
    );

    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn resolve_setup(cli: &Cli, seed: u32) -> Result<(ArenaConfig, Box<dyn ObstacleSource>), SetupError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => ArenaConfig::load(path)?,
        None => ArenaConfig::default(),
    };
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    if let Some(map) = cli.map.clone() {
        config.map = Some(map);
    }
    if cli.player_auto {
        config.player.auto_run = true;
    }
    apply_seed(&mut config.player, seed, cli.seed.is_some());
    apply_seed(&mut config.enemy, seed.wrapping_add(1), cli.seed.is_some());

    let source = load_source(&config)?;
    Ok((config, source))
}

fn apply_seed(config: &mut SimulationConfig, seed: u32, force: bool) {
    if force || config.rng_seed.is_none() {
        config.rng_seed = Some(seed);
    }
}

fn load_source(config: &ArenaConfig) -> Result<Box<dyn ObstacleSource>, MapError> {
    let Some(path) = config.map.as_deref() else {
        return Ok(Box::new(OpenField));
    };
    if is_image_path(path) {
        Ok(Box::new(ImageLevel::load(path, config.palette)?))
    } else {
        Ok(Box::new(TileMap::load(path)?))
    }
}

fn is_image_path(path: &Path) -> bool {
    image::ImageFormat::from_path(path).is_ok()
}

fn resolve_total_ms(seconds: Option<f32>) -> u64 {
    let seconds = seconds.unwrap_or(DEFAULT_SECONDS);
    let seconds = if seconds.is_finite() {
        seconds.clamp(0.0, MAX_SECONDS)
    } else {
        DEFAULT_SECONDS
    };
    (seconds * 1000.0).round() as u64
}

fn collect_anomalies(arena: &Arena<MaskBuffer>) -> Vec<String> {
    let mut anomalies = Vec::new();
    for side in Side::ALL {
        let sim = arena.simulation(side);
        // the opponent may hold a seed until its owner's next tick reclaims it
        if !matches!(arena.grid().cell_at(sim.seed()), Some(Cell::Owned(_))) {
            anomalies.push(format!("{side:?} seed not owned at ({},{})", sim.seed().x, sim.seed().y));
        }
        let owned = arena.grid().count(Cell::Owned(side));
        let shown = arena.sink(side).coverage();
        if owned != shown {
            anomalies.push(format!("{side:?} mask coverage mismatch: grid {owned}, mask {shown}"));
        }
    }
    anomalies
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn fail(run_id: &str, event: &str, details: Value) -> ! {
    emit_log("error", event, run_id, None, None, details);
    std::process::exit(2);
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    side: Option<Side>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        side,
        tick,
        details,
    };
    if let Ok(text) = serde_json::to_string(&log_line) {
        eprintln!("{text}");
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}
