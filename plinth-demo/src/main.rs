//! Plinth demo.
//!
//! Headless driver for the layout engine: declares the sample sidebar
//! layout, runs a few frames and prints the final render commands as JSON.
//!
//! Usage: `plinth-demo [config.json]`. Log verbosity follows `RUST_LOG`
//! (e.g. `RUST_LOG=plinth=trace` with `"debug_layout": true`).

mod sidebar;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use plinth::{Diagnostic, Engine, EngineConfig, Point, RenderCommand, Size};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Frames to run; later frames reuse the measurement cache.
const FRAMES: u64 = 3;

/// A render command with its text resolved.
#[derive(Serialize)]
struct CommandOut<'a> {
    #[serde(flatten)]
    command: &'a RenderCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

fn load_config(path: Option<PathBuf>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig {
            viewport: Size::new(1024.0, 768.0),
            ..Default::default()
        });
    };
    let raw = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = load_config(std::env::args_os().nth(1).map(PathBuf::from))?;
    tracing::info!(?config, "starting plinth demo");

    let mut engine = Engine::with_config(config, |d: &Diagnostic| {
        tracing::error!(kind = %d.kind, "{}", d.message);
    })
    .context("creating layout engine")?;

    for _ in 0..FRAMES {
        engine.begin_frame();
        sidebar::declare(&mut engine, "Clay - UI Library");
        engine.end_frame();
        let stats = engine.frame_stats();
        tracing::info!(
            frame = stats.frame,
            commands = stats.command_count,
            arena_used = stats.arena_used,
            cache_hits = stats.measure_hits,
            total = ?stats.total_time(),
            "frame"
        );
    }

    if let Some(main) = engine.element_box("MainContent") {
        let center = Point::new(main.x + main.width / 2.0, main.y + main.height / 2.0);
        let hovered = engine.element_at(center);
        tracing::info!(hovered = hovered.map(|id| id.raw()), "hit test at main content center");
    }

    let commands = engine.last_commands();
    let out: Vec<CommandOut<'_>> = commands
        .iter()
        .map(|command| CommandOut { command, text: commands.text_of(command) })
        .collect();
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
