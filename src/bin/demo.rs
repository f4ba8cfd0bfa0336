//! StrokeCraft demo CLI
//!
//! Plays a scripted sequence of pointer/command events from a JSON file
//! through the orchestrator and prints the resulting `RenderHint` stream.
//! The stand-in for a real host (spec.md §6), which would otherwise wire
//! these same inputs up to a canvas's native pointer events.

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use strokecraft::{Config, Orchestrator, Point};

#[derive(Parser)]
#[command(name = "strokecraft-demo")]
#[command(about = "Replays a scripted pointer/command event sequence through the core", long_about = None)]
struct Args {
    /// Path to a JSON array of script events
    #[arg(short = 's', long)]
    script: String,

    /// Path to a JSON Config override (defaults used if omitted)
    #[arg(short = 'c', long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ScriptEvent {
    PointerDown { id: i64, x: f64, y: f64, #[serde(default)] t: u64 },
    PointerMove { id: i64, x: f64, y: f64 },
    PointerUp { id: i64 },
    Timeout { t: u64 },
    Undo,
    Clear,
    FitLast,
}

fn load_config(path: &str) -> Result<Config> {
    let text = fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))
}

fn load_script(path: &str) -> Result<Vec<ScriptEvent>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading script {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing script {path}"))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let events = load_script(&args.script)?;
    let config = args.config.as_deref().map(load_config).transpose()?.unwrap_or_default();

    let mut orchestrator = Orchestrator::new(config);

    for event in events {
        let hints = match event {
            ScriptEvent::PointerDown { id, x, y, t } => {
                orchestrator.pointer_down(id, Point::new(x, y), t)
            }
            ScriptEvent::PointerMove { id, x, y } => orchestrator.pointer_move(id, Point::new(x, y)),
            ScriptEvent::PointerUp { id } => orchestrator.pointer_up(id),
            ScriptEvent::Timeout { t } => orchestrator.tick_timeout(t),
            ScriptEvent::Undo => orchestrator.undo(),
            ScriptEvent::Clear => orchestrator.clear(),
            ScriptEvent::FitLast => {
                if let Err(e) = orchestrator.fit_last() {
                    eprintln!("fitLast failed: {e}");
                }
                Vec::new()
            }
        };
        for hint in hints {
            let json = serde_json::to_string(&hint).context("serializing render hint")?;
            println!("{json}");
        }
    }

    Ok(())
}
