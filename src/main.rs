//! Survivor Arena headless runner
//!
//! Plays a seeded session on autopilot at the fixed 60 Hz step and reports
//! how it went. Useful for balance passes and reproducing bug reports.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use survivor_arena::consts::SIM_DT;
use survivor_arena::sim::{GameState, TickInput, tick};
use survivor_arena::{CharacterKind, RunSummary, Settings, Tuning};

#[derive(Debug, Parser)]
#[command(name = "survivor-arena", about = "Run a headless Survivor Arena session")]
struct Args {
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Character to play: knight, ranger, or mage
    #[arg(long, default_value = "knight")]
    character: String,

    /// Gameplay seconds to simulate before giving up
    #[arg(long, default_value_t = 600.0)]
    seconds: f32,

    /// JSON file with balance overrides
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Print the final frame snapshot as JSON instead of the summary
    #[arg(long)]
    json: bool,
}

fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Tuning::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let Some(character) = CharacterKind::from_str(&args.character) else {
        bail!("unknown character '{}'", args.character);
    };
    let tuning = load_tuning(args.tuning.as_ref())?;
    let mut state = GameState::with_config(args.seed, character, tuning, Settings::default());

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let max_ticks = (args.seconds.max(0.0) / SIM_DT).ceil() as u64;
    let mut last_stage = state.stage_index;

    for _ in 0..max_ticks {
        if state.phase.is_terminal() {
            break;
        }
        if let Some(option) = state.offered.first() {
            let pick = option.id;
            log::debug!("Autopilot takes {}", option.title);
            state.choose_upgrade(pick);
        }
        if state.stage_clear_ready() {
            state.request_stage_advance();
        }
        tick(&mut state, &input, SIM_DT);
        // Nobody is listening
        state.drain_audio();

        if state.stage_index != last_stage {
            last_stage = state.stage_index;
            log::info!(
                "t={:.1}s level {} kills {} hp {:.0}/{:.0}",
                state.elapsed,
                state.player.level,
                state.kills,
                state.player.hp,
                state.player.max_hp
            );
        }
    }

    if args.json {
        let snapshot = serde_json::to_string_pretty(&state.snapshot()).context("serializing snapshot")?;
        println!("{snapshot}");
        return Ok(());
    }

    let summary = RunSummary::from_state(&state);
    println!(
        "{} as {}: stage {}, level {}, {} kills, best combo {}, {:.1}s",
        summary.outcome.as_str(),
        summary.character.as_str(),
        summary.stage,
        summary.level,
        summary.kills,
        summary.best_combo,
        summary.elapsed
    );
    Ok(())
}
