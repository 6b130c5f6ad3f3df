//! Space Adventure headless runner
//!
//! Plays a full run on autopilot against a stepped clock and prints the
//! result as JSON. Useful for balance checks and soak tests.
//!
//! Usage: space-adventure [--seed N] [--tuning FILE] [--max-frames N]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use space_adventure::platform::{AudioSink, Autopilot, RenderSink, SteppedClock, drive_frame};
use space_adventure::sim::{AudioCue, RunController, seeded};
use space_adventure::{Hud, RenderFrame, Tuning};

/// Default cap: an hour of play at 60 fps
const DEFAULT_MAX_FRAMES: u64 = 60 * 60 * 60;

#[derive(Parser, Debug)]
#[command(name = "space-adventure")]
#[command(about = "Play a full run on autopilot and print the result as JSON")]
struct Cli {
    /// Seed for the run's random source
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Difficulty tuning JSON; missing fields keep their defaults
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Abort the run after this many frames
    #[arg(long, default_value_t = DEFAULT_MAX_FRAMES)]
    max_frames: u64,
}

fn load_tuning(path: Option<&Path>) -> anyhow::Result<Tuning> {
    let Some(path) = path else {
        return Ok(Tuning::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading tuning file {}", path.display()))?;
    Tuning::from_json(&json).with_context(|| format!("loading tuning file {}", path.display()))
}

/// Logs HUD changes instead of drawing
#[derive(Default)]
struct HudLogger {
    last: Option<Hud>,
}

impl RenderSink for HudLogger {
    fn present(&mut self, frame: &RenderFrame) {
        let hud = &frame.hud;
        let changed = self.last.as_ref().is_none_or(|last| {
            last.level != hud.level
                || last.lives != hud.lives
                || last.completed_waves != hud.completed_waves
        });
        if changed {
            log::info!(
                "Level {}/{} | lives {} | score {} | waves {}/{}",
                hud.level,
                hud.num_levels,
                hud.lives,
                hud.score,
                hud.completed_waves,
                hud.total_waves
            );
        }
        log::trace!("{} sprites on screen", frame.sprites.len());
        self.last = Some(hud.clone());
    }
}

/// Tallies cues instead of playing them
#[derive(Default)]
struct CueCounter {
    counts: BTreeMap<&'static str, u64>,
}

impl AudioSink for CueCounter {
    fn play(&mut self, cue: AudioCue) {
        *self.counts.entry(cue.as_str()).or_default() += 1;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let tuning = load_tuning(cli.tuning.as_deref())?;
    log::info!("Space Adventure (headless) starting, seed {}", cli.seed);

    let mut rng = seeded(cli.seed);
    let clock = SteppedClock::per_frame();
    let mut run = RunController::new(tuning, clock.peek(), &mut rng);
    let mut pilot = Autopilot::quitting_after(cli.max_frames);
    let mut render = HudLogger::default();
    let mut audio = CueCounter::default();

    let mut frames = 0u64;
    while !run.status().is_over() {
        drive_frame(&mut run, &clock, &mut pilot, &mut rng, &mut render, &mut audio);
        frames += 1;
    }

    let summary = run.summary();
    log::info!("Run finished after {frames} frames: {:?}", summary.status);
    let report = serde_json::json!({
        "seed": cli.seed,
        "frames": frames,
        "sim_ms": clock.peek(),
        "summary": summary,
        "cues": audio.counts,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("serializing run report")?
    );
    Ok(())
}
