//! Platform abstraction layer
//!
//! The seams between the simulation core and the outside world:
//! - Time (monotonic milliseconds since run start)
//! - Input intents
//! - Render and audio sinks (one-way, after the frame settles)
//!
//! The core never calls into these itself; [`drive_frame`] wires one frame.

pub mod autopilot;

use std::cell::Cell;

use crate::sim::{AudioCue, FrameReport, RandomSource, RunController, TickInput};
use crate::snapshot::RenderFrame;

pub use autopilot::Autopilot;

/// Monotonic simulation clock
pub trait Clock {
    /// Milliseconds since run start. Sampled once per frame.
    fn now_ms(&self) -> u64;
}

/// Source of per-frame input intents
pub trait InputProvider {
    /// Intents for the coming frame, given what was last presented
    fn poll(&mut self, frame: &RenderFrame) -> TickInput;
}

/// Receives the settled frame
pub trait RenderSink {
    fn present(&mut self, frame: &RenderFrame);
}

/// Receives fire-and-forget sound cues
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Clock for headless runs: every sample advances by one step.
///
/// Time is kept as a step count and converted on each sample, so a step that
/// is not a whole number of milliseconds (one 60 Hz frame) does not drift.
#[derive(Debug)]
pub struct SteppedClock {
    steps: Cell<u64>,
    /// Step length is `step_num / step_den` milliseconds
    step_num: u64,
    step_den: u64,
}

impl SteppedClock {
    pub fn new(step_ms: u64) -> Self {
        Self {
            steps: Cell::new(0),
            step_num: step_ms,
            step_den: 1,
        }
    }

    /// A clock stepping one nominal frame at a time
    pub fn per_frame() -> Self {
        Self {
            steps: Cell::new(0),
            step_num: 1000,
            step_den: crate::consts::FRAME_RATE as u64,
        }
    }

    /// Current time without advancing
    pub fn peek(&self) -> u64 {
        self.steps.get() * self.step_num / self.step_den
    }
}

impl Clock for SteppedClock {
    fn now_ms(&self) -> u64 {
        self.steps.set(self.steps.get() + 1);
        self.peek()
    }
}

/// Sinks that discard everything
#[derive(Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn present(&mut self, _frame: &RenderFrame) {}
}

impl AudioSink for NullSink {
    fn play(&mut self, _cue: AudioCue) {}
}

/// Run one frame end to end.
///
/// Polls input against the previously settled frame, samples the clock once,
/// ticks the run, then hands cues and the new frame to the sinks.
pub fn drive_frame(
    run: &mut RunController,
    clock: &impl Clock,
    input: &mut impl InputProvider,
    rng: &mut impl RandomSource,
    render: &mut impl RenderSink,
    audio: &mut impl AudioSink,
) -> FrameReport {
    let intents = input.poll(&run.render_frame());
    let now = clock.now_ms();
    let report = run.tick(&intents, now, rng);

    for event in &report.events {
        log::debug!("t={now}ms {event:?}");
    }
    for &cue in &report.cues {
        audio.play(cue);
    }
    render.present(&run.render_frame());
    report
}
