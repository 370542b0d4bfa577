//! Fixed-timestep driver for an [`ArenaGame`].
//!
//! The scheduler owns no game state. An external driver (render loop, timer,
//! or test) hands it elapsed wall time; it runs zero or more whole ticks,
//! polling the input latch once at the start of each. Ticks never overlap and
//! a stop request only takes effect between ticks.

use crate::game_trait::{ArenaGame, GameEvent};
use crate::input::InputLatch;

/// Upper bound on catch-up ticks per frame so a long stall cannot spiral.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 5;

#[derive(Debug, Clone)]
pub struct TickScheduler {
    step: f32,
    accumulator: f32,
    max_ticks_per_frame: u32,
    tick: u64,
    stopped: bool,
}

impl TickScheduler {
    /// Scheduler running at `tick_rate` Hz. Non-positive rates fall back to 60 Hz.
    pub fn new(tick_rate: f32) -> Self {
        let rate = if tick_rate.is_finite() && tick_rate > 0.0 {
            tick_rate
        } else {
            60.0
        };
        Self {
            step: 1.0 / rate,
            accumulator: 0.0,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            tick: 0,
            stopped: false,
        }
    }

    /// Scheduler matched to the game's own tick rate.
    pub fn for_game<G: ArenaGame + ?Sized>(game: &G) -> Self {
        Self::new(game.tick_rate())
    }

    pub fn with_max_ticks_per_frame(mut self, max: u32) -> Self {
        self.max_ticks_per_frame = max.max(1);
        self
    }

    /// Fixed tick length in seconds.
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Request the loop to stop. Never interrupts a tick in progress.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Clear the stop flag and any banked time, e.g. after a game reset.
    pub fn restart(&mut self) {
        self.stopped = false;
        self.accumulator = 0.0;
    }

    /// Fraction of a tick banked but not yet simulated, in `[0, 1)`.
    /// Renderers may use it to interpolate between snapshots.
    pub fn interpolation_alpha(&self) -> f32 {
        (self.accumulator / self.step).clamp(0.0, 1.0)
    }

    /// Bank `frame_dt` seconds of wall time and run every whole tick it covers.
    pub fn advance<G, L>(&mut self, game: &mut G, latch: &mut L, frame_dt: f32) -> Vec<GameEvent>
    where
        G: ArenaGame + ?Sized,
        L: InputLatch + ?Sized,
    {
        if self.stopped || !frame_dt.is_finite() || frame_dt <= 0.0 {
            return Vec::new();
        }
        self.accumulator += frame_dt;

        let mut events = Vec::new();
        let mut ran = 0;
        while self.accumulator >= self.step && ran < self.max_ticks_per_frame {
            self.accumulator -= self.step;
            events.extend(self.run_tick(game, latch));
            ran += 1;
            if self.stopped {
                break;
            }
        }

        if self.accumulator >= self.step {
            tracing::debug!(
                dropped_secs = self.accumulator,
                max_ticks = self.max_ticks_per_frame,
                "Tick budget exhausted, dropping banked time"
            );
            self.accumulator %= self.step;
        }
        events
    }

    /// Run exactly one tick regardless of banked time.
    pub fn step_once<G, L>(&mut self, game: &mut G, latch: &mut L) -> Vec<GameEvent>
    where
        G: ArenaGame + ?Sized,
        L: InputLatch + ?Sized,
    {
        if self.stopped {
            return Vec::new();
        }
        self.run_tick(game, latch)
    }

    fn run_tick<G, L>(&mut self, game: &mut G, latch: &mut L) -> Vec<GameEvent>
    where
        G: ArenaGame + ?Sized,
        L: InputLatch + ?Sized,
    {
        let inputs = latch.poll();
        self.tick += 1;
        game.update(self.step, &inputs)
    }
}
