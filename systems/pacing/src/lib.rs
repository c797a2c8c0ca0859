#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-cadence pacing system deciding when the simulation should step.
//!
//! The engine itself has no notion of running; adapters feed frame durations
//! into [`Pacing::advance`] and call the generation step as many times as it
//! reports. Simulation ticks therefore run on their own interval, decoupled
//! from how often frames are drawn.

use std::time::Duration;

use log::debug;

/// Interval between simulation ticks when none is configured.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound on ticks released for a single frame when none is configured.
pub const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 4;

/// Whether the driving loop should advance the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunState {
    /// The grid is displayed but never stepped.
    #[default]
    Paused,
    /// The grid steps once per elapsed tick interval.
    Running,
}

impl RunState {
    /// Returns the opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Paused => Self::Running,
            Self::Running => Self::Paused,
        }
    }

    /// Reports whether the simulation is running.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Configuration parameters required to construct the pacing system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    tick_interval: Duration,
    max_ticks_per_frame: u32,
}

impl Config {
    /// Creates a new configuration using the provided tick cadence.
    #[must_use]
    pub const fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
        }
    }

    /// Caps how many ticks a single long frame may release.
    #[must_use]
    pub const fn with_max_ticks_per_frame(mut self, max_ticks_per_frame: u32) -> Self {
        self.max_ticks_per_frame = max_ticks_per_frame;
        self
    }

    /// Interval between simulation ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

/// Tracks the run state and converts elapsed time into due ticks.
#[derive(Debug)]
pub struct Pacing {
    tick_interval: Duration,
    max_ticks_per_frame: u32,
    accumulator: Duration,
    run_state: RunState,
}

impl Pacing {
    /// Creates a new paused pacing system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tick_interval: config.tick_interval,
            max_ticks_per_frame: config.max_ticks_per_frame,
            accumulator: Duration::ZERO,
            run_state: RunState::Paused,
        }
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Switches between paused and running, returning the new state.
    pub fn toggle(&mut self) -> RunState {
        self.set_run_state(self.run_state.toggled());
        self.run_state
    }

    /// Forces the provided run state.
    pub fn set_run_state(&mut self, run_state: RunState) {
        if self.run_state != run_state {
            debug!("simulation {run_state:?}");
        }
        self.run_state = run_state;
        if !run_state.is_running() {
            self.accumulator = Duration::ZERO;
        }
    }

    /// Accumulates `dt` and returns how many simulation steps are due.
    ///
    /// Paused systems discard elapsed time. Backlog beyond the per-frame cap is
    /// dropped so a stalled frame never triggers a long burst of steps.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if !self.run_state.is_running() || self.tick_interval.is_zero() {
            self.accumulator = Duration::ZERO;
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(dt);

        let mut ticks = 0;
        while self.accumulator >= self.tick_interval && ticks < self.max_ticks_per_frame {
            self.accumulator -= self.tick_interval;
            ticks += 1;
        }

        if self.accumulator >= self.tick_interval {
            debug!("dropping {:?} of simulation backlog", self.accumulator);
            self.accumulator = Duration::ZERO;
        }

        ticks
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
