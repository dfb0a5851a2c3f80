//! Fixed-delta driver between a frame source and the simulation
//!
//! The host calls [`TickDriver::frame`] with the time elapsed since its last
//! frame. The driver forwards that to [`GridSimulation::advance`] and hands
//! any resulting outcome to the render sink. Only one driver loop may be
//! active at a time; leaving play stops it and resuming starts it again.

use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::game::{GameState, GridSimulation, TickOutcome};
use crate::persistence::HighScoreStore;
use crate::render::RenderSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// A loop is already running; starting a second one would double ticks
    AlreadyRunning,
    /// Frames were fed to a driver that was never started or was stopped
    NotRunning,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::AlreadyRunning => write!(f, "tick driver is already running"),
            DriverError::NotRunning => write!(f, "tick driver is not running"),
        }
    }
}

impl std::error::Error for DriverError {}

#[derive(Debug, Default)]
pub struct TickDriver {
    running: bool,
    frames: u64,
    ticks: u64,
}

impl TickDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) -> Result<(), DriverError> {
        if self.running {
            return Err(DriverError::AlreadyRunning);
        }
        debug!("tick driver started");
        self.running = true;
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!(frames = self.frames, ticks = self.ticks, "tick driver stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run the loop exactly while the game is playing
    pub fn sync(&mut self, state: GameState) {
        match (state, self.running) {
            (GameState::Playing, false) => self.running = true,
            (GameState::Playing, true) => {}
            (_, true) => self.stop(),
            (_, false) => {}
        }
    }

    /// Feed one frame's elapsed time through the simulation.
    ///
    /// A terminal outcome stops the driver.
    pub fn frame<S, R>(
        &mut self,
        sim: &mut GridSimulation<S>,
        sink: &mut R,
        dt: Duration,
    ) -> Result<Option<TickOutcome>, DriverError>
    where
        S: HighScoreStore,
        R: RenderSink + ?Sized,
    {
        if !self.running {
            return Err(DriverError::NotRunning);
        }
        self.frames += 1;

        let outcome = sim.advance(dt);
        if let Some(outcome) = &outcome {
            self.ticks += 1;
            sink.apply(outcome);
        }
        self.sync(sim.state());

        Ok(outcome)
    }

    /// Forward an outcome produced outside the frame loop (start, pause,
    /// restart) and bring the loop in line with the new state.
    pub fn dispatch<S, R>(
        &mut self,
        sim: &GridSimulation<S>,
        sink: &mut R,
        outcome: Option<TickOutcome>,
    ) where
        S: HighScoreStore,
        R: RenderSink + ?Sized,
    {
        if let Some(outcome) = outcome {
            sink.apply(&outcome);
        }
        self.sync(sim.state());
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
