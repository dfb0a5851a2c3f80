//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! Time comes in as elapsed durations and results go out as [`TickOutcome`] values,
//! so a manual stepper drives it just as well as a real frame loop.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod outcome;
pub mod state;

// Re-export commonly used types
pub use action::{Axis, Direction};
pub use clock::TickClock;
pub use config::{GameConfig, GridOrigin};
pub use engine::GridSimulation;
pub use outcome::TickOutcome;
pub use state::{Cell, CollisionType, GameState, Grid, Snake};
