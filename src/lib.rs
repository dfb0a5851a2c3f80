//! Grid Snake - a discrete-step Snake game
//!
//! This library provides:
//! - Core simulation: movement, collisions, food and pacing (game module)
//! - High-score persistence behind a store trait (persistence module)
//! - A fixed-delta driver that feeds time in and outcomes out (driver module)
//! - TUI rendering and keyboard input (render, input modules)
//! - The interactive terminal mode (modes module)

pub mod driver;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
pub mod render;
