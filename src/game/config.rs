use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Largest grid side accepted; keeps coordinates and cell counts well inside `i32`
pub const MAX_GRID_SIZE: usize = 1024;

/// Where the grid's coordinate origin sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridOrigin {
    /// Cells run from 0 to size - 1 on both axes
    Corner,
    /// Cells run from -(size / 2) upward, so the center cell is (0, 0)
    Centered,
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Side length of the square grid, in cells
    pub grid_size: usize,
    /// Coordinate origin of the grid
    pub origin: GridOrigin,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    // Pacing
    /// Tick interval at the start of every game
    pub base_tick_ms: u64,
    /// Amount the tick interval shrinks per food eaten
    pub tick_step_ms: u64,
    /// The tick interval never drops below this
    pub min_tick_ms: u64,

    /// Points awarded per food eaten
    pub food_points: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::arena()
    }
}

impl GameConfig {
    /// Create a new configuration with a custom grid size
    pub fn new(size: usize) -> Self {
        Self {
            grid_size: size,
            ..Default::default()
        }
    }

    /// The flat canvas layout: 20x20 from the top-left corner
    pub fn classic() -> Self {
        Self {
            grid_size: 20,
            origin: GridOrigin::Corner,
            initial_snake_length: 3,
            base_tick_ms: 200,
            tick_step_ms: 5,
            min_tick_ms: 100,
            food_points: 10,
        }
    }

    /// The arena layout: 15x15 centered on the origin
    pub fn arena() -> Self {
        Self {
            grid_size: 15,
            origin: GridOrigin::Centered,
            initial_snake_length: 3,
            base_tick_ms: 300,
            tick_step_ms: 5,
            min_tick_ms: 150,
            food_points: 10,
        }
    }

    /// Load a configuration from a JSON file; missing fields take arena defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can host a game
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.initial_snake_length >= 3,
            "initial_snake_length must be at least 3, got {}",
            self.initial_snake_length
        );
        // The starting segment plus a cell of headroom on each side must fit.
        ensure!(
            self.grid_size >= self.initial_snake_length + 2,
            "grid_size {} is too small for a snake of length {}",
            self.grid_size,
            self.initial_snake_length
        );
        ensure!(
            self.grid_size <= MAX_GRID_SIZE,
            "grid_size {} exceeds the maximum of {}",
            self.grid_size,
            MAX_GRID_SIZE
        );
        if self.min_tick_ms == 0 {
            bail!("min_tick_ms must be greater than zero");
        }
        ensure!(
            self.min_tick_ms <= self.base_tick_ms,
            "min_tick_ms ({}) exceeds base_tick_ms ({})",
            self.min_tick_ms,
            self.base_tick_ms
        );
        Ok(())
    }

    pub fn base_tick(&self) -> Duration {
        Duration::from_millis(self.base_tick_ms)
    }

    pub fn tick_step(&self) -> Duration {
        Duration::from_millis(self.tick_step_ms)
    }

    pub fn min_tick(&self) -> Duration {
        Duration::from_millis(self.min_tick_ms)
    }
}
