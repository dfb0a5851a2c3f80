//! High-score persistence
//!
//! The simulation only talks to a [`HighScoreStore`]; what backs it is up to
//! the host. The shipped backend is [`SessionStore`], which lives as long as
//! the process and no longer.

pub mod session;

pub use session::{SessionStorage, SessionStore};

use anyhow::Result;

/// Key the high score is stored under
pub const HIGH_SCORE_KEY: &str = "snake3DHighScore";

/// Somewhere to keep the best score between games
pub trait HighScoreStore {
    /// Read the stored high score. Absence is `Ok(0)`, not an error.
    fn load(&self) -> Result<u32>;

    /// Write a new high score
    fn save(&mut self, value: u32) -> Result<()>;
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Box<T> {
    fn load(&self) -> Result<u32> {
        (**self).load()
    }

    fn save(&mut self, value: u32) -> Result<()> {
        (**self).save(value)
    }
}
