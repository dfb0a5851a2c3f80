//! Presentation side of the game
//!
//! The simulation never draws anything. It emits [`TickOutcome`] values and a
//! [`RenderSink`] turns them into something visible.

pub mod renderer;
pub mod view;

pub use renderer::Renderer;
pub use view::BoardView;

use crate::game::TickOutcome;

/// Consumer of simulation outcomes
pub trait RenderSink {
    /// Reflect one outcome. Outcomes arrive in the order they happened.
    fn apply(&mut self, outcome: &TickOutcome);
}

/// Records every outcome it is given
impl RenderSink for Vec<TickOutcome> {
    fn apply(&mut self, outcome: &TickOutcome) {
        self.push(outcome.clone());
    }
}

impl<T: RenderSink + ?Sized> RenderSink for &mut T {
    fn apply(&mut self, outcome: &TickOutcome) {
        (**self).apply(outcome)
    }
}
