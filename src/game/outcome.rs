use super::state::{Cell, CollisionType, GameState};

/// What changed as the result of a simulation call.
///
/// Outcomes are deltas: a render sink that applies every outcome in order
/// holds the same snake and food as the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new game began; the full snake (head first) and the first food
    Reset { snake: Vec<Cell>, food: Cell },
    /// The snake moved one cell without eating
    Moved { new_head: Cell, dropped_tail: Cell },
    /// The snake ate and grew by one segment
    Ate {
        new_head: Cell,
        new_food: Cell,
        new_score: u32,
    },
    /// The snake hit a wall or itself; the game is over
    Collided {
        final_score: u32,
        kind: CollisionType,
        new_high_score: bool,
    },
    /// The game moved to another state without touching the board
    StateChanged { state: GameState },
}

impl TickOutcome {
    /// Returns true if this outcome ends the game
    pub fn is_terminal(&self) -> bool {
        matches!(self, TickOutcome::Collided { .. })
    }
}
