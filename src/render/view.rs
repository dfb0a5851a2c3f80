use std::collections::VecDeque;

use super::RenderSink;
use crate::game::{Cell, CollisionType, GameState, TickOutcome};

/// What the screen shows, rebuilt purely from outcome deltas.
///
/// Segments are added at the head and removed at the tail as outcomes
/// arrive, the same way a scene graph would add and remove meshes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    segments: VecDeque<Cell>,
    food: Option<Cell>,
    score: u32,
    state: GameState,
    last_crash: Option<Crash>,
}

/// How the last game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crash {
    pub final_score: u32,
    pub kind: CollisionType,
    pub new_high_score: bool,
}

impl BoardView {
    pub fn new() -> Self {
        Self {
            segments: VecDeque::new(),
            food: None,
            score: 0,
            state: GameState::Title,
            last_crash: None,
        }
    }

    pub fn head(&self) -> Option<Cell> {
        self.segments.front().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    pub fn segments(&self) -> impl Iterator<Item = &Cell> {
        self.segments.iter()
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn last_crash(&self) -> Option<Crash> {
        self.last_crash
    }
}

impl Default for BoardView {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for BoardView {
    fn apply(&mut self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::Reset { snake, food } => {
                self.segments = snake.iter().copied().collect();
                self.food = Some(*food);
                self.score = 0;
                self.state = GameState::Playing;
                self.last_crash = None;
            }
            TickOutcome::Moved {
                new_head,
                dropped_tail,
            } => {
                self.segments.push_front(*new_head);
                if self.segments.back() == Some(dropped_tail) {
                    self.segments.pop_back();
                }
            }
            TickOutcome::Ate {
                new_head,
                new_food,
                new_score,
            } => {
                self.segments.push_front(*new_head);
                self.food = Some(*new_food);
                self.score = *new_score;
            }
            TickOutcome::Collided {
                final_score,
                kind,
                new_high_score,
            } => {
                self.state = GameState::GameOver;
                self.last_crash = Some(Crash {
                    final_score: *final_score,
                    kind: *kind,
                    new_high_score: *new_high_score,
                });
            }
            TickOutcome::StateChanged { state } => {
                self.state = *state;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig, GridSimulation};
    use crate::persistence::SessionStore;

    #[test]
    fn test_view_mirrors_simulation() {
        let mut sim = GridSimulation::with_seed(GameConfig::default(), SessionStore::default(), 9);
        let mut view = BoardView::new();

        view.apply(&sim.start().unwrap());
        let turns = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];
        for step in 0..300usize {
            if step % 3 == 0 {
                sim.queue_direction(turns[step % turns.len()]);
            }
            let outcome = sim.tick().unwrap();
            view.apply(&outcome);
            if outcome.is_terminal() {
                view.apply(&sim.restart().unwrap());
                continue;
            }

            let segments: Vec<Cell> = view.segments().copied().collect();
            assert_eq!(segments, sim.snake().body);
            assert_eq!(view.food(), Some(sim.food()));
            assert_eq!(view.score(), sim.score());
        }
    }

    #[test]
    fn test_collision_recorded() {
        let mut view = BoardView::new();
        view.apply(&TickOutcome::Reset {
            snake: vec![Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)],
            food: Cell::new(3, 3),
        });
        view.apply(&TickOutcome::Collided {
            final_score: 40,
            kind: CollisionType::Wall,
            new_high_score: true,
        });

        assert_eq!(view.state(), GameState::GameOver);
        assert_eq!(
            view.last_crash(),
            Some(Crash {
                final_score: 40,
                kind: CollisionType::Wall,
                new_high_score: true,
            })
        );
        // The board stays up for the crash screen.
        assert_eq!(view.head(), Some(Cell::new(0, 0)));
    }

    #[test]
    fn test_state_changes_tracked() {
        let mut view = BoardView::new();
        view.apply(&TickOutcome::StateChanged {
            state: GameState::Paused,
        });
        assert_eq!(view.state(), GameState::Paused);
    }
}
