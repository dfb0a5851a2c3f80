use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    action::Direction,
    clock::TickClock,
    config::GameConfig,
    outcome::TickOutcome,
    state::{Cell, CollisionType, GameState, Grid, Snake},
};
use crate::persistence::{HighScoreStore, SessionStore};

/// Rejection sampling gives up after this many draws per grid cell and
/// falls back to scanning for free cells.
const FOOD_DRAWS_PER_CELL: usize = 4;

/// The discrete grid simulation: snake, steering, food, score and pacing.
///
/// Nothing here knows about time sources or screens. A driver feeds elapsed
/// time through [`advance`](Self::advance) (or calls [`tick`](Self::tick)
/// directly) and hands the returned [`TickOutcome`] to whatever draws the
/// board.
pub struct GridSimulation<S: HighScoreStore = SessionStore> {
    config: GameConfig,
    grid: Grid,
    snake: Snake,
    direction: Direction,
    pending_direction: Direction,
    food: Cell,
    score: u32,
    high_score: u32,
    state: GameState,
    tick_interval: Duration,
    clock: TickClock,
    steps: u32,
    rng: StdRng,
    store: S,
}

impl<S: HighScoreStore> GridSimulation<S> {
    /// Create a simulation sitting on the title screen
    pub fn new(config: GameConfig, store: S) -> Self {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Create a simulation with a fixed seed, for reproducible games
    pub fn with_seed(config: GameConfig, store: S, seed: u64) -> Self {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, store: S, rng: StdRng) -> Self {
        let grid = Grid::new(config.grid_size, config.origin);
        let high_score = load_high_score(&store);
        let snake = initial_snake(&grid, &config);
        let tick_interval = config.base_tick();

        let mut sim = Self {
            config,
            grid,
            food: snake.head(),
            snake,
            direction: Direction::Right,
            pending_direction: Direction::Right,
            score: 0,
            high_score,
            state: GameState::Title,
            tick_interval,
            clock: TickClock::new(),
            steps: 0,
            rng,
            store,
        };
        sim.place_food();
        sim
    }

    /// Reset the board and start playing
    pub fn reset(&mut self) -> TickOutcome {
        self.snake = initial_snake(&self.grid, &self.config);
        self.direction = Direction::Right;
        self.pending_direction = Direction::Right;
        self.score = 0;
        self.steps = 0;
        self.tick_interval = self.config.base_tick();
        self.clock.rebase();
        self.state = GameState::Playing;
        self.place_food();

        info!(food = ?self.food, "game reset");

        TickOutcome::Reset {
            snake: self.snake.body.clone(),
            food: self.food,
        }
    }

    /// Leave the title screen
    pub fn start(&mut self) -> Option<TickOutcome> {
        match self.state {
            GameState::Title => Some(self.reset()),
            _ => None,
        }
    }

    /// Throw away the current game and begin a new one
    pub fn restart(&mut self) -> Option<TickOutcome> {
        match self.state {
            GameState::Playing | GameState::Paused | GameState::GameOver => Some(self.reset()),
            GameState::Title => None,
        }
    }

    /// Go back to the title screen from a paused or finished game
    pub fn to_title(&mut self) -> Option<TickOutcome> {
        match self.state {
            GameState::Paused | GameState::GameOver => {
                self.tick_interval = self.config.base_tick();
                self.clock.rebase();
                Some(self.set_state(GameState::Title))
            }
            _ => None,
        }
    }

    /// Pause a running game or resume a paused one
    pub fn toggle_pause(&mut self) -> Option<TickOutcome> {
        match self.state {
            GameState::Playing => Some(self.set_state(GameState::Paused)),
            GameState::Paused => {
                self.clock.rebase();
                Some(self.set_state(GameState::Playing))
            }
            _ => None,
        }
    }

    /// Buffer a steering request for the next tick.
    ///
    /// Returns false, leaving the pending direction alone, when `direction`
    /// runs along the committed direction's axis or the game is not running.
    pub fn queue_direction(&mut self, direction: Direction) -> bool {
        if self.state != GameState::Playing || !self.direction.can_turn_to(direction) {
            return false;
        }
        self.pending_direction = direction;
        true
    }

    /// Feed elapsed time in; runs a tick once the interval has been reached.
    ///
    /// Time only counts while playing, and at most one tick fires per call.
    pub fn advance(&mut self, dt: Duration) -> Option<TickOutcome> {
        if self.state != GameState::Playing {
            return None;
        }
        if self.clock.accumulate(dt, self.tick_interval) {
            self.tick()
        } else {
            None
        }
    }

    /// Execute one step of the game. A no-op unless playing.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.state != GameState::Playing {
            return None;
        }

        self.direction = self.pending_direction;
        let new_head = self.snake.head() + self.direction;
        self.steps += 1;

        if let Some(kind) = self.check_collision(new_head) {
            return Some(self.game_over(kind));
        }

        let ate_food = new_head == self.food;
        let dropped_tail = self.snake.advance(new_head, ate_food);

        let outcome = match dropped_tail {
            Some(dropped_tail) => TickOutcome::Moved {
                new_head,
                dropped_tail,
            },
            None => {
                self.score += self.config.food_points;
                self.tick_interval = self
                    .tick_interval
                    .saturating_sub(self.config.tick_step())
                    .max(self.config.min_tick());
                let new_food = self.place_food();
                TickOutcome::Ate {
                    new_head,
                    new_food,
                    new_score: self.score,
                }
            }
        };

        debug!(?outcome, steps = self.steps, "tick");
        Some(outcome)
    }

    /// Check if moving the head to `cell` causes a collision.
    ///
    /// The body check covers the current tail even though it would be
    /// vacated this step, so chasing the tail tip is fatal.
    fn check_collision(&self, cell: Cell) -> Option<CollisionType> {
        if !self.grid.contains(cell) {
            return Some(CollisionType::Wall);
        }

        if self.snake.occupies(cell) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    fn game_over(&mut self, kind: CollisionType) -> TickOutcome {
        self.state = GameState::GameOver;

        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
            if let Err(err) = self.store.save(self.score) {
                warn!(error = %err, "failed to save high score");
            }
            info!(high_score = self.high_score, "new high score");
        }

        info!(score = self.score, ?kind, steps = self.steps, "game over");

        TickOutcome::Collided {
            final_score: self.score,
            kind,
            new_high_score,
        }
    }

    /// Move the food to a random cell the snake does not cover.
    ///
    /// If the snake fills the whole grid there is nowhere to go and the food
    /// stays where it is.
    pub fn place_food(&mut self) -> Cell {
        let max_draws = self.grid.capacity() * FOOD_DRAWS_PER_CELL;
        for _ in 0..max_draws {
            let cell = self.grid.random_cell(&mut self.rng);
            if !self.snake.occupies(cell) {
                self.food = cell;
                return cell;
            }
        }

        let free: Vec<Cell> = self
            .grid
            .cells()
            .filter(|cell| !self.snake.occupies(*cell))
            .collect();
        match free.choose(&mut self.rng) {
            Some(&cell) => self.food = cell,
            None => warn!(length = self.snake.len(), "no free cell left for food"),
        }
        self.food
    }

    /// Put the game into an arbitrary running position.
    ///
    /// Score, high score and pacing are left untouched. Food on a snake
    /// cell is resampled.
    pub fn arrange(&mut self, snake: Snake, direction: Direction, food: Cell) {
        self.snake = snake;
        self.direction = direction;
        self.pending_direction = direction;
        self.clock.rebase();
        self.state = GameState::Playing;
        self.food = food;
        if self.snake.occupies(food) || !self.grid.contains(food) {
            self.place_food();
        }
    }

    fn set_state(&mut self, state: GameState) -> TickOutcome {
        info!(from = ?self.state, to = ?state, "state change");
        self.state = state;
        TickOutcome::StateChanged { state }
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Read the high score, treating any failure as "none yet"
fn load_high_score<S: HighScoreStore>(store: &S) -> u32 {
    store.load().unwrap_or_else(|err| {
        warn!(error = %err, "failed to load high score");
        0
    })
}

/// Horizontal starting segment with its head on the grid center, facing right
fn initial_snake(grid: &Grid, config: &GameConfig) -> Snake {
    Snake::new(
        grid.center(),
        Direction::Right,
        config.initial_snake_length.max(3),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::GridOrigin;
    use anyhow::{Result, anyhow};
    use std::collections::HashSet;

    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn load(&self) -> Result<u32> {
            Err(anyhow!("storage unavailable"))
        }

        fn save(&mut self, _value: u32) -> Result<()> {
            Err(anyhow!("quota exceeded"))
        }
    }

    fn centered(size: usize) -> GridSimulation {
        let config = GameConfig {
            grid_size: size,
            origin: GridOrigin::Centered,
            ..GameConfig::default()
        };
        GridSimulation::with_seed(config, SessionStore::default(), 42)
    }

    fn playing(size: usize) -> GridSimulation {
        let mut sim = centered(size);
        sim.start();
        sim
    }

    #[test]
    fn test_new_starts_on_title() {
        let sim = centered(15);
        assert_eq!(sim.state(), GameState::Title);
        assert_eq!(sim.score(), 0);
        assert!(!sim.snake().occupies(sim.food()));
    }

    #[test]
    fn test_reset() {
        let mut sim = centered(20);
        let outcome = sim.reset();

        assert_eq!(sim.state(), GameState::Playing);
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.steps(), 0);
        assert_eq!(
            sim.snake().body,
            vec![Cell::new(0, 0), Cell::new(-1, 0), Cell::new(-2, 0)]
        );
        assert_eq!(sim.direction(), Direction::Right);
        assert_eq!(sim.tick_interval(), Duration::from_millis(300));
        assert!(!sim.snake().occupies(sim.food()));
        assert_eq!(
            outcome,
            TickOutcome::Reset {
                snake: sim.snake().body.clone(),
                food: sim.food(),
            }
        );
    }

    #[test]
    fn test_reset_on_corner_grid() {
        let mut sim =
            GridSimulation::with_seed(GameConfig::classic(), SessionStore::default(), 1);
        sim.reset();
        assert_eq!(
            sim.snake().body,
            vec![Cell::new(10, 10), Cell::new(9, 10), Cell::new(8, 10)]
        );
    }

    #[test]
    fn test_basic_movement() {
        let mut sim = playing(20);
        sim.arrange(sim.snake().clone(), Direction::Right, Cell::new(5, 5));

        let outcome = sim.tick();

        assert_eq!(
            outcome,
            Some(TickOutcome::Moved {
                new_head: Cell::new(1, 0),
                dropped_tail: Cell::new(-2, 0),
            })
        );
        assert_eq!(sim.snake().len(), 3);
        assert_eq!(sim.steps(), 1);
    }

    #[test]
    fn test_scenario_walk_to_food() {
        let mut sim = playing(20);
        sim.arrange(sim.snake().clone(), Direction::Right, Cell::new(4, 0));

        for x in 1..4 {
            let outcome = sim.tick().unwrap();
            assert!(matches!(
                outcome,
                TickOutcome::Moved { new_head, .. } if new_head == Cell::new(x, 0)
            ));
            assert_eq!(sim.score(), 0);
        }

        let outcome = sim.tick().unwrap();
        match outcome {
            TickOutcome::Ate {
                new_head,
                new_food,
                new_score,
            } => {
                assert_eq!(new_head, Cell::new(4, 0));
                assert_eq!(new_score, 10);
                assert_eq!(new_food, sim.food());
                assert!(!sim.snake().occupies(new_food));
            }
            other => panic!("expected Ate, got {:?}", other),
        }
        assert_eq!(sim.score(), 10);
        assert_eq!(sim.snake().len(), 4);
        assert_eq!(sim.snake().tail(), Cell::new(1, 0));
    }

    #[test]
    fn test_eating_speeds_up_to_floor() {
        let mut sim = playing(20);
        let base = sim.tick_interval();

        for i in 1..=40u32 {
            let snake = Snake::new(Cell::new(0, 0), Direction::Right, 3);
            sim.arrange(snake, Direction::Right, Cell::new(1, 0));
            assert!(matches!(sim.tick(), Some(TickOutcome::Ate { .. })));

            let expected = base
                .saturating_sub(Duration::from_millis(5) * i)
                .max(Duration::from_millis(150));
            assert_eq!(sim.tick_interval(), expected);
        }
        assert_eq!(sim.tick_interval(), Duration::from_millis(150));
    }

    #[test]
    fn test_wall_collision() {
        let mut sim = playing(20);
        let snake = Snake::new(Cell::new(9, 0), Direction::Right, 3);
        sim.arrange(snake.clone(), Direction::Right, Cell::new(-5, -5));

        let outcome = sim.tick();

        assert_eq!(
            outcome,
            Some(TickOutcome::Collided {
                final_score: 0,
                kind: CollisionType::Wall,
                new_high_score: false,
            })
        );
        assert_eq!(sim.state(), GameState::GameOver);
        assert_eq!(sim.snake(), &snake);
    }

    #[test]
    fn test_wall_collision_every_side() {
        for dir in Direction::ALL {
            let mut sim = playing(20);
            let edge = match dir {
                Direction::Up => Cell::new(0, -10),
                Direction::Down => Cell::new(0, 9),
                Direction::Left => Cell::new(-10, 0),
                Direction::Right => Cell::new(9, 0),
            };
            let snake = Snake::new(edge, dir, 3);
            sim.arrange(snake, dir, Cell::new(3, 3));
            assert!(sim.tick().unwrap().is_terminal(), "{:?}", dir);
        }
    }

    #[test]
    fn test_self_collision() {
        let mut sim = playing(10);
        // Body: (0,0), (-1,0), (-2,0), (-3,0), (-4,0)
        let snake = Snake::new(Cell::new(0, 0), Direction::Right, 5);
        sim.arrange(snake, Direction::Right, Cell::new(4, 4));

        sim.tick();
        sim.queue_direction(Direction::Down);
        sim.tick();
        sim.queue_direction(Direction::Left);
        sim.tick();
        sim.queue_direction(Direction::Up);
        let outcome = sim.tick().unwrap();

        assert_eq!(
            outcome,
            TickOutcome::Collided {
                final_score: 0,
                kind: CollisionType::SelfCollision,
                new_high_score: false,
            }
        );
    }

    #[test]
    fn test_moving_into_tail_tip_collides() {
        let mut sim = playing(10);
        // A 2x2 loop: head (0,0), then (0,1), (1,1), tail (1,0).
        let snake = Snake::from_cells(vec![
            Cell::new(0, 0),
            Cell::new(0, 1),
            Cell::new(1, 1),
            Cell::new(1, 0),
        ]);
        sim.arrange(snake, Direction::Up, Cell::new(-3, -3));
        sim.queue_direction(Direction::Right);

        let outcome = sim.tick().unwrap();
        assert!(matches!(
            outcome,
            TickOutcome::Collided {
                kind: CollisionType::SelfCollision,
                ..
            }
        ));
    }

    #[test]
    fn test_reversal_rejected() {
        let mut sim = playing(20);

        assert!(!sim.queue_direction(Direction::Left));
        assert_eq!(sim.pending_direction(), Direction::Right);

        sim.tick();
        assert_eq!(sim.snake().head(), Cell::new(1, 0));
    }

    #[test]
    fn test_only_last_turn_per_tick_commits() {
        let mut sim = playing(20);

        assert!(sim.queue_direction(Direction::Up));
        assert!(sim.queue_direction(Direction::Down));
        // Still checked against the committed heading, not the pending one.
        assert!(!sim.queue_direction(Direction::Left));
        assert_eq!(sim.pending_direction(), Direction::Down);
        assert_eq!(sim.direction(), Direction::Right);

        sim.tick();
        assert_eq!(sim.direction(), Direction::Down);
        assert_eq!(sim.snake().head(), Cell::new(0, 1));
    }

    #[test]
    fn test_steering_ignored_outside_play() {
        let mut sim = centered(20);
        assert!(!sim.queue_direction(Direction::Up));

        sim.start();
        sim.toggle_pause();
        assert!(!sim.queue_direction(Direction::Up));
    }

    #[test]
    fn test_pause_blocks_ticks() {
        let mut sim = playing(20);
        sim.toggle_pause();
        assert_eq!(sim.state(), GameState::Paused);

        let snake = sim.snake().clone();
        assert_eq!(sim.tick(), None);
        assert_eq!(sim.advance(Duration::from_secs(10)), None);
        assert_eq!(sim.snake(), &snake);
        assert_eq!(sim.steps(), 0);
    }

    #[test]
    fn test_double_toggle_is_idempotent() {
        let mut sim = playing(20);
        let interval = sim.tick_interval();

        sim.advance(Duration::from_millis(200));
        sim.toggle_pause();
        sim.toggle_pause();

        assert_eq!(sim.state(), GameState::Playing);
        assert_eq!(sim.tick_interval(), interval);
        // Progress from before the pause is discarded.
        assert_eq!(sim.advance(Duration::from_millis(200)), None);
        assert!(sim.advance(Duration::from_millis(100)).is_some());
        assert_eq!(sim.steps(), 1);
    }

    #[test]
    fn test_toggle_pause_ignored_when_resting() {
        let mut sim = centered(20);
        assert_eq!(sim.toggle_pause(), None);
        assert_eq!(sim.state(), GameState::Title);
    }

    #[test]
    fn test_advance_fires_at_interval() {
        let mut sim = playing(20);
        sim.arrange(sim.snake().clone(), Direction::Right, Cell::new(-8, -8));

        assert_eq!(sim.advance(Duration::from_millis(299)), None);
        assert!(sim.advance(Duration::from_millis(1)).is_some());
        assert_eq!(sim.advance(Duration::from_millis(299)), None);
        assert_eq!(sim.steps(), 1);
    }

    #[test]
    fn test_state_machine() {
        let mut sim = centered(20);

        assert_eq!(sim.restart(), None);
        assert_eq!(sim.to_title(), None);

        assert!(sim.start().is_some());
        assert_eq!(sim.start(), None);
        assert_eq!(sim.to_title(), None);

        sim.toggle_pause();
        assert_eq!(
            sim.to_title(),
            Some(TickOutcome::StateChanged {
                state: GameState::Title
            })
        );

        sim.start();
        let snake = Snake::new(Cell::new(9, 0), Direction::Right, 3);
        sim.arrange(snake, Direction::Right, Cell::new(0, 5));
        sim.tick();
        assert_eq!(sim.state(), GameState::GameOver);

        assert!(matches!(sim.restart(), Some(TickOutcome::Reset { .. })));
        assert_eq!(sim.state(), GameState::Playing);
    }

    #[test]
    fn test_title_restores_base_speed() {
        let mut sim = playing(20);
        sim.arrange(sim.snake().clone(), Direction::Right, Cell::new(1, 0));
        sim.tick();
        assert!(sim.tick_interval() < Duration::from_millis(300));

        sim.toggle_pause();
        sim.to_title();
        assert_eq!(sim.tick_interval(), Duration::from_millis(300));
    }

    #[test]
    fn test_high_score_saved_on_collision() {
        let mut sim = playing(20);
        sim.arrange(sim.snake().clone(), Direction::Right, Cell::new(1, 0));
        sim.tick();
        sim.score = 30;

        let snake = Snake::new(Cell::new(9, 0), Direction::Right, 3);
        sim.arrange(snake, Direction::Right, Cell::new(0, 5));
        let outcome = sim.tick().unwrap();

        assert_eq!(
            outcome,
            TickOutcome::Collided {
                final_score: 30,
                kind: CollisionType::Wall,
                new_high_score: true,
            }
        );
        assert_eq!(sim.high_score(), 30);
        assert_eq!(sim.store().load().unwrap(), 30);
    }

    #[test]
    fn test_lower_score_keeps_high_score() {
        let mut store = SessionStore::default();
        store.save(500).unwrap();
        let mut sim = GridSimulation::with_seed(GameConfig::default(), store, 3);
        assert_eq!(sim.high_score(), 500);

        sim.start();
        let snake = Snake::new(Cell::new(7, 0), Direction::Right, 3);
        sim.arrange(snake, Direction::Right, Cell::new(0, 5));
        let outcome = sim.tick().unwrap();

        assert!(matches!(
            outcome,
            TickOutcome::Collided {
                new_high_score: false,
                ..
            }
        ));
        assert_eq!(sim.high_score(), 500);
    }

    #[test]
    fn test_broken_store_is_harmless() {
        let mut sim = GridSimulation::with_seed(GameConfig::default(), BrokenStore, 5);
        assert_eq!(sim.high_score(), 0);

        sim.start();
        sim.score = 20;
        let snake = Snake::new(Cell::new(7, 0), Direction::Right, 3);
        sim.arrange(snake, Direction::Right, Cell::new(0, 5));

        assert!(sim.tick().unwrap().is_terminal());
        assert_eq!(sim.high_score(), 20);
    }

    #[test]
    fn test_food_never_on_snake() {
        let mut sim = playing(5);
        for _ in 0..200 {
            let food = sim.place_food();
            assert!(sim.grid().contains(food));
            assert!(!sim.snake().occupies(food));
        }
    }

    #[test]
    fn test_food_found_on_nearly_full_grid() {
        let mut sim = playing(5);
        let all: Vec<Cell> = sim.grid().cells().collect();
        let free = all[7];
        let body: Vec<Cell> = all.into_iter().filter(|c| *c != free).collect();
        sim.snake = Snake::from_cells(body);

        assert_eq!(sim.place_food(), free);
    }

    #[test]
    fn test_full_grid_keeps_food() {
        let mut sim = playing(5);
        let before = sim.food();
        sim.snake = Snake::from_cells(sim.grid().cells().collect());

        assert_eq!(sim.place_food(), before);
    }

    #[test]
    fn test_no_duplicate_cells_while_playing() {
        let mut sim = playing(15);
        let turns = [
            Direction::Down,
            Direction::Left,
            Direction::Up,
            Direction::Right,
        ];

        for step in 0..400usize {
            if step % 5 == 0 {
                sim.queue_direction(turns[(step / 5) % turns.len()]);
            }
            match sim.tick() {
                Some(TickOutcome::Collided { .. }) => {
                    sim.restart();
                }
                Some(_) => {
                    let unique: HashSet<Cell> = sim.snake().iter().copied().collect();
                    assert_eq!(unique.len(), sim.snake().len());
                    assert!(sim.snake().len() >= 3);
                    assert!(!sim.snake().occupies(sim.food()));
                }
                None => panic!("tick skipped while playing"),
            }
        }
    }
}
