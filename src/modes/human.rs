use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

use crate::driver::TickDriver;
use crate::game::{GameConfig, GameState, GridSimulation, TickOutcome};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::persistence::HighScoreStore;
use crate::render::Renderer;

/// Frame cadence of the simulation driver
const FRAME_INTERVAL: Duration = Duration::from_millis(10);
/// Render at 30 FPS
const RENDER_INTERVAL: Duration = Duration::from_millis(33);
/// How long the crashed board stays up before the game-over panel
const GAME_OVER_DELAY: Duration = Duration::from_millis(1500);

pub struct HumanMode<S: HighScoreStore> {
    sim: GridSimulation<S>,
    driver: TickDriver,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    crashed_at: Option<Instant>,
}

impl<S: HighScoreStore> HumanMode<S> {
    pub fn new(config: GameConfig, store: S) -> Self {
        Self {
            sim: GridSimulation::new(config, store),
            driver: TickDriver::new(),
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            crashed_at: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        if result.is_ok() {
            info!(
                games = self.metrics.games_played,
                best = self.metrics.best_score,
                "session finished"
            );
        }
        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut frame_timer = interval(FRAME_INTERVAL);
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();

        let mut render_timer = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Simulation frame
                _ = frame_timer.tick() => {
                    let now = Instant::now();
                    let dt = now - last_frame;
                    last_frame = now;
                    if self.driver.is_running() {
                        self.update_game(dt)?;
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    let show_crash = self
                        .crashed_at
                        .is_some_and(|at| at.elapsed() >= GAME_OVER_DELAY);
                    let grid = *self.sim.grid();
                    let high_score = self.sim.high_score();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &grid, high_score, &self.metrics, show_crash);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key, self.sim.state()) {
                KeyAction::Steer(direction) => {
                    self.sim.queue_direction(direction);
                }
                KeyAction::Start => {
                    let outcome = self.sim.start();
                    self.apply_outcome(outcome);
                }
                KeyAction::Restart => {
                    let outcome = self.sim.restart();
                    self.apply_outcome(outcome);
                }
                KeyAction::TogglePause => {
                    let outcome = self.sim.toggle_pause();
                    self.apply_outcome(outcome);
                }
                KeyAction::Menu => {
                    let outcome = self.sim.to_title();
                    self.apply_outcome(outcome);
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }
    }

    fn update_game(&mut self, dt: Duration) -> Result<()> {
        let outcome = self
            .driver
            .frame(&mut self.sim, &mut self.renderer, dt)
            .context("Simulation frame rejected")?;

        if let Some(TickOutcome::Collided { final_score, .. }) = outcome {
            self.metrics.on_game_over(final_score);
            self.crashed_at = Some(Instant::now());
        }

        Ok(())
    }

    /// Push a non-tick outcome to the screen and keep metrics in step
    fn apply_outcome(&mut self, outcome: Option<TickOutcome>) {
        match &outcome {
            Some(TickOutcome::Reset { .. }) => {
                self.metrics.on_game_start();
                self.crashed_at = None;
            }
            Some(TickOutcome::StateChanged { state }) => match state {
                GameState::Paused => self.metrics.on_pause(),
                GameState::Playing => self.metrics.on_resume(),
                GameState::Title => self.crashed_at = None,
                GameState::GameOver => {}
            },
            _ => {}
        }
        self.driver.dispatch(&self.sim, &mut self.renderer, outcome);
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
