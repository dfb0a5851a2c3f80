use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use super::{BoardView, RenderSink};
use crate::game::{Cell, CollisionType, GameState, Grid, TickOutcome};
use crate::metrics::GameMetrics;

/// Terminal renderer. Keeps its own copy of the board, fed by outcomes.
pub struct Renderer {
    view: BoardView,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            view: BoardView::new(),
        }
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    /// Draw one frame. `show_crash` switches a finished game from the frozen
    /// board to the game-over panel.
    pub fn render(
        &self,
        frame: &mut Frame,
        grid: &Grid,
        high_score: u32,
        metrics: &GameMetrics,
        show_crash: bool,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], high_score, metrics);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        match self.view.state() {
            GameState::Title => {
                frame.render_widget(self.render_title(game_area, high_score), game_area)
            }
            GameState::GameOver if show_crash => {
                frame.render_widget(self.render_game_over(game_area), game_area)
            }
            state => {
                let grid = self.render_grid(game_area, grid, state == GameState::Paused);
                frame.render_widget(grid, game_area);
            }
        }

        let controls = self.render_controls(chunks[2]);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, _area: Rect, grid: &Grid, paused: bool) -> Paragraph<'_> {
        let mut lines = Vec::new();
        let head = self.view.head();

        for y in grid.min_coord()..grid.end_coord() {
            let mut spans = Vec::new();

            for x in grid.min_coord()..grid.end_coord() {
                let cell = Cell::new(x, y);

                let span = if Some(cell) == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if self.view.contains(cell) {
                    Span::styled("□ ", Style::default().fg(Color::Rgb(0x00, 0x88, 0x00)))
                } else if Some(cell) == self.view.food() {
                    Span::styled(
                        "● ",
                        Style::default()
                            .fg(Color::Rgb(0xff, 0x44, 0x44))
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(span);
            }

            lines.push(Line::from(spans));
        }

        let title = if paused { " PAUSED " } else { " Snake " };
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::Rgb(0x00, 0x66, 0xcc)))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        _area: Rect,
        high_score: u32,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                self.view.score().to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("High: ", Style::default().fg(Color::Yellow)),
            Span::styled(high_score.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_title(&self, _area: Rect, high_score: u32) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "S N A K E",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("High Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(high_score.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Space",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to start", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
    }

    fn render_game_over(&self, _area: Rect) -> Paragraph<'_> {
        let crash = self.view.last_crash();
        let final_score = crash.map(|c| c.final_score).unwrap_or(self.view.score());
        let cause = match crash.map(|c| c.kind) {
            Some(CollisionType::Wall) => "You hit the wall",
            Some(CollisionType::SelfCollision) => "You bit yourself",
            None => "",
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(cause, Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    final_score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if crash.is_some_and(|c| c.new_high_score) {
            text.push(Line::from(vec![Span::styled(
                "New High Score!",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )]));
        }

        text.extend([
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" restart | ", Style::default().fg(Color::Gray)),
                Span::styled("Esc", Style::default().fg(Color::Cyan)),
                Span::styled(" menu | ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" quit", Style::default().fg(Color::Gray)),
            ]),
        ]);

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" to pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" to restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink for Renderer {
    fn apply(&mut self, outcome: &TickOutcome) {
        self.view.apply(outcome);
    }
}
