use std::time::{Duration, Instant};

/// Per-process play statistics.
///
/// Play time only runs while a game is actually being played; pauses and
/// menus do not count.
pub struct GameMetrics {
    pub elapsed_time: Duration,
    pub games_played: u32,
    pub best_score: u32,
    running_since: Option<Instant>,
    banked: Duration,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            elapsed_time: Duration::ZERO,
            games_played: 0,
            best_score: 0,
            running_since: None,
            banked: Duration::ZERO,
        }
    }

    pub fn update(&mut self) {
        let running = self.running_since.map_or(Duration::ZERO, |t| t.elapsed());
        self.elapsed_time = self.banked + running;
    }

    pub fn on_game_start(&mut self) {
        self.banked = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
        self.running_since = Some(Instant::now());
    }

    pub fn on_pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.banked += since.elapsed();
        }
        self.update();
    }

    pub fn on_resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.on_pause();
        self.games_played += 1;
        if final_score > self.best_score {
            self.best_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
