use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Direction, GameState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Steer(Direction),
    Start,
    TogglePause,
    Restart,
    Menu,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Map a key to an action. What a key means depends on the current screen.
    pub fn handle_key_event(&self, key: KeyEvent, state: GameState) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        if let KeyCode::Char('q') | KeyCode::Char('Q') = key.code {
            return KeyAction::Quit;
        }

        match state {
            GameState::Title => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => KeyAction::Start,
                KeyCode::Esc => KeyAction::Quit,
                _ => KeyAction::None,
            },
            GameState::Playing => match key.code {
                KeyCode::Char(' ') => KeyAction::TogglePause,
                KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,
                code => steer(code).map_or(KeyAction::None, KeyAction::Steer),
            },
            GameState::Paused => match key.code {
                KeyCode::Char(' ') => KeyAction::TogglePause,
                KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,
                KeyCode::Esc => KeyAction::Menu,
                _ => KeyAction::None,
            },
            GameState::GameOver => match key.code {
                KeyCode::Char(' ')
                | KeyCode::Enter
                | KeyCode::Char('r')
                | KeyCode::Char('R') => KeyAction::Restart,
                KeyCode::Esc => KeyAction::Menu,
                _ => KeyAction::None,
            },
        }
    }
}

/// Arrow keys and WASD
fn steer(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Direction::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Direction::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Direction::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Direction::Right),
        _ => None,
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
