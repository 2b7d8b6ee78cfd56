use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Direction, Mode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Turn request for an agent: arrows drive agent 0, WASD agent 1
    Steer { agent: usize, direction: Direction },
    TogglePause,
    Restart,
    SelectMode(Mode),
    CycleDifficulty,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        let steer = |agent, direction| KeyAction::Steer { agent, direction };

        match key.code {
            // Agent 0 - Arrow keys
            KeyCode::Up => steer(0, Direction::Up),
            KeyCode::Down => steer(0, Direction::Down),
            KeyCode::Left => steer(0, Direction::Left),
            KeyCode::Right => steer(0, Direction::Right),

            // Agent 1 - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => steer(1, Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => steer(1, Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => steer(1, Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => steer(1, Direction::Right),

            // Mode selection
            KeyCode::Char('1') => KeyAction::SelectMode(Mode::Classic),
            KeyCode::Char('2') => KeyAction::SelectMode(Mode::Maze),
            KeyCode::Char('3') => KeyAction::SelectMode(Mode::Timed),
            KeyCode::Char('4') => KeyAction::SelectMode(Mode::NoWalls),
            KeyCode::Char('5') => KeyAction::SelectMode(Mode::Multiplayer),

            // Controls
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                KeyAction::TogglePause
            }
            KeyCode::Tab => KeyAction::CycleDifficulty,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter => KeyAction::Restart,

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyAction {
        InputHandler::new().handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_arrow_keys_steer_first_agent() {
        assert_eq!(
            press(KeyCode::Up),
            KeyAction::Steer {
                agent: 0,
                direction: Direction::Up
            }
        );
        assert_eq!(
            press(KeyCode::Down),
            KeyAction::Steer {
                agent: 0,
                direction: Direction::Down
            }
        );
        assert_eq!(
            press(KeyCode::Left),
            KeyAction::Steer {
                agent: 0,
                direction: Direction::Left
            }
        );
        assert_eq!(
            press(KeyCode::Right),
            KeyAction::Steer {
                agent: 0,
                direction: Direction::Right
            }
        );
    }

    #[test]
    fn test_wasd_keys_steer_second_agent() {
        assert_eq!(
            press(KeyCode::Char('w')),
            KeyAction::Steer {
                agent: 1,
                direction: Direction::Up
            }
        );
        assert_eq!(
            press(KeyCode::Char('a')),
            KeyAction::Steer {
                agent: 1,
                direction: Direction::Left
            }
        );
        assert_eq!(
            press(KeyCode::Char('s')),
            KeyAction::Steer {
                agent: 1,
                direction: Direction::Down
            }
        );
        assert_eq!(
            press(KeyCode::Char('D')),
            KeyAction::Steer {
                agent: 1,
                direction: Direction::Right
            }
        );
    }

    #[test]
    fn test_mode_keys() {
        assert_eq!(press(KeyCode::Char('1')), KeyAction::SelectMode(Mode::Classic));
        assert_eq!(press(KeyCode::Char('3')), KeyAction::SelectMode(Mode::Timed));
        assert_eq!(
            press(KeyCode::Char('5')),
            KeyAction::SelectMode(Mode::Multiplayer)
        );
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(press(KeyCode::Char(' ')), KeyAction::TogglePause);
        assert_eq!(press(KeyCode::Char('p')), KeyAction::TogglePause);
        assert_eq!(press(KeyCode::Tab), KeyAction::CycleDifficulty);
        assert_eq!(press(KeyCode::Char('r')), KeyAction::Restart);
        assert_eq!(press(KeyCode::Enter), KeyAction::Restart);
        assert_eq!(press(KeyCode::Char('q')), KeyAction::Quit);
        assert_eq!(press(KeyCode::Esc), KeyAction::Quit);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(press(KeyCode::Char('x')), KeyAction::None);
    }

    #[test]
    fn test_ctrl_c() {
        let handler = InputHandler::new();

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c), KeyAction::Quit);
    }
}
