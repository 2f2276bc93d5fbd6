use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};

use crate::config::KeyBindings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Quit,
    Restart,
    MoveLeft,
    MoveRight,
    Drop,
}

/// Poll for input events and return actions.
/// Each Press event generates an immediate action - no state tracking needed.
pub fn poll_input(bindings: &KeyBindings) -> Result<Vec<InputAction>, std::io::Error> {
    let mut actions = Vec::new();

    // Process all pending Press events
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                if let Some(action) = action_for_key(key.code, bindings) {
                    actions.push(action);
                }
            }
        }
    }

    Ok(actions)
}

fn action_for_key(code: KeyCode, bindings: &KeyBindings) -> Option<InputAction> {
    if matches_key(code, &bindings.quit) || code == KeyCode::Esc {
        Some(InputAction::Quit)
    } else if matches_key(code, &bindings.restart) {
        Some(InputAction::Restart)
    } else if matches_key(code, &bindings.move_left) {
        Some(InputAction::MoveLeft)
    } else if matches_key(code, &bindings.move_right) {
        Some(InputAction::MoveRight)
    } else if matches_key(code, &bindings.drop) {
        Some(InputAction::Drop)
    } else {
        None
    }
}

/// Match a crossterm key code against a config binding string.
/// Bindings are named keys ("Left", "Enter", "Space") or single characters,
/// matched case-insensitively.
pub fn matches_key(code: KeyCode, binding: &str) -> bool {
    match code {
        KeyCode::Left => binding.eq_ignore_ascii_case("Left"),
        KeyCode::Right => binding.eq_ignore_ascii_case("Right"),
        KeyCode::Up => binding.eq_ignore_ascii_case("Up"),
        KeyCode::Down => binding.eq_ignore_ascii_case("Down"),
        KeyCode::Enter => binding.eq_ignore_ascii_case("Enter"),
        KeyCode::Esc => binding.eq_ignore_ascii_case("Esc"),
        KeyCode::Backspace => binding.eq_ignore_ascii_case("Backspace"),
        KeyCode::Char(' ') => binding.eq_ignore_ascii_case("Space"),
        KeyCode::Char(c) => {
            let mut chars = binding.chars();
            matches!((chars.next(), chars.next()),
                (Some(b), None) if b.eq_ignore_ascii_case(&c))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_key_matching() {
        assert!(matches_key(KeyCode::Left, "Left"));
        assert!(matches_key(KeyCode::Left, "left"));
        assert!(matches_key(KeyCode::Enter, "Enter"));
        assert!(matches_key(KeyCode::Char(' '), "Space"));
        assert!(!matches_key(KeyCode::Left, "Right"));
    }

    #[test]
    fn test_char_key_matching_is_case_insensitive() {
        assert!(matches_key(KeyCode::Char('r'), "R"));
        assert!(matches_key(KeyCode::Char('R'), "r"));
        assert!(!matches_key(KeyCode::Char('r'), "q"));
        assert!(!matches_key(KeyCode::Char('r'), "rr"));
    }

    #[test]
    fn test_default_bindings_map_to_actions() {
        let bindings = KeyBindings::default();
        assert_eq!(
            action_for_key(KeyCode::Left, &bindings),
            Some(InputAction::MoveLeft)
        );
        assert_eq!(
            action_for_key(KeyCode::Right, &bindings),
            Some(InputAction::MoveRight)
        );
        assert_eq!(
            action_for_key(KeyCode::Down, &bindings),
            Some(InputAction::Drop)
        );
        assert_eq!(
            action_for_key(KeyCode::Char('q'), &bindings),
            Some(InputAction::Quit)
        );
        assert_eq!(action_for_key(KeyCode::Char('x'), &bindings), None);
    }
}
