// Menu input handling

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use super::state::{GameMode, MenuItem, MenuState};

/// Menu action result
pub enum MenuAction {
    /// Continue in menu
    None,
    /// Start a game mode
    StartGame(GameMode),
    /// Exit application
    Quit,
}

/// Handle menu input and return the next action
pub fn handle_menu_input(menu_state: &mut MenuState) -> Result<MenuAction, io::Error> {
    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(handle_key_press(menu_state, key.code, key.modifiers));
            }
        }
    }

    Ok(MenuAction::None)
}

fn handle_key_press(
    menu_state: &mut MenuState,
    key_code: KeyCode,
    modifiers: KeyModifiers,
) -> MenuAction {
    // Room code entry grabs the keyboard while active
    if menu_state.in_input_mode {
        return handle_room_code_input(menu_state, key_code, modifiers);
    }

    // Normal menu navigation
    match key_code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
            menu_state.select_previous();
            MenuAction::None
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            menu_state.select_next();
            MenuAction::None
        }
        KeyCode::Enter | KeyCode::Char(' ') => handle_menu_selection(menu_state),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => MenuAction::Quit,
        _ => MenuAction::None,
    }
}

fn handle_menu_selection(menu_state: &mut MenuState) -> MenuAction {
    match menu_state.selected_item() {
        MenuItem::HostGame => MenuAction::StartGame(GameMode::NetworkHost),
        MenuItem::JoinGame => {
            // Enter room code input mode
            menu_state.start_room_code_input();
            MenuAction::None
        }
        MenuItem::LocalTwoPlayer => MenuAction::StartGame(GameMode::LocalTwoPlayer),
        MenuItem::Quit => MenuAction::Quit,
    }
}

fn handle_room_code_input(
    menu_state: &mut MenuState,
    key_code: KeyCode,
    modifiers: KeyModifiers,
) -> MenuAction {
    match key_code {
        KeyCode::Enter => {
            let code = menu_state.submit_room_code();
            if !code.is_empty() {
                MenuAction::StartGame(GameMode::NetworkJoin(code))
            } else {
                MenuAction::None
            }
        }
        KeyCode::Esc => {
            menu_state.cancel_room_code_input();
            MenuAction::None
        }
        KeyCode::Backspace => {
            menu_state.backspace_room_code();
            MenuAction::None
        }
        KeyCode::Char('v') | KeyCode::Char('V')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            if let Some(pasted) = try_paste_from_clipboard() {
                for c in pasted.chars().filter(|c| c.is_alphanumeric() || *c == '-') {
                    menu_state.add_char_to_room_code(c);
                }
            }
            MenuAction::None
        }
        KeyCode::Char(c) => {
            // Room codes are alphanumeric plus the prefix hyphen
            if c.is_alphanumeric() || c == '-' {
                menu_state.add_char_to_room_code(c);
            }
            MenuAction::None
        }
        _ => MenuAction::None,
    }
}

/// Read the system clipboard, if one is available
pub fn try_paste_from_clipboard() -> Option<String> {
    arboard::Clipboard::new()
        .and_then(|mut clipboard| clipboard.get_text())
        .ok()
}
