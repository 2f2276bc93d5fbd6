// Menu state management and game mode definitions

/// Game mode selection
#[derive(Debug, Clone)]
pub enum GameMode {
    /// Host a room (will display the room code for the other player)
    NetworkHost,
    /// Join a room by code
    NetworkJoin(String),
    /// Local 2-player on same keyboard
    LocalTwoPlayer,
}

/// Menu items
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuItem {
    HostGame,
    JoinGame,
    LocalTwoPlayer,
    Quit,
}

impl MenuItem {
    /// Get display text for menu item
    pub fn display_text(&self) -> &str {
        match self {
            MenuItem::HostGame => "Host Game",
            MenuItem::JoinGame => "Join Game",
            MenuItem::LocalTwoPlayer => "Local 2-Player",
            MenuItem::Quit => "Quit",
        }
    }

    /// Get all menu items in order
    pub fn all() -> Vec<MenuItem> {
        vec![
            MenuItem::HostGame,
            MenuItem::JoinGame,
            MenuItem::LocalTwoPlayer,
            MenuItem::Quit,
        ]
    }
}

/// Menu state
pub struct MenuState {
    /// Currently selected menu item index
    pub selected_index: usize,
    /// All menu items
    pub items: Vec<MenuItem>,
    /// Room code input buffer (for Join mode)
    pub room_code_input: String,
    /// Whether currently in room code input mode
    pub in_input_mode: bool,
}

impl MenuState {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            items: MenuItem::all(),
            room_code_input: String::new(),
            in_input_mode: false,
        }
    }

    /// Get currently selected menu item
    pub fn selected_item(&self) -> MenuItem {
        self.items[self.selected_index]
    }

    /// Move selection up
    pub fn select_previous(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        } else {
            self.selected_index = self.items.len() - 1;
        }
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        if self.selected_index < self.items.len() - 1 {
            self.selected_index += 1;
        } else {
            self.selected_index = 0;
        }
    }

    /// Enter room code input mode
    pub fn start_room_code_input(&mut self) {
        self.in_input_mode = true;
        self.room_code_input.clear();
    }

    /// Exit room code input mode
    pub fn cancel_room_code_input(&mut self) {
        self.in_input_mode = false;
        self.room_code_input.clear();
    }

    /// Get the entered room code and exit input mode
    pub fn submit_room_code(&mut self) -> String {
        self.in_input_mode = false;
        self.room_code_input.clone()
    }

    /// Add character to room code input
    pub fn add_char_to_room_code(&mut self, c: char) {
        self.room_code_input.push(c.to_ascii_uppercase());
    }

    /// Remove last character from room code input
    pub fn backspace_room_code(&mut self) {
        self.room_code_input.pop();
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new()
    }
}
