// Menu module for P2PFour
// Handles main menu UI, navigation, and game mode selection

pub mod input;
pub mod render;
pub mod state;

pub use input::{handle_menu_input, MenuAction};
pub use render::{render_connecting_to_peer, render_menu, render_waiting_for_connection};
pub use state::{GameMode, MenuItem, MenuState};
