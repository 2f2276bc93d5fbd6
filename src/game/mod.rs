pub mod board;
pub mod input;
pub mod session;

pub use board::{Board, PlayerSlot, COLS, ROWS};
pub use input::{poll_input, InputAction};
pub use session::{EndReason, GameOutcome, GameSession, SessionEvent, SessionState};
