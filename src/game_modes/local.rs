// Local two-player mode: both players share the keyboard, alternating turns

use std::io;
use std::time::Instant;

use ratatui::Terminal;

use crate::config::Config;
use crate::game::{poll_input, Board, GameOutcome, InputAction, PlayerSlot, COLS};
use crate::ui::{self, GameView, OverlayMessage};

use super::common::{frame_duration, limit_frame_rate};

/// Run a hot-seat game on one keyboard
pub fn run_game_local<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
) -> Result<(), io::Error> {
    let frame_budget = frame_duration(config);

    let mut board = Board::new();
    let mut turn = PlayerSlot::Slot1;
    let mut cursor: usize = COLS / 2;
    let mut outcome: Option<GameOutcome> = None;

    loop {
        let now = Instant::now();

        for action in poll_input(&config.keybindings)? {
            match action {
                InputAction::Quit => return Ok(()),
                InputAction::Restart => {
                    board.clear();
                    turn = PlayerSlot::Slot1;
                    outcome = None;
                }
                InputAction::MoveLeft => cursor = cursor.saturating_sub(1),
                InputAction::MoveRight => {
                    if cursor + 1 < COLS {
                        cursor += 1;
                    }
                }
                InputAction::Drop => {
                    if outcome.is_none() {
                        if let Some(row) = board.drop_piece(cursor, turn) {
                            if board.check_win(row, cursor, turn) {
                                outcome = Some(GameOutcome::Winner(turn));
                            } else if board.is_full() {
                                outcome = Some(GameOutcome::Draw);
                            } else {
                                turn = turn.other();
                            }
                        }
                    }
                }
            }
        }

        let status = format!("{}'s turn", ui::slot_name(turn));
        let overlay = outcome.map(|o| {
            let lines = |headline: String| {
                vec![
                    headline,
                    String::new(),
                    "R: Play again  Q: Back to menu".to_string(),
                ]
            };
            match o {
                GameOutcome::Winner(slot) => {
                    OverlayMessage::success(lines(format!("{} wins!", ui::slot_name(slot))))
                }
                GameOutcome::Draw => OverlayMessage::info(lines("It's a draw".to_string())),
            }
        });

        let view = GameView {
            board: &board,
            turn,
            you: None,
            cursor_col: cursor,
            status,
        };
        terminal.draw(|f| ui::render(f, &view, &config.display, overlay.as_ref()))?;

        limit_frame_rate(now, frame_budget);
    }
}
