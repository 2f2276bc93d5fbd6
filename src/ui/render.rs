// Board rendering with Ratatui

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::config::DisplayConfig;
use crate::game::{Board, PlayerSlot, COLS, ROWS};

use super::overlay::{render_overlay, OverlayMessage};

/// Everything the renderer needs for one frame, read-only
pub struct GameView<'a> {
    pub board: &'a Board,
    pub turn: PlayerSlot,
    /// The local player's slot; None in local two-player mode
    pub you: Option<PlayerSlot>,
    pub cursor_col: usize,
    pub status: String,
}

fn rgb(c: [u8; 3]) -> Color {
    Color::Rgb(c[0], c[1], c[2])
}

fn slot_color(slot: PlayerSlot, display: &DisplayConfig) -> Color {
    match slot {
        PlayerSlot::Slot1 => rgb(display.slot1_color),
        PlayerSlot::Slot2 => rgb(display.slot2_color),
    }
}

/// Human name for a slot, matching its piece color
pub fn slot_name(slot: PlayerSlot) -> &'static str {
    match slot {
        PlayerSlot::Slot1 => "Red",
        PlayerSlot::Slot2 => "Yellow",
    }
}

/// Render the game screen, with an optional overlay box on top
pub fn render(
    frame: &mut Frame,
    view: &GameView,
    display: &DisplayConfig,
    overlay: Option<&OverlayMessage>,
) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Rgb(0, 0, 0))),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),                // Title
            Constraint::Length(ROWS as u16 + 3),  // Cursor row + board + labels
            Constraint::Min(2),                   // Status + controls hint
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "P 2 P F O U R",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    frame.render_widget(
        Paragraph::new(board_lines(view, display)).alignment(Alignment::Center),
        chunks[1],
    );

    let status_lines = vec![
        Line::from(Span::styled(
            view.status.clone(),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            "←/→ move   ↓ drop   R restart   Q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(
        Paragraph::new(status_lines).alignment(Alignment::Center),
        chunks[2],
    );

    if let Some(message) = overlay {
        render_overlay(frame, message, area);
    }
}

/// Build the cursor row, the grid rows and the column labels.
/// Every line is exactly COLS * 4 + 1 characters so centered alignment
/// keeps them stacked.
fn board_lines<'a>(view: &GameView, display: &DisplayConfig) -> Vec<Line<'a>> {
    let frame_style = Style::default().fg(rgb(display.board_color));
    let mut lines = Vec::with_capacity(ROWS + 3);

    // Cursor marker above the active column
    let cursor_color = view
        .you
        .map(|slot| slot_color(slot, display))
        .unwrap_or_else(|| slot_color(view.turn, display));
    let mut cursor_spans = vec![Span::raw(" ")];
    for col in 0..COLS {
        let marker = if col == view.cursor_col { " ▼  " } else { "    " };
        cursor_spans.push(Span::styled(
            marker.to_string(),
            Style::default().fg(cursor_color).add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::from(cursor_spans));

    for row in 0..ROWS {
        let mut spans = Vec::with_capacity(COLS * 2 + 1);
        spans.push(Span::styled("│", frame_style));
        for col in 0..COLS {
            let cell = match view.board.cell(row, col) {
                Some(slot) => Span::styled(
                    " ● ".to_string(),
                    Style::default().fg(slot_color(slot, display)),
                ),
                None => Span::styled(" · ".to_string(), Style::default().fg(Color::DarkGray)),
            };
            spans.push(cell);
            spans.push(Span::styled("│", frame_style));
        }
        lines.push(Line::from(spans));
    }

    // Bottom edge and column numbers
    let mut bottom = String::from("└");
    for col in 0..COLS {
        bottom.push_str("───");
        bottom.push(if col == COLS - 1 { '┘' } else { '┴' });
    }
    lines.push(Line::from(Span::styled(bottom, frame_style)));

    let mut labels = String::from(" ");
    for col in 0..COLS {
        labels.push_str(&format!(" {}  ", col + 1));
    }
    lines.push(Line::from(Span::styled(
        labels,
        Style::default().fg(Color::DarkGray),
    )));

    lines
}
