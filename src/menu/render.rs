// Menu rendering with Ratatui

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::ui::{render_overlay, OverlayMessage};

use super::state::MenuState;

const TITLE_ART: [&str; 6] = [
    "  ██████╗ ██████╗ ██████╗ ███████╗ ██████╗ ██╗   ██╗██████╗ ",
    "  ██╔══██╗╚════██╗██╔══██╗██╔════╝██╔═══██╗██║   ██║██╔══██╗",
    "  ██████╔╝ █████╔╝██████╔╝█████╗  ██║   ██║██║   ██║██████╔╝",
    "  ██╔═══╝ ██╔═══╝ ██╔═══╝ ██╔══╝  ██║   ██║██║   ██║██╔══██╗",
    "  ██║     ███████╗██║     ██║     ╚██████╔╝╚██████╔╝██║  ██║",
    "  ╚═╝     ╚══════╝╚═╝     ╚═╝      ╚═════╝  ╚═════╝ ╚═╝  ╚═╝",
];

/// Render the main menu
pub fn render_menu(frame: &mut Frame, menu_state: &MenuState) {
    let area = frame.area();

    // Draw background
    let bg = Block::default().style(Style::default().bg(Color::Rgb(0, 0, 0)));
    frame.render_widget(bg, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Title area
            Constraint::Min(8),     // Menu items
            Constraint::Length(3),  // Controls hint
        ])
        .split(area);

    // Draw ASCII art title
    let mut title_text = vec![Line::from("")];
    title_text.extend(TITLE_ART.iter().map(|row| {
        Line::from(Span::styled(
            *row,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
    }));
    let title = Paragraph::new(title_text).alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    // Draw menu items
    let menu_items: Vec<Line> = menu_state
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_selected = i == menu_state.selected_index;
            let prefix = if is_selected { "  > " } else { "    " };
            let text = format!("{}{}", prefix, item.display_text());

            if is_selected {
                Line::from(Span::styled(
                    text,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(text, Style::default().fg(Color::White)))
            }
        })
        .collect();

    let menu = Paragraph::new(menu_items).alignment(Alignment::Center);
    frame.render_widget(menu, chunks[1]);

    // Draw controls hint
    let controls = vec![Line::from(vec![
        Span::styled("↑/↓", Style::default().fg(Color::Gray)),
        Span::styled(": Navigate  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Enter", Style::default().fg(Color::Gray)),
        Span::styled(": Select  ", Style::default().fg(Color::DarkGray)),
        Span::styled("Q/Esc", Style::default().fg(Color::Gray)),
        Span::styled(": Quit", Style::default().fg(Color::DarkGray)),
    ])];

    let controls_widget = Paragraph::new(controls).alignment(Alignment::Center);
    frame.render_widget(controls_widget, chunks[2]);

    // If entering a room code, show the input dialog on top
    if menu_state.in_input_mode {
        render_room_code_dialog(frame, &menu_state.room_code_input);
    }
}

/// Render room code input dialog overlay
fn render_room_code_dialog(frame: &mut Frame, room_code: &str) {
    let area = frame.area();

    let dialog_width = 50.min(area.width.saturating_sub(4));
    let dialog_height = 7;
    let dialog_area = Rect {
        x: area.width.saturating_sub(dialog_width) / 2,
        y: area.height.saturating_sub(dialog_height) / 2,
        width: dialog_width,
        height: dialog_height,
    };

    frame.render_widget(Clear, dialog_area);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(" Join Game ")
            .border_style(Style::default().fg(Color::Cyan)),
        dialog_area,
    );

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Enter room code:",
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            format!("{}_", room_code),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter: Join  Ctrl+V: Paste  Esc: Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        dialog_area.inner(ratatui::layout::Margin::new(1, 1)),
    );
}

/// Render the host's waiting screen with the shareable room code
pub fn render_waiting_for_connection(
    frame: &mut Frame,
    room_code: &str,
    copy_feedback: &str,
    overlay: Option<&OverlayMessage>,
) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Rgb(0, 0, 0))),
        area,
    );

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Hosting a game",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Share this room code:",
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            room_code.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Waiting for opponent to connect...",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            copy_feedback.to_string(),
            Style::default().fg(Color::Green),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "C: Copy code  Q: Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let centered = centered_block(area, 44, text.len() as u16 + 2);
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        centered,
    );

    if let Some(message) = overlay {
        render_overlay(frame, message, area);
    }
}

/// Render the guest's connecting screen
pub fn render_connecting_to_peer(
    frame: &mut Frame,
    room_code: &str,
    overlay: Option<&OverlayMessage>,
) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Rgb(0, 0, 0))),
        area,
    );

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Joining a game",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("Connecting to room {}...", room_code),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Q: Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let centered = centered_block(area, 44, text.len() as u16 + 2);
    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        centered,
    );

    if let Some(message) = overlay {
        render_overlay(frame, message, area);
    }
}

fn centered_block(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}
