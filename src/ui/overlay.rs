// Overlay message system for displaying centered text on screen

use ratatui::{
    layout::{Alignment, Margin, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// A message displayed in a box in the center of the screen
#[derive(Debug, Clone)]
pub struct OverlayMessage {
    pub lines: Vec<String>,
    pub style: OverlayStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayStyle {
    Info,
    Error,
    Success,
}

impl OverlayMessage {
    pub fn info(lines: Vec<String>) -> Self {
        Self {
            lines,
            style: OverlayStyle::Info,
        }
    }

    pub fn error(lines: Vec<String>) -> Self {
        Self {
            lines,
            style: OverlayStyle::Error,
        }
    }

    pub fn success(lines: Vec<String>) -> Self {
        Self {
            lines,
            style: OverlayStyle::Success,
        }
    }

    fn border_color(&self) -> Color {
        match self.style {
            OverlayStyle::Info => Color::Cyan,
            OverlayStyle::Error => Color::Red,
            OverlayStyle::Success => Color::Green,
        }
    }

    fn text_color(&self) -> Color {
        match self.style {
            OverlayStyle::Info => Color::White,
            OverlayStyle::Error => Color::LightRed,
            OverlayStyle::Success => Color::LightGreen,
        }
    }
}

/// Render an overlay message centered in `area`
pub fn render_overlay(frame: &mut Frame, message: &OverlayMessage, area: Rect) {
    let widest = message.lines.iter().map(|l| l.len()).max().unwrap_or(0) as u16;
    let width = (widest + 6).min(area.width.saturating_sub(4));
    let height = (message.lines.len() as u16 + 4).min(area.height.saturating_sub(2));

    let overlay_area = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, overlay_area);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(message.border_color()))
            .style(Style::default().bg(Color::Rgb(20, 20, 20))),
        overlay_area,
    );

    let text: Vec<Line> = message
        .lines
        .iter()
        .map(|line| {
            Line::from(Span::styled(
                line.clone(),
                Style::default().fg(message.text_color()),
            ))
        })
        .collect();

    frame.render_widget(
        Paragraph::new(text).alignment(Alignment::Center),
        overlay_area.inner(Margin::new(2, 1)),
    );
}
