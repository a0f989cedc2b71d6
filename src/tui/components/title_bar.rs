//! # TitleBar Component
//!
//! Top status line: `File Chat (server: <url>) | <status>`, with a count of
//! requests still in flight appended when there are any.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    pub base_url: String,
    pub status_message: String,
    /// Backend calls that have not completed yet.
    pub in_flight: usize,
}

impl TitleBar {
    pub fn new(base_url: String, status_message: String, in_flight: usize) -> Self {
        Self {
            base_url,
            status_message,
            in_flight,
        }
    }

    fn text(&self) -> String {
        let mut text = format!("File Chat (server: {})", self.base_url);
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(self.text())];
        if self.in_flight > 0 {
            spans.push(Span::styled(
                format!(" | {} pending", self.in_flight),
                Style::default().fg(Color::Yellow),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }
}
