//! Pretty-printed JSON block for `json` responses.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Paragraph, Widget, Wrap};
use serde_json::Value;

#[derive(Clone, Copy)]
pub struct JsonViewer<'a> {
    pub json: &'a Value,
}

impl<'a> JsonViewer<'a> {
    pub fn new(json: &'a Value) -> Self {
        Self { json }
    }

    /// Two-space indented JSON, matching `JSON.stringify(value, null, 2)`.
    pub fn pretty(json: &Value) -> String {
        serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
    }

    pub fn height(json: &Value, width: u16) -> u16 {
        super::wrapped_height(&Self::pretty(json), width)
    }
}

impl Widget for JsonViewer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(Self::pretty(self.json))
            .style(Style::default().fg(Color::LightCyan))
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pretty_uses_two_space_indent() {
        let pretty = JsonViewer::pretty(&json!({"a": {"b": 1}}));
        assert_eq!(pretty, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
    }

    #[test]
    fn height_counts_pretty_lines() {
        // 5 lines, all short enough not to wrap at width 40
        assert_eq!(JsonViewer::height(&json!({"a": {"b": 1}}), 40), 5);
    }
}
