//! # InputBox Component
//!
//! Single-line text entry used by the chat panel, plus the `TextField` editing
//! core it shares with the upload form's path and title fields.
//!
//! ## State Management
//!
//! The buffer and cursor are internal state. The cursor is a byte offset that
//! always sits on a char boundary. When the text is wider than the box, the view
//! scrolls horizontally so the cursor stays visible.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// Border (2) + padding (2) consumed horizontally by the bordered block.
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Height of a bordered single-line field.
pub const FIELD_HEIGHT: u16 = 3;
const PLACEHOLDER: &str = "Type your message...";

fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// Editable single-line text with a cursor.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TextField {
    buffer: String,
    /// Byte offset into `buffer`.
    cursor: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor = self.buffer.len();
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Take the text out, leaving the field empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Apply an editing event. Returns true if the event was consumed.
    pub fn edit(&mut self, event: &TuiEvent) -> bool {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                true
            }
            TuiEvent::Paste(text) => {
                // Single line: pasted newlines become spaces
                let line = text.replace(['\r', '\n'], " ");
                self.buffer.insert_str(self.cursor, &line);
                self.cursor += line.len();
                true
            }
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                true
            }
            TuiEvent::Delete => {
                if self.cursor >= self.buffer.len() {
                    return false;
                }
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                true
            }
            TuiEvent::CursorLeft => {
                if self.cursor == 0 {
                    return false;
                }
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                true
            }
            TuiEvent::CursorRight => {
                if self.cursor >= self.buffer.len() {
                    return false;
                }
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                true
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                true
            }
            TuiEvent::CursorEnd => {
                self.cursor = self.buffer.len();
                true
            }
            _ => false,
        }
    }

    /// The slice of text visible in `width` columns and the cursor column within it.
    ///
    /// Leading characters are dropped until the cursor fits.
    pub fn visible(&self, width: u16) -> (&str, u16) {
        let width = usize::from(width);
        if width == 0 {
            return ("", 0);
        }
        let mut start = 0;
        let mut cursor_col = self.buffer[..self.cursor].width();
        while cursor_col >= width && start < self.cursor {
            let c = self.buffer[start..].chars().next().unwrap_or_default();
            cursor_col -= c.width().unwrap_or(0);
            start += c.len_utf8();
        }
        (&self.buffer[start..], cursor_col as u16)
    }

    /// Render as a bordered field. The cursor is only placed when focused.
    pub fn render_field(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        placeholder: &str,
        focused: bool,
    ) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(title.to_string())
            .padding(Padding::horizontal(1));

        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let (visible, cursor_col) = self.visible(inner_width);

        let paragraph = if self.buffer.is_empty() {
            Paragraph::new(placeholder.to_string()).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )
        } else {
            Paragraph::new(visible.to_string()).style(Style::default().fg(Color::Green))
        };
        frame.render_widget(paragraph.block(block), area);

        if focused && area.height >= FIELD_HEIGHT && inner_width > 0 {
            frame.set_cursor_position((area.x + 2 + cursor_col, area.y + 1));
        }
    }
}

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// User submitted non-blank text (Enter pressed)
    Submit(String),
    ContentChanged,
}

/// Message composer at the bottom of the chat panel.
pub struct InputBox {
    pub field: TextField,
    /// Whether keyboard focus is on the box (Prop)
    pub focused: bool,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            field: TextField::new(),
            focused: false,
        }
    }

    pub fn buffer(&self) -> &str {
        self.field.text()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.field
            .render_field(frame, area, "Message", PLACEHOLDER, self.focused);
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Submit => {
                if self.field.is_blank() {
                    return None;
                }
                Some(InputEvent::Submit(self.field.take()))
            }
            _ => self.field.edit(event).then_some(InputEvent::ContentChanged),
        }
    }
}
