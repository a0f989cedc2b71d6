//! # ConversationList Component
//!
//! "Previous Conversations" sidebar. The first row is always "+ New conversation";
//! the rest are the server's conversations in list order, each with its creation
//! date when known. The conversation shown in the chat panel is marked, and a
//! separate cursor moves with the arrow keys while the list has focus.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `ConversationListState` lives in `TuiState`
//! - `ConversationList` is created each frame with borrowed state

use chrono::{DateTime, NaiveDateTime};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding};

use crate::api::Conversation;
use crate::tui::component::Component;
use crate::tui::components::truncate_str;
use crate::tui::event::TuiEvent;

const TITLE: &str = " Previous Conversations ";
const EMPTY: &str = "No conversations yet";
const NEW_ROW: &str = "+ New conversation";
/// Width of a formatted date ("Aug 01") plus its gap.
const DATE_COLUMN: usize = 8;

/// Events emitted by the conversation list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent {
    Select(i64),
    New,
}

/// Persistent cursor state. Row 0 is the "new conversation" row.
#[derive(Default)]
pub struct ConversationListState {
    pub cursor: usize,
    pub list_state: ListState,
}

impl ConversationListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key event while the list has focus.
    pub fn handle_event(
        &mut self,
        event: &TuiEvent,
        conversations: &[Conversation],
    ) -> Option<ListEvent> {
        let rows = conversations.len() + 1;
        self.cursor = self.cursor.min(rows - 1);
        match event {
            TuiEvent::CursorUp => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            TuiEvent::CursorDown => {
                self.cursor = (self.cursor + 1).min(rows - 1);
                None
            }
            TuiEvent::CursorHome => {
                self.cursor = 0;
                None
            }
            TuiEvent::CursorEnd => {
                self.cursor = rows - 1;
                None
            }
            TuiEvent::Submit => match self.cursor {
                0 => Some(ListEvent::New),
                i => conversations.get(i - 1).map(|c| ListEvent::Select(c.id)),
            },
            _ => None,
        }
    }

    /// Put the cursor on the given conversation (or the "new" row for `None`).
    pub fn follow(&mut self, selected: Option<i64>, conversations: &[Conversation]) {
        self.cursor = selected
            .and_then(|id| conversations.iter().position(|c| c.id == id))
            .map_or(0, |i| i + 1);
    }
}

/// Format a server timestamp as "Jan 15". Accepts RFC 3339 or a naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` timestamp; anything else yields `None`.
pub fn format_date(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%b %d").to_string());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|dt| dt.format("%b %d").to_string())
}

/// Transient render wrapper for the sidebar.
pub struct ConversationList<'a> {
    state: &'a mut ConversationListState,
    conversations: &'a [Conversation],
    selected: Option<i64>,
    focused: bool,
}

impl<'a> ConversationList<'a> {
    pub fn new(
        state: &'a mut ConversationListState,
        conversations: &'a [Conversation],
        selected: Option<i64>,
        focused: bool,
    ) -> Self {
        Self {
            state,
            conversations,
            selected,
            focused,
        }
    }

    fn row(&self, conversation: &Conversation, width: usize) -> ListItem<'static> {
        let is_current = self.selected == Some(conversation.id);
        let style = if is_current {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let title = if conversation.title.is_empty() {
            format!("Conversation #{}", conversation.id)
        } else {
            conversation.title.clone()
        };
        let date = conversation
            .created_at
            .as_deref()
            .and_then(format_date)
            .unwrap_or_default();

        let title_width = width.saturating_sub(DATE_COLUMN);
        let title = truncate_str(&title, title_width);
        let padded = format!("{:<title_width$}", title);

        ListItem::new(Line::from(vec![
            Span::styled(padded, style),
            Span::styled(format!("  {date}"), Style::default().fg(Color::DarkGray)),
        ]))
    }
}

impl Component for ConversationList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(TITLE)
            .padding(Padding::horizontal(1));

        let inner_width = block.inner(area).width as usize;

        let new_style = if self.selected.is_none() {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        let mut items = vec![ListItem::new(Line::styled(NEW_ROW, new_style))];

        if self.conversations.is_empty() {
            items.push(ListItem::new(Line::styled(
                EMPTY,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        } else {
            items.extend(
                self.conversations
                    .iter()
                    .map(|c| self.row(c, inner_width)),
            );
        }

        let rows = self.conversations.len() + 1;
        self.state.cursor = self.state.cursor.min(rows - 1);
        self.state
            .list_state
            .select(self.focused.then_some(self.state.cursor));

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
