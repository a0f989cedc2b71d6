//! # ChatPanel Component
//!
//! The selected conversation: its title, a strip of uploaded file tiles, and a
//! scrollable history of prompts with their responses and ratings. Messages still
//! being sent appear at the bottom as pending entries.
//!
//! ## Architecture
//!
//! `ChatPanel` is a transient component (created each frame) that wraps
//! `&'a mut ChatPanelState` (persistent state) and the conversation (props).
//! Entry heights are measured during the render pass and cached in the state so
//! keyboard selection can scroll an entry into view between frames.
//!
//! The panel never changes a conversation itself. Rating keys and file toggles come
//! back as `HistoryEvent`s and file indices for the event loop to dispatch.

use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::{Conversation, Rating};
use crate::core::state::PendingPrompt;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::file_tile::{FileStrip, STRIP_HEIGHT};
use crate::tui::components::prompt_entry::{HistoryEntry, PromptEntry};
use crate::tui::components::rating::rating_for_key;
use crate::tui::event::TuiEvent;

const EMPTY_HISTORY: &str = "No messages yet. Ask a question about your files below.";

/// Prompts in server order followed by this conversation's pending messages.
pub fn history_entries<'a>(
    conversation: &'a Conversation,
    pending: impl Iterator<Item = &'a PendingPrompt>,
) -> Vec<HistoryEntry<'a>> {
    conversation
        .prompts
        .iter()
        .map(HistoryEntry::Sent)
        .chain(pending.map(HistoryEntry::Pending))
        .collect()
}

/// Events emitted by the history view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HistoryEvent {
    /// Rate the entry at `index` of the history.
    Rate { index: usize, rating: Rating },
}

/// Scroll and selection state for the chat panel.
/// Must be persisted in the parent TuiState.
pub struct ChatPanelState {
    pub scroll_state: ScrollViewState,
    /// Heights of history entries as of the last render
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Selected history entry (keyboard navigation)
    pub selected_index: Option<usize>,
    /// Selected file tile
    pub selected_file: usize,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Conversation the cached layout belongs to
    conversation_id: Option<i64>,
}

impl Default for ChatPanelState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatPanelState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            stick_to_bottom: true,
            selected_index: None,
            selected_file: 0,
            viewport_height: 0,
            conversation_id: None,
        }
    }

    /// Forget scroll, selection and layout when a different conversation is shown.
    fn sync_conversation(&mut self, conversation_id: i64) {
        if self.conversation_id != Some(conversation_id) {
            *self = Self::new();
            self.conversation_id = Some(conversation_id);
        }
    }

    fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the viewport so the selected entry is fully visible.
    /// If the entry is taller than the viewport, align its top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        if idx >= self.prefix_heights.len() {
            return;
        }

        let item_top = if idx == 0 {
            0
        } else {
            self.prefix_heights[idx - 1]
        };
        let item_bottom = self.prefix_heights[idx];
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y || item_bottom - item_top > self.viewport_height {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y.saturating_add(self.viewport_height) {
            let new_y = item_bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            let max_y = self.total_height().saturating_sub(self.viewport_height);
            self.stick_to_bottom = new_y >= max_y;
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    fn select_prev(&mut self) {
        let count = self.heights.len();
        if count == 0 {
            return;
        }
        self.selected_index = Some(match self.selected_index {
            Some(i) => i.saturating_sub(1),
            None => count - 1,
        });
        self.scroll_to_selected();
    }

    fn select_next(&mut self) {
        let count = self.heights.len();
        if let Some(i) = self.selected_index
            && i + 1 < count
        {
            self.selected_index = Some(i + 1);
            self.scroll_to_selected();
        }
    }

    /// Move the file cursor or toggle a file. Returns the index of the file to toggle.
    pub fn handle_file_event(&mut self, event: &TuiEvent, file_count: usize) -> Option<usize> {
        if file_count == 0 {
            return None;
        }
        self.selected_file = self.selected_file.min(file_count - 1);
        match event {
            TuiEvent::CursorLeft => {
                self.selected_file = self.selected_file.saturating_sub(1);
                None
            }
            TuiEvent::CursorRight => {
                self.selected_file = (self.selected_file + 1).min(file_count - 1);
                None
            }
            TuiEvent::InputChar(' ') | TuiEvent::Submit => Some(self.selected_file),
            _ => None,
        }
    }
}

/// Scrolling, prompt selection and rating keys. Scroll events are handled
/// regardless of focus; the rest only while the history has focus.
impl EventHandler for ChatPanelState {
    type Event = HistoryEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
                None
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
                None
            }
            TuiEvent::CursorUp => {
                self.select_prev();
                None
            }
            TuiEvent::CursorDown => {
                self.select_next();
                None
            }
            TuiEvent::InputChar(c) => {
                let index = self.selected_index?;
                let rating = rating_for_key(*c)?;
                Some(HistoryEvent::Rate { index, rating })
            }
            _ => None,
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct ChatPanel<'a> {
    pub state: &'a mut ChatPanelState,
    pub conversation: &'a Conversation,
    pub entries: Vec<HistoryEntry<'a>>,
    pub updating_files: &'a HashSet<i64>,
    pub history_focused: bool,
    pub files_focused: bool,
}

impl<'a> ChatPanel<'a> {
    pub fn new(
        state: &'a mut ChatPanelState,
        conversation: &'a Conversation,
        pending: impl Iterator<Item = &'a PendingPrompt>,
        updating_files: &'a HashSet<i64>,
    ) -> Self {
        Self {
            state,
            conversation,
            entries: history_entries(conversation, pending),
            updating_files,
            history_focused: false,
            files_focused: false,
        }
    }

    pub fn focus(mut self, history_focused: bool, files_focused: bool) -> Self {
        self.history_focused = history_focused;
        self.files_focused = files_focused;
        self
    }

    fn render_history(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar

        self.state.heights = self
            .entries
            .iter()
            .map(|entry| PromptEntry::calculate_height(entry, content_width))
            .collect();
        self.state.rebuild_prefix_heights();
        self.state.viewport_height = area.height;

        if let Some(i) = self.state.selected_index
            && i >= self.entries.len()
        {
            self.state.selected_index = self.entries.len().checked_sub(1);
        }

        if self.entries.is_empty() {
            frame.render_widget(
                Paragraph::new(EMPTY_HISTORY).style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
                area,
            );
            return;
        }

        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let total_height = self.state.total_height();
        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset = 0u16;
        for (i, entry) in self.entries.iter().enumerate() {
            let height = self.state.heights[i];
            let is_selected = self.history_focused && self.state.selected_index == Some(i);
            scroll_view.render_widget(
                PromptEntry::new(*entry, is_selected),
                Rect::new(0, y_offset, content_width, height),
            );
            y_offset = y_offset.saturating_add(height);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl<'a> Component for ChatPanel<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.sync_conversation(self.conversation.id);

        let title = if self.conversation.title.is_empty() {
            format!(" Conversation #{} ", self.conversation.id)
        } else {
            format!(" {} ", self.conversation.title)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let files = &self.conversation.files;
        let strip_height = if files.is_empty() { 0 } else { STRIP_HEIGHT };
        let [strip_area, history_area] =
            Layout::vertical([Constraint::Length(strip_height), Constraint::Min(0)]).areas(inner);

        if !files.is_empty() {
            self.state.selected_file = self.state.selected_file.min(files.len() - 1);
            let updating = self.updating_files;
            frame.render_widget(
                FileStrip {
                    files,
                    selected: self.files_focused.then_some(self.state.selected_file),
                    is_updating: &|id| updating.contains(&id),
                },
                strip_area,
            );
        }

        self.render_history(frame, history_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PromptResponse;
    use crate::test_support::{buffer_text, conversation, prompt, uploaded_file};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn state_with_heights(heights: Vec<u16>, viewport: u16) -> ChatPanelState {
        let mut state = ChatPanelState::new();
        state.heights = heights;
        state.rebuild_prefix_heights();
        state.viewport_height = viewport;
        state
    }

    #[test]
    fn history_puts_pending_after_prompts() {
        let mut conv = conversation(1, "Sales");
        conv.prompts.push(prompt(10, "first"));
        let pending = PendingPrompt {
            local_id: 1,
            conversation_id: 1,
            content: "second".to_string(),
        };
        let entries = history_entries(&conv, std::iter::once(&pending));
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], HistoryEntry::Sent(p) if p.id == 10));
        assert!(matches!(entries[1], HistoryEntry::Pending(p) if p.local_id == 1));
    }

    #[test]
    fn cursor_up_starts_at_last_entry() {
        let mut state = state_with_heights(vec![5, 5, 5], 20);
        state.handle_event(&TuiEvent::CursorUp);
        assert_eq!(state.selected_index, Some(2));
        state.handle_event(&TuiEvent::CursorUp);
        assert_eq!(state.selected_index, Some(1));
        state.handle_event(&TuiEvent::CursorDown);
        state.handle_event(&TuiEvent::CursorDown);
        assert_eq!(state.selected_index, Some(2));
    }

    #[test]
    fn digit_rates_selected_entry() {
        let mut state = state_with_heights(vec![5, 5], 20);
        assert_eq!(state.handle_event(&TuiEvent::InputChar('4')), None);

        state.selected_index = Some(0);
        let event = state.handle_event(&TuiEvent::InputChar('4'));
        assert_eq!(
            event,
            Some(HistoryEvent::Rate {
                index: 0,
                rating: Rating::new(4).unwrap()
            })
        );
        assert_eq!(state.handle_event(&TuiEvent::InputChar('9')), None);
    }

    #[test]
    fn scroll_to_selected_brings_entry_into_view() {
        let mut state = state_with_heights(vec![10, 10, 10], 10);
        state.selected_index = Some(2);
        state.scroll_to_selected();
        assert_eq!(state.scroll_state.offset().y, 20);

        state.selected_index = Some(0);
        state.scroll_to_selected();
        assert_eq!(state.scroll_state.offset().y, 0);
        assert!(!state.stick_to_bottom);
    }

    #[test]
    fn file_cursor_is_clamped_and_toggles() {
        let mut state = ChatPanelState::new();
        assert_eq!(state.handle_file_event(&TuiEvent::CursorRight, 2), None);
        assert_eq!(state.handle_file_event(&TuiEvent::CursorRight, 2), None);
        assert_eq!(state.selected_file, 1);
        assert_eq!(state.handle_file_event(&TuiEvent::InputChar(' '), 2), Some(1));
        assert_eq!(state.handle_file_event(&TuiEvent::Submit, 0), None);
    }

    #[test]
    fn render_shows_title_files_and_history() {
        let mut conv = conversation(1, "Quarterly sales");
        conv.files.push(uploaded_file(5, "q1.csv", true));
        let mut p = prompt(10, "What is the total?");
        p.response = Some(PromptResponse::Text("It is 2,150.".to_string()));
        p.rating = Some(3);
        conv.prompts.push(p);

        let mut state = ChatPanelState::new();
        let updating = HashSet::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                ChatPanel::new(&mut state, &conv, std::iter::empty(), &updating)
                    .render(f, area);
            })
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Quarterly sales"));
        assert!(text.contains("q1.csv"));
        assert!(text.contains("What is the total?"));
        assert!(text.contains("It is 2,150."));
        assert_eq!(state.heights.len(), 1);
    }

    #[test]
    fn render_empty_history_shows_hint() {
        let conv = conversation(1, "Empty");
        let mut state = ChatPanelState::new();
        let updating = HashSet::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 12)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                ChatPanel::new(&mut state, &conv, std::iter::empty(), &updating)
                    .render(f, area);
            })
            .unwrap();
        assert!(buffer_text(terminal.backend().buffer()).contains("No messages yet"));
    }

    #[test]
    fn switching_conversation_resets_selection() {
        let conv_a = conversation(1, "A");
        let conv_b = conversation(2, "B");
        let mut state = ChatPanelState::new();
        let updating = HashSet::new();
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();

        terminal
            .draw(|f| {
                let area = f.area();
                ChatPanel::new(&mut state, &conv_a, std::iter::empty(), &updating)
                    .render(f, area);
            })
            .unwrap();
        state.selected_file = 3;
        state.stick_to_bottom = false;

        terminal
            .draw(|f| {
                let area = f.area();
                ChatPanel::new(&mut state, &conv_b, std::iter::empty(), &updating)
                    .render(f, area);
            })
            .unwrap();
        assert_eq!(state.selected_file, 0);
        assert!(state.stick_to_bottom);
    }
}
