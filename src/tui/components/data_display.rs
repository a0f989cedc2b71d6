//! # DataDisplay Component
//!
//! "Active Files Data" overlay: every active file of the selected conversation
//! that carries parsed rows, each shown as a table cut to the applied row count.
//! Opened with Ctrl+D, dismissed with Esc.
//!
//! The row count is edited as a draft (`+`/`-` or digits) and only takes effect
//! when applied with Enter.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `DataDisplayState` lives in `TuiState` while the overlay is open
//! - `DataDisplay` is created each frame with borrowed state

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::UploadedFile;
use crate::tui::components::centered_rect;
use crate::tui::components::data_table::DataTable;
use crate::tui::event::TuiEvent;

const EMPTY: &str = "No active files to display.";
/// Drafts longer than this are not accepted.
const MAX_DRAFT_DIGITS: usize = 6;

/// Events emitted by the data display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataDisplayEvent {
    Dismiss,
}

/// Persistent state for the data overlay.
pub struct DataDisplayState {
    /// Row count being edited, as typed
    pub draft: String,
    /// Row count the tables are cut to
    pub applied: usize,
    pub scroll_state: ScrollViewState,
}

impl DataDisplayState {
    pub fn new(row_count: usize) -> Self {
        let row_count = row_count.max(1);
        Self {
            draft: row_count.to_string(),
            applied: row_count,
            scroll_state: ScrollViewState::default(),
        }
    }

    fn draft_value(&self) -> Option<usize> {
        self.draft.parse().ok().filter(|&n| n >= 1)
    }

    fn step(&mut self, delta: isize) {
        let current = self.draft_value().unwrap_or(self.applied);
        let next = current.saturating_add_signed(delta).max(1);
        self.draft = next.to_string();
    }

    /// Apply the draft. An empty or zero draft is rejected and reset.
    pub fn apply(&mut self) {
        match self.draft_value() {
            Some(n) => self.applied = n,
            None => self.draft = self.applied.to_string(),
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> Option<DataDisplayEvent> {
        match event {
            TuiEvent::Escape => return Some(DataDisplayEvent::Dismiss),
            TuiEvent::InputChar('+') | TuiEvent::CursorRight => self.step(1),
            TuiEvent::InputChar('-') | TuiEvent::CursorLeft => self.step(-1),
            TuiEvent::InputChar(c) if c.is_ascii_digit() => {
                if self.draft.len() < MAX_DRAFT_DIGITS {
                    self.draft.push(*c);
                }
            }
            TuiEvent::Backspace => {
                self.draft.pop();
            }
            TuiEvent::Submit => self.apply(),
            TuiEvent::ScrollUp | TuiEvent::CursorUp => self.scroll_state.scroll_up(),
            TuiEvent::ScrollDown | TuiEvent::CursorDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            _ => {}
        }
        None
    }
}

/// Transient render wrapper for the data overlay.
pub struct DataDisplay<'a> {
    state: &'a mut DataDisplayState,
    files: Vec<&'a UploadedFile>,
}

impl<'a> DataDisplay<'a> {
    pub fn new(
        state: &'a mut DataDisplayState,
        files: impl IntoIterator<Item = &'a UploadedFile>,
    ) -> Self {
        Self {
            state,
            files: files
                .into_iter()
                .filter(|f| f.has_display_data())
                .collect(),
        }
    }

    fn visible_rows(&self, file: &'a UploadedFile) -> &'a [crate::api::Row] {
        let rows = file.rows();
        &rows[..rows.len().min(self.state.applied)]
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let overlay = centered_rect(90, 85, area);
        frame.render_widget(Clear, overlay);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Active Files Data ")
            .title_alignment(Alignment::Left)
            .title_bottom(Line::from(" +/- Rows  Enter Apply  ↑/↓ Scroll  Esc Close ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(overlay);
        frame.render_widget(block, overlay);

        let [controls_area, body_area] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(inner);

        let pending = self.state.draft != self.state.applied.to_string();
        let mut controls = vec![
            Span::raw("Number of rows to display: "),
            Span::styled(
                format!("[{:>3}]", self.state.draft),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if pending {
            controls.push(Span::styled(
                "  Enter to apply",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        frame.render_widget(Line::from(controls), controls_area);

        if self.files.is_empty() {
            frame.render_widget(
                Paragraph::new(EMPTY).style(Style::default().fg(Color::DarkGray)),
                body_area,
            );
            return;
        }

        let content_width = body_area.width.saturating_sub(1);
        let sections: Vec<(&UploadedFile, DataTable)> = self
            .files
            .iter()
            .map(|file| (*file, DataTable::new(None, self.visible_rows(file))))
            .collect();
        // filename line + table + blank spacer
        let total_height: u16 = sections
            .iter()
            .map(|(_, table)| table.height().saturating_add(2))
            .fold(0, u16::saturating_add);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y = 0u16;
        for (file, table) in sections {
            scroll_view.render_widget(
                Line::styled(
                    file.filename.clone(),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                ),
                Rect::new(0, y, content_width, 1),
            );
            let height = table.height();
            scroll_view.render_widget(table, Rect::new(0, y + 1, content_width, height));
            y = y.saturating_add(height + 2);
        }

        frame.render_stateful_widget(scroll_view, body_area, &mut self.state.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, uploaded_file};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(state: &mut DataDisplayState, files: &[UploadedFile]) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                DataDisplay::new(state, files).render(f, area);
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn draft_only_applies_on_enter() {
        let mut state = DataDisplayState::new(10);
        state.handle_event(&TuiEvent::InputChar('+'));
        assert_eq!(state.draft, "11");
        assert_eq!(state.applied, 10);

        state.handle_event(&TuiEvent::Submit);
        assert_eq!(state.applied, 11);
    }

    #[test]
    fn draft_never_goes_below_one() {
        let mut state = DataDisplayState::new(1);
        state.handle_event(&TuiEvent::InputChar('-'));
        assert_eq!(state.draft, "1");
    }

    #[test]
    fn typed_digits_replace_count() {
        let mut state = DataDisplayState::new(10);
        state.handle_event(&TuiEvent::Backspace);
        state.handle_event(&TuiEvent::Backspace);
        state.handle_event(&TuiEvent::InputChar('2'));
        state.handle_event(&TuiEvent::Submit);
        assert_eq!(state.applied, 2);
    }

    #[test]
    fn invalid_draft_is_reset_on_apply() {
        let mut state = DataDisplayState::new(5);
        state.handle_event(&TuiEvent::Backspace);
        state.handle_event(&TuiEvent::InputChar('0'));
        state.handle_event(&TuiEvent::Submit);
        assert_eq!(state.applied, 5);
        assert_eq!(state.draft, "5");
    }

    #[test]
    fn escape_dismisses() {
        let mut state = DataDisplayState::new(10);
        assert_eq!(
            state.handle_event(&TuiEvent::Escape),
            Some(DataDisplayEvent::Dismiss)
        );
    }

    #[test]
    fn shows_only_active_files_cut_to_applied_rows() {
        let files = vec![
            uploaded_file(1, "active.csv", true),
            uploaded_file(2, "inactive.csv", false),
        ];
        let mut state = DataDisplayState::new(1);
        let text = render(&mut state, &files);
        assert!(text.contains("Active Files Data"));
        assert!(text.contains("active.csv"));
        assert!(!text.contains("inactive.csv"));
        assert!(text.contains("north"));
        assert!(!text.contains("south"));
    }

    #[test]
    fn no_active_files_placeholder() {
        let files = vec![uploaded_file(2, "inactive.csv", false)];
        let mut state = DataDisplayState::new(10);
        assert!(render(&mut state, &files).contains(EMPTY));
    }
}
