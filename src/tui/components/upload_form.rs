//! # UploadForm Component
//!
//! Shown in place of the chat panel when no conversation is selected. The user
//! types a file path and presses Enter to add it to the batch, optionally gives
//! the new conversation a title, and submits with Ctrl+U (or Enter on the title).
//!
//! The form keeps the batch locally until submit. Submitting hands the whole batch
//! to the event loop and clears the form at once, before the server answers.
//! Submit does nothing while the batch is empty.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `UploadFormState` lives in `TuiState`
//! - `UploadForm` is created each frame with borrowed state

use std::path::{Path, PathBuf};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph};

use crate::api::{ACCEPTED_EXTENSIONS, is_accepted_upload};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::input_box::{FIELD_HEIGHT, TextField};
use crate::tui::components::truncate_str;
use crate::tui::event::TuiEvent;

const ACCEPTED_COPY: &str = "CSV, XLS, XLSX (MAX. 10MB)";

/// Which part of the form receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadField {
    #[default]
    Path,
    Title,
    Files,
}

/// Events emitted by the upload form.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Submit {
        paths: Vec<PathBuf>,
        title: Option<String>,
    },
}

/// Persistent state for the upload form.
#[derive(Default)]
pub struct UploadFormState {
    pub path: TextField,
    pub title: TextField,
    pub files: Vec<PathBuf>,
    pub field: UploadField,
    /// Cursor in the files list
    pub selected: usize,
    /// Why the last path was not added
    pub notice: Option<String>,
    list_state: ListState,
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    if raw == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(raw));
    }
    if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

/// Check that a path can be uploaded: an existing file with an accepted extension.
pub fn validate_upload_path(path: &Path) -> Result<(), String> {
    if !is_accepted_upload(path) {
        return Err(format!(
            "{}: only {} files are accepted",
            path.display(),
            ACCEPTED_EXTENSIONS.join(", ")
        ));
    }
    if !path.is_file() {
        return Err(format!("{}: no such file", path.display()));
    }
    Ok(())
}

impl UploadFormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_submit(&self) -> bool {
        !self.files.is_empty()
    }

    /// Add the typed path to the batch if it is valid.
    fn add_path(&mut self) {
        if self.path.is_blank() {
            return;
        }
        let path = expand_path(self.path.text());
        match validate_upload_path(&path) {
            Ok(()) => {
                log::debug!("Upload batch: added {}", path.display());
                self.files.push(path);
                self.path.clear();
                self.notice = None;
            }
            Err(reason) => self.notice = Some(reason),
        }
    }

    fn remove_selected(&mut self) {
        if self.selected < self.files.len() {
            self.files.remove(self.selected);
        }
        if self.files.is_empty() {
            self.selected = 0;
            self.field = UploadField::Path;
        } else {
            self.selected = self.selected.min(self.files.len() - 1);
        }
    }

    fn submit(&mut self) -> Option<UploadEvent> {
        if !self.can_submit() {
            return None;
        }
        let title = self.title.take();
        let title = (!title.trim().is_empty()).then(|| title.trim().to_string());
        let paths = std::mem::take(&mut self.files);
        self.path.clear();
        self.selected = 0;
        self.field = UploadField::Path;
        self.notice = None;
        Some(UploadEvent::Submit { paths, title })
    }

    fn move_down(&mut self) {
        match self.field {
            UploadField::Path => self.field = UploadField::Title,
            UploadField::Title if !self.files.is_empty() => self.field = UploadField::Files,
            UploadField::Title => {}
            UploadField::Files => {
                self.selected = (self.selected + 1).min(self.files.len().saturating_sub(1));
            }
        }
    }

    fn move_up(&mut self) {
        match self.field {
            UploadField::Path => {}
            UploadField::Title => self.field = UploadField::Path,
            UploadField::Files if self.selected > 0 => self.selected -= 1,
            UploadField::Files => self.field = UploadField::Title,
        }
    }
}

impl EventHandler for UploadFormState {
    type Event = UploadEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match (self.field, event) {
            (_, TuiEvent::SubmitUpload) => self.submit(),
            (_, TuiEvent::CursorDown) => {
                self.move_down();
                None
            }
            (_, TuiEvent::CursorUp) => {
                self.move_up();
                None
            }
            (UploadField::Path, TuiEvent::Submit) => {
                self.add_path();
                None
            }
            (UploadField::Title, TuiEvent::Submit) => self.submit(),
            (UploadField::Files, TuiEvent::Delete | TuiEvent::Backspace) => {
                self.remove_selected();
                None
            }
            (UploadField::Path, _) => {
                if self.path.edit(event) {
                    self.notice = None;
                }
                None
            }
            (UploadField::Title, _) => {
                self.title.edit(event);
                None
            }
            (UploadField::Files, _) => None,
        }
    }
}

/// Transient render wrapper for the upload form.
pub struct UploadForm<'a> {
    state: &'a mut UploadFormState,
    focused: bool,
}

impl<'a> UploadForm<'a> {
    pub fn new(state: &'a mut UploadFormState, focused: bool) -> Self {
        Self { state, focused }
    }

    fn render_files(&mut self, frame: &mut Frame, area: Rect) {
        let files_focused = self.focused && self.state.field == UploadField::Files;
        let width = area.width.saturating_sub(4) as usize;

        let items: Vec<ListItem> = if self.state.files.is_empty() {
            vec![ListItem::new(Line::styled(
                "No files selected.",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))]
        } else {
            self.state
                .files
                .iter()
                .map(|path| {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string());
                    ListItem::new(truncate_str(&name, width))
                })
                .collect()
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(if files_focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default().fg(Color::DarkGray)
            })
            .title(format!(" Selected files ({}) ", self.state.files.len()))
            .title_bottom(Line::from(" Del Remove ").right_aligned())
            .padding(Padding::horizontal(1));

        self.state.list_state.select(
            (files_focused && !self.state.files.is_empty()).then_some(self.state.selected),
        );
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::REVERSED),
        );
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

impl Component for UploadForm<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" New conversation ")
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [intro_area, path_area, notice_area, title_area, files_area, submit_area] =
            Layout::vertical([
                Constraint::Length(2),
                Constraint::Length(FIELD_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(FIELD_HEIGHT),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .areas(inner);

        frame.render_widget(
            Paragraph::new(vec![
                Line::from("Upload files to start a conversation."),
                Line::styled(ACCEPTED_COPY, Style::default().fg(Color::DarkGray)),
            ]),
            intro_area,
        );

        let field = self.state.field;
        self.state.path.render_field(
            frame,
            path_area,
            " File path (Enter to add) ",
            "~/data/sales.csv",
            self.focused && field == UploadField::Path,
        );

        if let Some(notice) = &self.state.notice {
            frame.render_widget(
                Line::styled(notice.as_str(), Style::default().fg(Color::Red)),
                notice_area,
            );
        }

        self.state.title.render_field(
            frame,
            title_area,
            " Title (optional) ",
            "Untitled",
            self.focused && field == UploadField::Title,
        );

        self.render_files(frame, files_area);

        let submit_style = if self.state.can_submit() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(
            Paragraph::new(Line::from(vec![Span::styled(
                " Upload Files (Ctrl+U) ",
                submit_style,
            )]))
            .alignment(Alignment::Center),
            submit_area,
        );
    }
}
