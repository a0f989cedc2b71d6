//! # PromptEntry Component
//!
//! One row of chat history: the user's message in one bordered block, the
//! response (plus its rating row) in a second block below it.
//!
//! A `HistoryEntry` is either a prompt the server has stored or a local
//! placeholder for a message still being sent. Placeholders render the user block
//! as usual and a "sending…" response block with no rating row.
//!
//! Heights are predicted with the same wrapping rules the renderers use, so the
//! chat panel can size its scroll canvas without rendering first.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Padding, Paragraph, Widget, Wrap};

use crate::api::{NO_RESPONSE, Prompt, PromptResponse, Row, UNSUPPORTED_RESPONSE};
use crate::core::state::PendingPrompt;
use crate::tui::components::data_table::DataTable;
use crate::tui::components::json_viewer::JsonViewer;
use crate::tui::components::rating::RatingStars;
use crate::tui::components::wrapped_height;

/// Borders (2) + padding (2) consumed horizontally by each block.
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders.
const VERTICAL_OVERHEAD: u16 = 2;
const SENDING: &str = "sending…";
/// Rows a data response lays out inline; the rest collapse into one line.
const MAX_HISTORY_ROWS: usize = 200;

#[derive(Debug, Clone, Copy)]
pub enum HistoryEntry<'a> {
    Sent(&'a Prompt),
    Pending(&'a PendingPrompt),
}

impl<'a> HistoryEntry<'a> {
    pub fn content(&self) -> &'a str {
        match *self {
            HistoryEntry::Sent(prompt) => &prompt.content,
            HistoryEntry::Pending(pending) => &pending.content,
        }
    }

    pub fn prompt(&self) -> Option<&'a Prompt> {
        match *self {
            HistoryEntry::Sent(prompt) => Some(prompt),
            HistoryEntry::Pending(_) => None,
        }
    }
}

#[derive(Clone, Copy)]
pub struct PromptEntry<'a> {
    pub entry: HistoryEntry<'a>,
    pub is_selected: bool,
}

impl<'a> PromptEntry<'a> {
    pub fn new(entry: HistoryEntry<'a>, is_selected: bool) -> Self {
        Self { entry, is_selected }
    }

    fn user_height(entry: &HistoryEntry, inner_width: u16) -> u16 {
        wrapped_height(entry.content().trim(), inner_width).saturating_add(VERTICAL_OVERHEAD)
    }

    /// Lines taken by the response body, excluding borders and the rating row.
    fn body_height(entry: &HistoryEntry, inner_width: u16) -> u16 {
        let Some(prompt) = entry.prompt() else {
            return 1;
        };
        match &prompt.response {
            None | Some(PromptResponse::Unsupported(_)) => 1,
            Some(PromptResponse::Text(text)) => wrapped_height(text.trim(), inner_width),
            Some(PromptResponse::Data(rows)) => {
                let (shown, hidden) = Self::history_rows(rows);
                DataTable::new(Some(prompt.content.as_str()), shown)
                    .height()
                    .saturating_add(u16::from(hidden > 0))
            }
            Some(PromptResponse::Json(json)) => JsonViewer::height(json, inner_width),
        }
    }

    /// Rows shown inline and the count left out.
    fn history_rows(rows: &[Row]) -> (&[Row], usize) {
        let shown = rows.len().min(MAX_HISTORY_ROWS);
        (&rows[..shown], rows.len() - shown)
    }

    fn response_height(entry: &HistoryEntry, inner_width: u16) -> u16 {
        let rating_row = u16::from(entry.prompt().is_some());
        Self::body_height(entry, inner_width)
            .saturating_add(rating_row)
            .saturating_add(VERTICAL_OVERHEAD)
    }

    /// Total rendered height at `width`.
    pub fn calculate_height(entry: &HistoryEntry, width: u16) -> u16 {
        let inner_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if inner_width == 0 {
            return 1;
        }
        Self::user_height(entry, inner_width)
            .saturating_add(Self::response_height(entry, inner_width))
    }

    fn border_style(&self, base: Style) -> Style {
        if self.is_selected {
            Style::default().fg(Color::Cyan)
        } else {
            base.add_modifier(Modifier::DIM)
        }
    }

    fn render_body(prompt: &Prompt, area: Rect, buf: &mut Buffer) {
        let muted = Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC);
        match &prompt.response {
            None => Line::styled(NO_RESPONSE, muted).render(area, buf),
            Some(PromptResponse::Unsupported(_)) => {
                Line::styled(UNSUPPORTED_RESPONSE, muted).render(area, buf)
            }
            Some(PromptResponse::Text(text)) => Paragraph::new(text.trim())
                .wrap(Wrap { trim: true })
                .render(area, buf),
            Some(PromptResponse::Data(rows)) => {
                let (shown, hidden) = Self::history_rows(rows);
                let [table_area, more_area] = Layout::vertical([
                    Constraint::Min(0),
                    Constraint::Length(u16::from(hidden > 0)),
                ])
                .areas(area);
                DataTable::new(Some(prompt.content.as_str()), shown).render(table_area, buf);
                if hidden > 0 {
                    Line::styled(format!("… {hidden} more rows"), muted).render(more_area, buf);
                }
            }
            Some(PromptResponse::Json(json)) => JsonViewer::new(json).render(area, buf),
        }
    }
}

impl Widget for PromptEntry<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_width = area.width.saturating_sub(HORIZONTAL_OVERHEAD);
        let user_height = Self::user_height(&self.entry, inner_width);
        let [user_area, response_area] =
            Layout::vertical([Constraint::Length(user_height), Constraint::Min(0)]).areas(area);

        let user_style = Style::default().fg(Color::Green);
        Paragraph::new(self.entry.content().trim())
            .wrap(Wrap { trim: true })
            .style(user_style)
            .block(
                Block::bordered()
                    .title("you")
                    .border_style(self.border_style(user_style))
                    .padding(Padding::horizontal(1)),
            )
            .render(user_area, buf);

        let response_style = Style::default().fg(Color::Blue);
        let block = Block::bordered()
            .title("ai")
            .border_style(self.border_style(response_style))
            .padding(Padding::horizontal(1));
        let inner = block.inner(response_area);
        block.render(response_area, buf);

        match self.entry {
            HistoryEntry::Pending(_) => {
                Line::styled(
                    SENDING,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::ITALIC),
                )
                .render(inner, buf);
            }
            HistoryEntry::Sent(prompt) => {
                let [body_area, rating_area] =
                    Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
                Self::render_body(prompt, body_area, buf);
                RatingStars::new(prompt.rating, self.is_selected)
                    .line()
                    .render(rating_area, buf);
            }
        }
    }
}
