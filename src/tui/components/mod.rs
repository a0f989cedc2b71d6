//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields and render it:
//! - `TitleBar`: top status line showing the server and status message
//! - `DataTable`, `JsonViewer`: response and file data renderers
//! - `RatingStars`, `FileTile`, `PromptEntry`: small building blocks of the chat panel
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state in `TuiState` and emit high-level events:
//! - `InputBox`: the message being composed
//! - `UploadForm`: the file buffer and title of a new upload
//! - `ConversationList`, `ChatPanel`: cursor, selection and scroll position
//! - `DataDisplay`: the "Active Files Data" overlay and its row count
//!
//! Stateful components follow the persistent state + transient wrapper pattern:
//! the `*State` struct lives across frames, the wrapper is built each frame with
//! borrowed state and props from `App`.
//!
//! Components never touch the network or `App` directly. They emit events which
//! the event loop turns into `Action`s.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs                (this file)
//! ├── title_bar.rs          (top status line)
//! ├── data_table.rs         (row records as a table)
//! ├── json_viewer.rs        (pretty JSON)
//! ├── rating.rs             (five-star rating row)
//! ├── file_tile.rs          (uploaded file tile + strip)
//! ├── prompt_entry.rs       (one prompt with its response)
//! ├── chat_panel.rs         (selected conversation view)
//! ├── conversation_list.rs  (previous conversations sidebar)
//! ├── data_display.rs       (active files overlay)
//! ├── upload_form.rs        (new conversation form)
//! └── input_box.rs          (single-line text entry)
//! ```

pub mod chat_panel;
pub mod conversation_list;
pub mod data_display;
pub mod data_table;
pub mod file_tile;
pub mod input_box;
pub mod json_viewer;
pub mod prompt_entry;
pub mod rating;
mod title_bar;
pub mod upload_form;

pub use chat_panel::{ChatPanel, ChatPanelState, HistoryEvent};
pub use conversation_list::{ConversationList, ConversationListState};
pub use data_display::{DataDisplay, DataDisplayEvent, DataDisplayState};
pub use input_box::{InputBox, InputEvent};
pub use title_bar::TitleBar;
pub use upload_form::{UploadEvent, UploadForm, UploadFormState};

use ratatui::layout::{Constraint, Layout, Rect};

/// Height of `text` once wrapped to `width` columns.
///
/// The wrapping options match Ratatui's `Paragraph` wrapping so the parent can
/// size a scroll canvas before rendering anything. Empty lines count as one row.
pub fn wrapped_height(text: &str, width: u16) -> u16 {
    if width == 0 {
        return 1;
    }
    let options = textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);

    let lines: usize = text
        .lines()
        .map(|line| textwrap::wrap(line, &options).len().max(1))
        .sum();
    lines.clamp(1, u16::MAX as usize) as u16
}

/// Compute a centered rect using percentage of the outer rect.
pub fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}

/// Truncate a string to fit within `max_width` columns, adding "..." if needed.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    if unicode_width::UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 3 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    out
}
