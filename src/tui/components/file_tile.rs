//! # FileTile Component
//!
//! One uploaded file as a small bordered tile. Active files get a blue border,
//! inactive ones gray; a tile whose update is still in flight is dimmed.
//! `FileStrip` lays the tiles of a conversation out in a single row.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::api::UploadedFile;

/// Tiles never grow wider than this, long names are cut.
const MAX_TILE_WIDTH: u16 = 28;
/// Borders plus one column of padding each side.
const TILE_OVERHEAD: u16 = 4;
/// Height of the strip: one line of text inside a border.
pub const STRIP_HEIGHT: u16 = 3;

#[derive(Clone, Copy)]
pub struct FileTile<'a> {
    pub file: &'a UploadedFile,
    pub is_selected: bool,
    pub is_updating: bool,
}

impl<'a> FileTile<'a> {
    pub fn width(file: &UploadedFile) -> u16 {
        let name = file.filename.width().min(u16::MAX as usize) as u16;
        (name + TILE_OVERHEAD).min(MAX_TILE_WIDTH)
    }

    fn border_style(&self) -> Style {
        let mut style = if self.file.active {
            Style::default().fg(Color::Blue)
        } else {
            Style::default().fg(Color::Gray)
        };
        if self.is_selected {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.is_updating {
            style = style.add_modifier(Modifier::DIM);
        }
        style
    }
}

impl Widget for FileTile<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_type = if self.is_selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        };
        let block = Block::bordered()
            .border_type(border_type)
            .border_style(self.border_style());

        let mut text_style = Style::default();
        if self.is_updating {
            text_style = text_style.add_modifier(Modifier::DIM);
        }

        Paragraph::new(self.file.filename.as_str())
            .style(text_style)
            .block(block)
            .centered()
            .render(area, buf);
    }
}

/// A row of file tiles, left-aligned; tiles past the right edge are not drawn.
pub struct FileStrip<'a> {
    pub files: &'a [UploadedFile],
    pub selected: Option<usize>,
    pub is_updating: &'a dyn Fn(i64) -> bool,
}

impl Widget for FileStrip<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let widths = self
            .files
            .iter()
            .map(|f| Constraint::Length(FileTile::width(f)))
            .chain(std::iter::once(Constraint::Fill(1)));
        let areas = Layout::horizontal(widths).spacing(1).split(area);

        for (i, file) in self.files.iter().enumerate() {
            let tile_area = areas[i];
            if tile_area.width < TILE_OVERHEAD {
                break;
            }
            FileTile {
                file,
                is_selected: self.selected == Some(i),
                is_updating: (self.is_updating)(file.id),
            }
            .render(tile_area, buf);
        }
    }
}
