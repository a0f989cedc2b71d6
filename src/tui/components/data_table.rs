//! # DataTable Component
//!
//! Renders a sequence of row records as a table.
//!
//! Columns come from the key set of the **first** row only, in wire order. Later
//! rows are laid out against that fixed column set: extra keys are ignored and
//! missing keys render as empty cells.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Cell, Paragraph, Row as TableRow, Table, Widget};
use serde_json::{Number, Value};
use unicode_width::UnicodeWidthStr;

use crate::api::Row;

/// Shown instead of a table when there are no rows.
pub const NO_DATA: &str = "No data available.";

/// Columns wider than this are truncated by the table layout.
const MAX_COLUMN_WIDTH: u16 = 30;
/// Fraction digits kept when formatting non-integer numbers.
const MAX_FRACTION_DIGITS: usize = 3;

/// Column names inferred from the first row.
pub fn infer_columns(rows: &[Row]) -> Vec<&str> {
    rows.first()
        .map(|row| row.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Header text: first character uppercased, the rest untouched.
pub fn header_label(column: &str) -> String {
    let mut chars = column.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cell text: numbers with digit grouping, null/absent as empty, nested
/// values as compact JSON, everything else as its plain string form.
pub fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Number(n)) => format_number(n),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => nested.to_string(),
    }
}

/// `1000` → `"1,000"`, `-1234567.891` → `"-1,234,567.891"`, `2.5` → `"2.5"`.
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return group_digits(&i.unsigned_abs().to_string(), i < 0, "");
    }
    if let Some(u) = n.as_u64() {
        return group_digits(&u.to_string(), false, "");
    }
    let f = n.as_f64().unwrap_or_default();
    let fixed = format!("{:.*}", MAX_FRACTION_DIGITS, f.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac = frac_part.trim_end_matches('0');
    // "-0" only when the rounded value is zero
    let nonzero = int_part.bytes().any(|b| b != b'0') || !frac.is_empty();
    group_digits(int_part, f < 0.0 && nonzero, frac)
}

/// Inserts a comma every three digits of `digits` (ASCII, no sign).
fn group_digits(digits: &str, negative: bool, fraction: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + fraction.len() + 2);
    if negative {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if !fraction.is_empty() {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

/// A stateless table widget over borrowed rows.
#[derive(Clone, Copy)]
pub struct DataTable<'a> {
    pub title: Option<&'a str>,
    pub rows: &'a [Row],
}

impl<'a> DataTable<'a> {
    pub fn new(title: Option<&'a str>, rows: &'a [Row]) -> Self {
        Self {
            title: title.filter(|t| !t.is_empty()),
            rows,
        }
    }

    /// Rendered height in lines: optional title, header, one line per row.
    pub fn height(&self) -> u16 {
        if self.rows.is_empty() {
            return 1;
        }
        let title = u16::from(self.title.is_some());
        let rows = u16::try_from(self.rows.len()).unwrap_or(u16::MAX);
        rows.saturating_add(1).saturating_add(title)
    }

    fn column_widths(&self, columns: &[&str]) -> Vec<Constraint> {
        columns
            .iter()
            .map(|column| {
                let header = header_label(column).width();
                let widest_cell = self
                    .rows
                    .iter()
                    .map(|row| format_cell(row.get(*column)).width())
                    .max()
                    .unwrap_or(0);
                let width = header.max(widest_cell).clamp(1, MAX_COLUMN_WIDTH as usize);
                Constraint::Length(width as u16)
            })
            .collect()
    }
}

impl Widget for DataTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.rows.is_empty() {
            Paragraph::new(NO_DATA)
                .style(Style::default().fg(Color::DarkGray))
                .render(area, buf);
            return;
        }

        let table_area = match self.title {
            Some(title) => {
                let [title_area, rest] =
                    Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
                Line::styled(title, Style::default().add_modifier(Modifier::BOLD))
                    .render(title_area, buf);
                rest
            }
            None => area,
        };

        let columns = infer_columns(self.rows);
        let widths = self.column_widths(&columns);

        let header = TableRow::new(
            columns
                .iter()
                .map(|c| Cell::from(header_label(c)))
                .collect::<Vec<_>>(),
        )
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let body = self.rows.iter().enumerate().map(|(i, row)| {
            let style = if i % 2 == 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            TableRow::new(
                columns
                    .iter()
                    .map(|c| Cell::from(format_cell(row.get(*c))))
                    .collect::<Vec<_>>(),
            )
            .style(style)
        });

        Widget::render(
            Table::new(body, widths).header(header).column_spacing(2),
            table_area,
            buf,
        );
    }
}
