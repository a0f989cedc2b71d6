//! # Rating Component
//!
//! A row of five stars under each response. Pressing `1`..`5` while a prompt is
//! selected rates it; the fill shows every position at or below the current rating.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::api::Rating;

const STAR: &str = "★";

/// True if star `position` (1-based) is drawn filled for `rating`.
/// An unset rating fills nothing.
pub fn is_filled(position: u8, rating: Option<u8>) -> bool {
    rating.is_some_and(|r| position <= r)
}

/// Map a typed key to a rating, if it is one of `1`..`5`.
pub fn rating_for_key(c: char) -> Option<Rating> {
    c.to_digit(10)
        .and_then(|d| u8::try_from(d).ok())
        .and_then(Rating::new)
}

pub struct RatingStars {
    pub rating: Option<u8>,
    /// Whether the owning prompt is selected (shows the key hint).
    pub is_selected: bool,
}

impl RatingStars {
    pub fn new(rating: Option<u8>, is_selected: bool) -> Self {
        Self {
            rating,
            is_selected,
        }
    }

    pub fn line(&self) -> Line<'static> {
        let mut spans: Vec<Span> = (1..=Rating::MAX)
            .flat_map(|position| {
                let style = if is_filled(position, self.rating) {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                [Span::styled(STAR, style), Span::raw(" ")]
            })
            .collect();

        if self.is_selected {
            spans.push(Span::styled(
                " press 1-5 to rate",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_is_monotonic_for_every_rating() {
        for r in 0..=5u8 {
            let rating = if r == 0 { None } else { Some(r) };
            for position in 1..=5u8 {
                assert_eq!(
                    is_filled(position, rating),
                    position <= r,
                    "rating={r} position={position}"
                );
            }
        }
    }

    #[test]
    fn keys_map_to_ratings() {
        assert_eq!(rating_for_key('3').map(Rating::get), Some(3));
        assert!(rating_for_key('0').is_none());
        assert!(rating_for_key('6').is_none());
        assert!(rating_for_key('x').is_none());
    }

    #[test]
    fn line_colors_filled_stars() {
        let line = RatingStars::new(Some(2), false).line();
        let stars: Vec<&Span> = line.spans.iter().filter(|s| s.content == STAR).collect();
        assert_eq!(stars.len(), 5);
        assert_eq!(stars[0].style.fg, Some(Color::Yellow));
        assert_eq!(stars[1].style.fg, Some(Color::Yellow));
        assert_eq!(stars[2].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn hint_only_when_selected() {
        let text = |selected| RatingStars::new(None, selected).line().to_string();
        assert!(text(true).contains("1-5"));
        assert!(!text(false).contains("1-5"));
    }
}
