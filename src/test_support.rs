//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use serde_json::{Value, json};

use crate::api::{Conversation, FileData, Prompt, Row, UploadedFile};
use crate::core::state::App;

/// Creates a test App pointed at a placeholder server.
pub fn test_app() -> App {
    App::new("http://test-server".to_string())
}

pub fn conversation(id: i64, title: &str) -> Conversation {
    Conversation {
        id,
        title: title.to_string(),
        created_at: Some("2024-08-01T12:00:00".to_string()),
        prompts: Vec::new(),
        files: Vec::new(),
    }
}

/// A prompt with no response and no rating yet.
pub fn prompt(id: i64, content: &str) -> Prompt {
    Prompt {
        id,
        content: content.to_string(),
        response: None,
        rating: None,
        created_at: None,
    }
}

/// A file with two parsed rows (`name`, `amount`).
pub fn uploaded_file(id: i64, filename: &str, active: bool) -> UploadedFile {
    UploadedFile {
        id,
        filename: filename.to_string(),
        path: format!("/uploads/{filename}"),
        active,
        data: Some(FileData {
            data: rows(json!([
                {"name": "north", "amount": 1200},
                {"name": "south", "amount": 950}
            ])),
        }),
        created_at: None,
    }
}

/// Convert a JSON array literal of objects into rows.
pub fn rows(value: Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Flatten a rendered test buffer into one string for `contains` checks.
pub fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    buffer.content().iter().map(|c| c.symbol()).collect()
}
