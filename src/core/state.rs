//! # Application State
//!
//! The one authoritative copy of everything the client knows. No TUI types here;
//! presentation state (focus, scroll offsets, form buffers) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── conversations: Vec<Conversation>   // server list, in arrival order
//! ├── selected: Option<i64>              // selected conversation id (None = upload form)
//! ├── pending: Vec<PendingPrompt>        // sent messages awaiting the server
//! ├── updating_files: HashSet<i64>       // file ids with an update in flight
//! ├── status_message: String             // title bar text
//! └── base_url: String                   // server shown in the title bar
//! ```
//!
//! The selected conversation is looked up by id in `conversations`, so the chat view
//! and the list can never hold two diverging copies of the same conversation.
//! State changes only happen through `update(state, action)` in action.rs.

use std::collections::HashSet;

use crate::api::{Conversation, UploadedFile};

/// A message the user sent that the server has not answered yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingPrompt {
    /// Client-side id, unique for the lifetime of the process.
    pub local_id: u64,
    pub conversation_id: i64,
    pub content: String,
}

pub struct App {
    pub conversations: Vec<Conversation>,
    pub selected: Option<i64>,
    pub pending: Vec<PendingPrompt>,
    pub updating_files: HashSet<i64>,
    pub status_message: String,
    pub base_url: String,
    next_local_id: u64,
}

impl App {
    pub fn new(base_url: String) -> Self {
        Self {
            conversations: Vec::new(),
            selected: None,
            pending: Vec::new(),
            updating_files: HashSet::new(),
            status_message: String::from("Welcome to File Chat!"),
            base_url,
            next_local_id: 1,
        }
    }

    pub fn selected_conversation(&self) -> Option<&Conversation> {
        self.selected.and_then(|id| self.conversation(id))
    }

    pub fn conversation(&self, id: i64) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn conversation_mut(&mut self, id: i64) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    /// Find a file by id across all conversations.
    pub fn file(&self, file_id: i64) -> Option<&UploadedFile> {
        self.conversations
            .iter()
            .flat_map(|c| c.files.iter())
            .find(|f| f.id == file_id)
    }

    /// Pending messages for one conversation, oldest first.
    pub fn pending_for(&self, conversation_id: i64) -> impl Iterator<Item = &PendingPrompt> {
        self.pending
            .iter()
            .filter(move |p| p.conversation_id == conversation_id)
    }

    pub fn is_file_updating(&self, file_id: i64) -> bool {
        self.updating_files.contains(&file_id)
    }

    pub(crate) fn allocate_local_id(&mut self) -> u64 {
        let id = self.next_local_id;
        self.next_local_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{conversation, test_app, uploaded_file};

    #[test]
    fn test_app_new_defaults() {
        let app = test_app();
        assert_eq!(app.status_message, "Welcome to File Chat!");
        assert!(app.conversations.is_empty());
        assert!(app.selected.is_none());
        assert!(app.pending.is_empty());
    }

    #[test]
    fn test_selected_conversation_resolves_by_id() {
        let mut app = test_app();
        app.conversations = vec![conversation(1, "One"), conversation(2, "Two")];
        app.selected = Some(2);
        assert_eq!(app.selected_conversation().map(|c| c.title.as_str()), Some("Two"));

        app.selected = Some(99);
        assert!(app.selected_conversation().is_none());
    }

    #[test]
    fn test_file_lookup_spans_conversations() {
        let mut app = test_app();
        let mut second = conversation(2, "Two");
        second.files.push(uploaded_file(20, "b.csv", true));
        app.conversations = vec![conversation(1, "One"), second];
        assert_eq!(app.file(20).map(|f| f.filename.as_str()), Some("b.csv"));
        assert!(app.file(21).is_none());
    }

    #[test]
    fn test_local_ids_are_unique() {
        let mut app = test_app();
        let a = app.allocate_local_id();
        let b = app.allocate_local_id();
        assert_ne!(a, b);
    }
}
