//! # Actions
//!
//! Everything that can happen in File Chat becomes an `Action`.
//! User presses Enter in the chat input? That's `Action::SendMessage(text)`.
//! The server answers? That's `Action::PromptCreated { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns an `Effect` describing the I/O the caller must perform.
//! No I/O happens here; the TUI executes effects and feeds completions back in.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//!                                              │
//!                 completion Action  ◄── I/O ──┘
//! ```
//!
//! Every merge of server data is keyed by id (conversation, prompt, file), never
//! by position, so completions may arrive in any order.

use std::path::PathBuf;

use log::{debug, info};

use crate::api::{Conversation, FilePatch, Prompt, Rating};
use crate::core::state::{App, PendingPrompt};

#[derive(Debug)]
pub enum Action {
    /// Fetch the conversation list (on mount, or on demand).
    Refresh,
    ConversationsLoaded(Vec<Conversation>),
    ConversationsFailed(String),

    SelectConversation(i64),
    /// Clear the selection so the upload form is shown.
    NewConversation,

    Upload {
        paths: Vec<PathBuf>,
        title: Option<String>,
    },
    Uploaded(Conversation),
    UploadFailed(String),

    SendMessage(String),
    PromptCreated {
        local_id: u64,
        conversation_id: i64,
        prompt: Prompt,
    },
    PromptFailed {
        local_id: u64,
        error: String,
    },

    RatePrompt {
        prompt_id: i64,
        rating: Rating,
    },
    PromptRated {
        prompt_id: i64,
        rating: Rating,
    },
    RateFailed {
        prompt_id: i64,
        error: String,
    },

    /// Flip a file's active flag based on its current value.
    ToggleFile(i64),
    UpdateFile {
        file_id: i64,
        patch: FilePatch,
    },
    FileUpdated {
        file_id: i64,
        patch: FilePatch,
    },
    FileUpdateFailed {
        file_id: i64,
        error: String,
    },

    Quit,
}

impl Action {
    /// True for actions that report the end of a server round trip.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Action::ConversationsLoaded(_)
                | Action::ConversationsFailed(_)
                | Action::Uploaded(_)
                | Action::UploadFailed(_)
                | Action::PromptCreated { .. }
                | Action::PromptFailed { .. }
                | Action::PromptRated { .. }
                | Action::RateFailed { .. }
                | Action::FileUpdated { .. }
                | Action::FileUpdateFailed { .. }
        )
    }
}

/// I/O requested by `update()`. Each variant is one independent server round trip.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    FetchConversations,
    Upload {
        paths: Vec<PathBuf>,
        title: Option<String>,
    },
    SendChat {
        local_id: u64,
        conversation_id: i64,
        content: String,
    },
    Rate {
        prompt_id: i64,
        rating: Rating,
    },
    UpdateFile {
        file_id: i64,
        patch: FilePatch,
    },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Refresh => {
            app.status_message = String::from("Loading conversations...");
            Effect::FetchConversations
        }
        Action::ConversationsLoaded(conversations) => {
            info!("Replacing conversation list ({} entries)", conversations.len());
            app.conversations = conversations;
            if let Some(id) = app.selected
                && app.conversation(id).is_none()
            {
                debug!("Selected conversation {} vanished, clearing selection", id);
                app.selected = None;
            }
            app.status_message = format!("{} conversations", app.conversations.len());
            Effect::None
        }
        Action::ConversationsFailed(error) => {
            // Stale but consistent: keep whatever we had
            debug!("Conversation list unchanged after failure: {}", error);
            app.status_message.clear();
            Effect::None
        }

        Action::SelectConversation(id) => {
            if app.conversation(id).is_some() {
                app.selected = Some(id);
            } else {
                debug!("Ignoring selection of unknown conversation {}", id);
            }
            Effect::None
        }
        Action::NewConversation => {
            app.selected = None;
            Effect::None
        }

        Action::Upload { paths, title } => {
            if paths.is_empty() {
                return Effect::None;
            }
            let title = title
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            app.status_message = format!("Uploading {} files...", paths.len());
            Effect::Upload { paths, title }
        }
        Action::Uploaded(conversation) => {
            let id = conversation.id;
            app.status_message = format!("Created \"{}\"", conversation.title);
            upsert_conversation(app, conversation);
            app.selected = Some(id);
            Effect::None
        }
        Action::UploadFailed(error) => {
            debug!("Upload produced no conversation: {}", error);
            app.status_message.clear();
            Effect::None
        }

        Action::SendMessage(text) => {
            let content = text.trim();
            let Some(conversation_id) = app.selected else {
                return Effect::None;
            };
            if content.is_empty() {
                return Effect::None;
            }
            let local_id = app.allocate_local_id();
            let content = content.to_string();
            app.pending.push(PendingPrompt {
                local_id,
                conversation_id,
                content: content.clone(),
            });
            Effect::SendChat {
                local_id,
                conversation_id,
                content,
            }
        }
        Action::PromptCreated {
            local_id,
            conversation_id,
            prompt,
        } => {
            app.pending.retain(|p| p.local_id != local_id);
            match app.conversation_mut(conversation_id) {
                Some(conversation) => match conversation.prompt_mut(prompt.id) {
                    // A refresh may have delivered this prompt already
                    Some(existing) => *existing = prompt,
                    None => conversation.prompts.push(prompt),
                },
                None => debug!(
                    "Prompt {} arrived for unknown conversation {}",
                    prompt.id, conversation_id
                ),
            }
            Effect::None
        }
        Action::PromptFailed { local_id, error } => {
            debug!("Discarding pending prompt {}: {}", local_id, error);
            app.pending.retain(|p| p.local_id != local_id);
            Effect::None
        }

        Action::RatePrompt { prompt_id, rating } => Effect::Rate { prompt_id, rating },
        Action::PromptRated { prompt_id, rating } => {
            let mut found = false;
            for conversation in &mut app.conversations {
                if let Some(prompt) = conversation.prompt_mut(prompt_id) {
                    prompt.rating = Some(rating.get());
                    found = true;
                }
            }
            if !found {
                debug!("Rated prompt {} is not loaded locally", prompt_id);
            }
            Effect::None
        }
        Action::RateFailed { prompt_id, error } => {
            debug!("Rating for prompt {} not applied: {}", prompt_id, error);
            Effect::None
        }

        Action::ToggleFile(file_id) => {
            if app.is_file_updating(file_id) {
                debug!("Toggle of file {} ignored while its update is in flight", file_id);
                return Effect::None;
            }
            let Some(active) = app.file(file_id).map(|f| f.active) else {
                return Effect::None;
            };
            let patch = FilePatch::active(!active);
            update(app, Action::UpdateFile { file_id, patch })
        }
        Action::UpdateFile { file_id, patch } => {
            app.updating_files.insert(file_id);
            Effect::UpdateFile { file_id, patch }
        }
        Action::FileUpdated { file_id, patch } => {
            app.updating_files.remove(&file_id);
            for conversation in &mut app.conversations {
                if let Some(file) = conversation.file_mut(file_id) {
                    patch.apply(file);
                }
            }
            Effect::None
        }
        Action::FileUpdateFailed { file_id, error } => {
            debug!("File {} unchanged after failure: {}", file_id, error);
            app.updating_files.remove(&file_id);
            Effect::None
        }

        Action::Quit => Effect::Quit,
    }
}

/// Replace the conversation with the same id, or append it.
fn upsert_conversation(app: &mut App, conversation: Conversation) {
    match app.conversation_mut(conversation.id) {
        Some(existing) => *existing = conversation,
        None => app.conversations.push(conversation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PromptResponse;
    use crate::test_support::{conversation, prompt, test_app, uploaded_file};

    fn rating(v: u8) -> Rating {
        Rating::new(v).unwrap()
    }

    /// App with two conversations; conversation 1 selected with two prompts and two files.
    fn seeded_app() -> App {
        let mut app = test_app();
        let mut first = conversation(1, "Sales");
        first.prompts = vec![prompt(10, "totals?"), prompt(11, "by region?")];
        first.files = vec![uploaded_file(100, "q1.csv", true), uploaded_file(101, "q2.csv", false)];
        let mut second = conversation(2, "Inventory");
        second.prompts = vec![prompt(20, "stock?")];
        app.conversations = vec![first, second];
        app.selected = Some(1);
        app
    }

    #[test]
    fn test_refresh_requests_fetch() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Refresh), Effect::FetchConversations);
    }

    #[test]
    fn test_conversations_loaded_replaces_list() {
        let mut app = seeded_app();
        let effect = update(
            &mut app,
            Action::ConversationsLoaded(vec![conversation(1, "Sales v2")]),
        );
        assert_eq!(effect, Effect::None);
        assert_eq!(app.conversations.len(), 1);
        assert_eq!(app.conversations[0].title, "Sales v2");
        assert_eq!(app.selected, Some(1));
    }

    #[test]
    fn test_conversations_loaded_clears_vanished_selection() {
        let mut app = seeded_app();
        app.selected = Some(2);
        update(&mut app, Action::ConversationsLoaded(vec![conversation(1, "Sales")]));
        assert!(app.selected.is_none());
    }

    #[test]
    fn test_conversations_failed_keeps_prior_state() {
        let mut app = seeded_app();
        let before = app.conversations.clone();
        update(&mut app, Action::ConversationsFailed("network error".into()));
        assert_eq!(app.conversations, before);
        assert_eq!(app.selected, Some(1));
    }

    #[test]
    fn test_upload_with_no_files_is_noop() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::Upload {
                paths: vec![],
                title: Some("x".into()),
            },
        );
        assert_eq!(effect, Effect::None);
    }

    #[test]
    fn test_upload_blank_title_is_dropped() {
        let mut app = test_app();
        let effect = update(
            &mut app,
            Action::Upload {
                paths: vec![PathBuf::from("a.csv")],
                title: Some("   ".into()),
            },
        );
        assert_eq!(
            effect,
            Effect::Upload {
                paths: vec![PathBuf::from("a.csv")],
                title: None
            }
        );
    }

    #[test]
    fn test_uploaded_appends_and_selects() {
        let mut app = seeded_app();
        update(&mut app, Action::Uploaded(conversation(3, "New upload")));
        assert_eq!(app.conversations.len(), 3);
        assert_eq!(app.conversations[2].id, 3);
        assert_eq!(app.selected, Some(3));
    }

    #[test]
    fn test_upload_failed_leaves_state() {
        let mut app = seeded_app();
        update(&mut app, Action::UploadFailed("boom".into()));
        assert_eq!(app.conversations.len(), 2);
        assert_eq!(app.selected, Some(1));
    }

    #[test]
    fn test_send_message_requires_selection() {
        let mut app = seeded_app();
        app.selected = None;
        assert_eq!(update(&mut app, Action::SendMessage("hi".into())), Effect::None);
        assert!(app.pending.is_empty());
    }

    #[test]
    fn test_send_message_ignores_blank_text() {
        let mut app = seeded_app();
        assert_eq!(update(&mut app, Action::SendMessage("   \n".into())), Effect::None);
        assert!(app.pending.is_empty());
    }

    #[test]
    fn test_send_message_creates_pending_and_effect() {
        let mut app = seeded_app();
        let effect = update(&mut app, Action::SendMessage("  average price?  ".into()));
        let Effect::SendChat {
            local_id,
            conversation_id,
            content,
        } = effect
        else {
            panic!("Expected SendChat, got {:?}", effect);
        };
        assert_eq!(conversation_id, 1);
        assert_eq!(content, "average price?");
        assert_eq!(app.pending.len(), 1);
        assert_eq!(app.pending[0].local_id, local_id);
        // Not part of the conversation until the server answers
        assert_eq!(app.conversations[0].prompts.len(), 2);
    }

    #[test]
    fn test_prompt_created_appends_at_tail_and_clears_pending() {
        let mut app = seeded_app();
        let Effect::SendChat { local_id, .. } =
            update(&mut app, Action::SendMessage("average?".into()))
        else {
            panic!("Expected SendChat");
        };
        let mut created = prompt(12, "average?");
        created.response = Some(PromptResponse::Text("42".into()));

        update(
            &mut app,
            Action::PromptCreated {
                local_id,
                conversation_id: 1,
                prompt: created,
            },
        );

        let prompts = &app.selected_conversation().unwrap().prompts;
        let ids: Vec<i64> = prompts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
        assert!(app.pending.is_empty());
    }

    #[test]
    fn test_prompt_created_lands_in_origin_after_selection_change() {
        let mut app = seeded_app();
        let Effect::SendChat { local_id, .. } =
            update(&mut app, Action::SendMessage("q".into()))
        else {
            panic!("Expected SendChat");
        };
        update(&mut app, Action::SelectConversation(2));
        update(
            &mut app,
            Action::PromptCreated {
                local_id,
                conversation_id: 1,
                prompt: prompt(12, "q"),
            },
        );
        assert_eq!(app.conversation(1).unwrap().prompts.len(), 3);
        assert_eq!(app.conversation(2).unwrap().prompts.len(), 1);
    }

    #[test]
    fn test_prompt_created_twice_does_not_duplicate() {
        let mut app = seeded_app();
        update(
            &mut app,
            Action::PromptCreated {
                local_id: 0,
                conversation_id: 1,
                prompt: prompt(11, "by region?"),
            },
        );
        assert_eq!(app.conversation(1).unwrap().prompts.len(), 2);
    }

    #[test]
    fn test_prompt_failed_discards_placeholder_only() {
        let mut app = seeded_app();
        let Effect::SendChat { local_id, .. } =
            update(&mut app, Action::SendMessage("q".into()))
        else {
            panic!("Expected SendChat");
        };
        update(
            &mut app,
            Action::PromptFailed {
                local_id,
                error: "500".into(),
            },
        );
        assert!(app.pending.is_empty());
        assert_eq!(app.conversation(1).unwrap().prompts.len(), 2);
    }

    #[test]
    fn test_rate_prompt_requests_effect_without_mutation() {
        let mut app = seeded_app();
        let effect = update(
            &mut app,
            Action::RatePrompt {
                prompt_id: 10,
                rating: rating(4),
            },
        );
        assert_eq!(
            effect,
            Effect::Rate {
                prompt_id: 10,
                rating: rating(4)
            }
        );
        assert_eq!(app.conversation(1).unwrap().prompts[0].rating, None);
    }

    #[test]
    fn test_prompt_rated_changes_only_target() {
        for v in 1..=5 {
            let mut app = seeded_app();
            update(
                &mut app,
                Action::PromptRated {
                    prompt_id: 11,
                    rating: rating(v),
                },
            );
            let selected = app.selected_conversation().unwrap();
            assert_eq!(selected.prompts[1].rating, Some(v));
            assert_eq!(selected.prompts[0].rating, None);
            assert_eq!(app.conversation(2).unwrap().prompts[0].rating, None);
        }
    }

    #[test]
    fn test_rate_failed_leaves_rating() {
        let mut app = seeded_app();
        update(
            &mut app,
            Action::RateFailed {
                prompt_id: 10,
                error: "x".into(),
            },
        );
        assert_eq!(app.conversation(1).unwrap().prompts[0].rating, None);
    }

    #[test]
    fn test_toggle_file_builds_inverse_patch() {
        let mut app = seeded_app();
        let effect = update(&mut app, Action::ToggleFile(100));
        assert_eq!(
            effect,
            Effect::UpdateFile {
                file_id: 100,
                patch: FilePatch::active(false)
            }
        );
        assert!(app.is_file_updating(100));
    }

    #[test]
    fn test_toggle_unknown_file_is_noop() {
        let mut app = seeded_app();
        assert_eq!(update(&mut app, Action::ToggleFile(999)), Effect::None);
        assert!(app.updating_files.is_empty());
    }

    #[test]
    fn test_toggle_ignored_while_update_in_flight() {
        let mut app = seeded_app();
        let first = update(&mut app, Action::ToggleFile(100));
        assert_eq!(update(&mut app, Action::ToggleFile(100)), Effect::None);
        assert!(app.is_file_updating(100));

        let Effect::UpdateFile { file_id, patch } = first else {
            panic!("Expected UpdateFile");
        };
        update(&mut app, Action::FileUpdated { file_id, patch });
        assert!(!app.file(100).unwrap().active);
        assert!(!app.is_file_updating(100));

        // Settled, so the next press flips it back
        assert_eq!(
            update(&mut app, Action::ToggleFile(100)),
            Effect::UpdateFile {
                file_id: 100,
                patch: FilePatch::active(true)
            }
        );
    }

    #[test]
    fn test_toggle_other_file_not_blocked_by_in_flight_update() {
        let mut app = seeded_app();
        update(&mut app, Action::ToggleFile(100));
        assert!(matches!(
            update(&mut app, Action::ToggleFile(101)),
            Effect::UpdateFile { file_id: 101, .. }
        ));
    }

    /// Runs a toggle through the full round trip as the event loop would.
    fn toggle_round_trip(app: &mut App, file_id: i64) {
        let Effect::UpdateFile { file_id, patch } = update(app, Action::ToggleFile(file_id))
        else {
            panic!("Expected UpdateFile");
        };
        update(app, Action::FileUpdated { file_id, patch });
    }

    #[test]
    fn test_double_toggle_restores_original() {
        let mut app = seeded_app();
        let before = app.conversations.clone();

        toggle_round_trip(&mut app, 100);
        assert!(!app.file(100).unwrap().active);
        assert!(!app.file(101).unwrap().active, "other files untouched");

        toggle_round_trip(&mut app, 100);
        assert_eq!(app.conversations, before);
        assert!(app.updating_files.is_empty());
    }

    #[test]
    fn test_file_update_failed_clears_marker_only() {
        let mut app = seeded_app();
        update(&mut app, Action::ToggleFile(101));
        update(
            &mut app,
            Action::FileUpdateFailed {
                file_id: 101,
                error: "x".into(),
            },
        );
        assert!(!app.file(101).unwrap().active);
        assert!(!app.is_file_updating(101));
    }

    #[test]
    fn test_out_of_order_completions_merge_by_id() {
        let mut app = seeded_app();
        update(
            &mut app,
            Action::PromptRated {
                prompt_id: 20,
                rating: rating(2),
            },
        );
        update(
            &mut app,
            Action::PromptRated {
                prompt_id: 10,
                rating: rating(5),
            },
        );
        assert_eq!(app.conversation(2).unwrap().prompts[0].rating, Some(2));
        assert_eq!(app.conversation(1).unwrap().prompts[0].rating, Some(5));
    }

    #[test]
    fn test_new_conversation_clears_selection() {
        let mut app = seeded_app();
        update(&mut app, Action::NewConversation);
        assert!(app.selected.is_none());
    }

    #[test]
    fn test_select_unknown_conversation_ignored() {
        let mut app = seeded_app();
        update(&mut app, Action::SelectConversation(42));
        assert_eq!(app.selected, Some(1));
    }

    #[test]
    fn test_quit() {
        let mut app = test_app();
        assert_eq!(update(&mut app, Action::Quit), Effect::Quit);
    }

    #[test]
    fn test_completion_actions() {
        assert!(Action::ConversationsFailed("x".to_string()).is_completion());
        assert!(
            Action::FileUpdated {
                file_id: 1,
                patch: FilePatch::active(true)
            }
            .is_completion()
        );
        assert!(!Action::Refresh.is_completion());
        assert!(!Action::SendMessage("hi".to_string()).is_completion());
    }
}
