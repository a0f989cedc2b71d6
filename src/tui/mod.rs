//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into core::Action values and runs the
//! effects `update()` asks for as background tasks.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Focus
//!
//! Tab / Shift+Tab cycle through the panes:
//!
//! ```text
//! Conversations → Files → History → Input → Conversations
//! ```
//!
//! Files and History only exist while a conversation is selected; otherwise
//! the cycle is Conversations ↔ Input, and Input is the upload form.
//!
//! ## Redraw Strategy
//!
//! Nothing animates, so the loop sleeps up to 250ms and only redraws after
//! a terminal event or a completed server call.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::api::{ChatBackend, HttpBackend, UploadSource};
use crate::core::action::{Action, Effect, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::App;
use crate::tui::component::EventHandler;
use crate::tui::components::conversation_list::ListEvent;
use crate::tui::components::{
    ChatPanelState, ConversationListState, DataDisplayEvent, DataDisplayState, HistoryEvent,
    InputBox, InputEvent, UploadEvent, UploadFormState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Conversations,
    Files,
    History,
    Input,
}

impl Focus {
    pub fn next(self, has_conversation: bool) -> Self {
        match (self, has_conversation) {
            (Focus::Conversations, true) => Focus::Files,
            (Focus::Files, _) => Focus::History,
            (Focus::History, _) => Focus::Input,
            (Focus::Conversations, false) => Focus::Input,
            (Focus::Input, _) => Focus::Conversations,
        }
    }

    pub fn prev(self, has_conversation: bool) -> Self {
        match (self, has_conversation) {
            (Focus::Conversations, _) => Focus::Input,
            (Focus::Input, true) => Focus::History,
            (Focus::Input, false) => Focus::Conversations,
            (Focus::History, _) => Focus::Files,
            (Focus::Files, _) => Focus::Conversations,
        }
    }
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub focus: Focus,
    // Persistent component states
    pub conversation_list: ConversationListState,
    pub chat_panel: ChatPanelState,
    pub input_box: InputBox,
    pub upload_form: UploadFormState,
    /// Data overlay (None = hidden)
    pub data_display: Option<DataDisplayState>,
    /// Row count the data overlay opens with
    pub default_row_count: usize,
    /// Server calls started and not yet completed
    pub in_flight: usize,
}

impl TuiState {
    pub fn new(default_row_count: usize) -> Self {
        Self {
            focus: Focus::Input, // upload form or message box, ready to type
            conversation_list: ConversationListState::new(),
            chat_panel: ChatPanelState::new(),
            input_box: InputBox::new(),
            upload_form: UploadFormState::new(),
            data_display: None,
            default_row_count,
            in_flight: 0,
        }
    }

    /// Move focus off panes that disappeared with the selection.
    fn normalize_focus(&mut self, has_conversation: bool) {
        if !has_conversation {
            if matches!(self.focus, Focus::Files | Focus::History) {
                self.focus = Focus::Input;
            }
            self.data_display = None;
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn ChatBackend> =
        Arc::new(HttpBackend::new(&config.base_url).map_err(std::io::Error::other)?);
    let mut app = App::new(config.base_url.clone());
    let mut tui = TuiState::new(config.default_row_count);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for completions from background tasks
    let (tx, rx) = mpsc::channel();

    // Initial list fetch
    if dispatch(&mut app, &mut tui, Action::Refresh, &backend, &tx) {
        ratatui::restore();
        return Ok(());
    }

    let mut needs_redraw = true;
    'main: loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(std::time::Duration::from_millis(250));
        if first_event.is_some() {
            needs_redraw = true;
        }
        // Drain every pending event before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = route_event(&app, &mut tui, &event)
                && dispatch(&mut app, &mut tui, action, &backend, &tx)
            {
                break 'main;
            }
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if dispatch(&mut app, &mut tui, action, &backend, &tx) {
                break 'main;
            }
        }
    }

    info!("Shutting down with {} calls in flight", tui.in_flight);
    ratatui::restore();
    Ok(())
}

/// Run an action through the reducer and start whatever I/O it asks for.
/// Returns true when the app should quit.
fn dispatch(
    app: &mut App,
    tui: &mut TuiState,
    action: Action,
    backend: &Arc<dyn ChatBackend>,
    tx: &mpsc::Sender<Action>,
) -> bool {
    match apply_action(app, tui, action) {
        Effect::Quit => true,
        Effect::None => false,
        effect => {
            spawn_effect(effect, Arc::clone(backend), tx.clone());
            false
        }
    }
}

/// Reducer step plus the presentation bookkeeping that follows it.
fn apply_action(app: &mut App, tui: &mut TuiState, action: Action) -> Effect {
    if action.is_completion() {
        tui.in_flight = tui.in_flight.saturating_sub(1);
    }
    let selected_before = app.selected;
    let count_before = app.conversations.len();

    let effect = update(app, action);

    if app.selected != selected_before || app.conversations.len() != count_before {
        tui.conversation_list
            .follow(app.selected, &app.conversations);
    }
    tui.normalize_focus(app.selected_conversation().is_some());

    if !matches!(effect, Effect::None | Effect::Quit) {
        tui.in_flight += 1;
    }
    effect
}

/// Translate a terminal event into an action, updating presentation state on the way.
fn route_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Option<Action> {
    let conversation = app.selected_conversation();

    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        TuiEvent::ToggleDataDisplay => {
            match tui.data_display.take() {
                Some(state) => tui.default_row_count = state.applied,
                None if conversation.is_some() => {
                    tui.data_display = Some(DataDisplayState::new(tui.default_row_count));
                }
                None => {}
            }
            return None;
        }
        _ => {}
    }

    // The overlay swallows everything while open
    if let Some(state) = tui.data_display.as_mut() {
        if let Some(DataDisplayEvent::Dismiss) = state.handle_event(event) {
            tui.default_row_count = state.applied;
            tui.data_display = None;
        }
        return None;
    }

    match event {
        TuiEvent::NewConversation => {
            tui.focus = Focus::Input;
            return Some(Action::NewConversation);
        }
        TuiEvent::Refresh => return Some(Action::Refresh),
        TuiEvent::NextFocus => {
            tui.focus = tui.focus.next(conversation.is_some());
            return None;
        }
        TuiEvent::PrevFocus => {
            tui.focus = tui.focus.prev(conversation.is_some());
            return None;
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
            if conversation.is_some() =>
        {
            tui.chat_panel.handle_event(event);
            return None;
        }
        _ => {}
    }

    if matches!(event, TuiEvent::Escape) {
        tui.focus = Focus::Conversations;
        return None;
    }

    match (tui.focus, conversation) {
        (Focus::Conversations, _) => {
            let list_event = tui
                .conversation_list
                .handle_event(event, &app.conversations)?;
            tui.focus = Focus::Input;
            match list_event {
                ListEvent::Select(id) => Some(Action::SelectConversation(id)),
                ListEvent::New => Some(Action::NewConversation),
            }
        }
        (Focus::Files, Some(conversation)) => {
            let index = tui
                .chat_panel
                .handle_file_event(event, conversation.files.len())?;
            conversation
                .files
                .get(index)
                .map(|file| Action::ToggleFile(file.id))
        }
        (Focus::History, Some(conversation)) => {
            let HistoryEvent::Rate { index, rating } = tui.chat_panel.handle_event(event)?;
            // Pending messages follow the prompts and cannot be rated yet
            conversation.prompts.get(index).map(|prompt| Action::RatePrompt {
                prompt_id: prompt.id,
                rating,
            })
        }
        (Focus::Input, Some(_)) => match tui.input_box.handle_event(event)? {
            InputEvent::Submit(text) => Some(Action::SendMessage(text)),
            InputEvent::ContentChanged => None,
        },
        (_, None) => match tui.upload_form.handle_event(event)? {
            UploadEvent::Submit { paths, title } => Some(Action::Upload { paths, title }),
        },
    }
}

fn effect_label(effect: &Effect) -> String {
    match effect {
        Effect::None => "none".to_string(),
        Effect::Quit => "quit".to_string(),
        Effect::FetchConversations => "fetch conversations".to_string(),
        Effect::Upload { paths, .. } => format!("upload of {} files", paths.len()),
        Effect::SendChat {
            conversation_id, ..
        } => format!("chat in conversation {}", conversation_id),
        Effect::Rate { prompt_id, rating } => {
            format!("rating {} for prompt {}", rating.get(), prompt_id)
        }
        Effect::UpdateFile { file_id, .. } => format!("update of file {}", file_id),
    }
}

fn spawn_effect(effect: Effect, backend: Arc<dyn ChatBackend>, tx: mpsc::Sender<Action>) {
    info!("Spawning {} via {}", effect_label(&effect), backend.name());
    tokio::spawn(async move {
        if let Some(action) = run_effect(effect, backend.as_ref()).await
            && tx.send(action).is_err()
        {
            warn!("Failed to send completion: receiver dropped");
        }
    });
}

/// Perform one server round trip and turn its outcome into a completion action.
/// Failures are logged here; the reducer only sees the error text.
pub async fn run_effect(effect: Effect, backend: &dyn ChatBackend) -> Option<Action> {
    let action = match effect {
        Effect::None | Effect::Quit => return None,
        Effect::FetchConversations => match backend.list_conversations().await {
            Ok(conversations) => Action::ConversationsLoaded(conversations),
            Err(e) => {
                warn!("Failed to fetch conversations: {}", e);
                Action::ConversationsFailed(e.to_string())
            }
        },
        Effect::Upload { paths, title } => {
            let result = match UploadSource::read_all(&paths).await {
                Ok(files) => backend.upload_files(&files, title.as_deref()).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(conversation) => Action::Uploaded(conversation),
                Err(e) => {
                    warn!("Upload of {} files failed: {}", paths.len(), e);
                    Action::UploadFailed(e.to_string())
                }
            }
        }
        Effect::SendChat {
            local_id,
            conversation_id,
            content,
        } => match backend.send_chat(conversation_id, &content).await {
            Ok(prompt) => Action::PromptCreated {
                local_id,
                conversation_id,
                prompt,
            },
            Err(e) => {
                warn!("Chat in conversation {} failed: {}", conversation_id, e);
                Action::PromptFailed {
                    local_id,
                    error: e.to_string(),
                }
            }
        },
        Effect::Rate { prompt_id, rating } => match backend.rate_prompt(prompt_id, rating).await {
            Ok(()) => Action::PromptRated { prompt_id, rating },
            Err(e) => {
                warn!("Rating prompt {} failed: {}", prompt_id, e);
                Action::RateFailed {
                    prompt_id,
                    error: e.to_string(),
                }
            }
        },
        Effect::UpdateFile { file_id, patch } => {
            match backend.update_file(file_id, &patch).await {
                Ok(()) => Action::FileUpdated { file_id, patch },
                Err(e) => {
                    warn!("Updating file {} failed: {}", file_id, e);
                    Action::FileUpdateFailed {
                        file_id,
                        error: e.to_string(),
                    }
                }
            }
        }
    };
    Some(action)
}
