//! Frame layout: title bar, conversation sidebar, chat panel or upload form,
//! key help footer, and the data overlay on top when it is open.
//!
//! ```text
//! ┌ title bar ───────────────────────────────────────────┐
//! │ Previous       │ Conversation title                  │
//! │ Conversations  │ [file] [file]                       │
//! │                │ history...                          │
//! │                │ ┌ Message ────────────────────────┐ │
//! │                │ └─────────────────────────────────┘ │
//! └ key help ────────────────────────────────────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;

use crate::core::state::App;
use crate::tui::component::Component;
use crate::tui::components::input_box::FIELD_HEIGHT;
use crate::tui::components::{
    ChatPanel, ConversationList, DataDisplay, TitleBar, UploadForm,
};
use crate::tui::{Focus, TuiState};

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 34;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let [title_area, main_area, help_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());

    let mut title_bar = TitleBar::new(
        app.base_url.clone(),
        app.status_message.clone(),
        tui.in_flight,
    );
    title_bar.render(frame, title_area);

    let [sidebar_area, content_area] =
        Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(main_area);

    ConversationList::new(
        &mut tui.conversation_list,
        &app.conversations,
        app.selected,
        tui.focus == Focus::Conversations,
    )
    .render(frame, sidebar_area);

    match app.selected_conversation() {
        Some(conversation) => {
            let [chat_area, input_area] =
                Layout::vertical([Min(0), Length(FIELD_HEIGHT)]).areas(content_area);

            ChatPanel::new(
                &mut tui.chat_panel,
                conversation,
                app.pending_for(conversation.id),
                &app.updating_files,
            )
            .focus(tui.focus == Focus::History, tui.focus == Focus::Files)
            .render(frame, chat_area);

            tui.input_box.focused = tui.focus == Focus::Input && tui.data_display.is_none();
            tui.input_box.render(frame, input_area);
        }
        None => {
            let focused = tui.focus == Focus::Input && tui.data_display.is_none();
            UploadForm::new(&mut tui.upload_form, focused).render(frame, content_area);
        }
    }

    frame.render_widget(
        Line::styled(help_text(tui), Style::default().fg(Color::DarkGray)),
        help_area,
    );

    if let Some(state) = tui.data_display.as_mut()
        && let Some(conversation) = app.selected_conversation()
    {
        let area = frame.area();
        DataDisplay::new(state, conversation.display_files()).render(frame, area);
    }
}

fn help_text(tui: &TuiState) -> &'static str {
    if tui.data_display.is_some() {
        return " +/- rows  Enter apply  ↑/↓ scroll  Esc close";
    }
    match tui.focus {
        Focus::Conversations => " ↑/↓ move  Enter open  Tab next  ^N new  ^R refresh  ^D data  ^C quit",
        Focus::Files => " ←/→ move  Space toggle active  Tab next  ^D data  ^C quit",
        Focus::History => " ↑/↓ select  1-5 rate  PgUp/PgDn scroll  Tab next  ^C quit",
        Focus::Input => " Enter send  Esc list  Tab next  ^N new  ^U upload  ^D data  ^C quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PromptResponse;
    use crate::test_support::{buffer_text, conversation, prompt, test_app, uploaded_file};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &App, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| draw_ui(f, app, tui)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_draw_without_selection_shows_upload_form() {
        let app = test_app();
        let mut tui = TuiState::new(10);
        let text = draw(&app, &mut tui);
        assert!(text.contains("File Chat (server: http://test-server)"));
        assert!(text.contains("Previous Conversations"));
        assert!(text.contains("CSV, XLS, XLSX (MAX. 10MB)"));
    }

    #[test]
    fn test_draw_selected_conversation_shows_chat() {
        let mut app = test_app();
        let mut conv = conversation(1, "Sales");
        conv.files.push(uploaded_file(5, "q1.csv", true));
        let mut p = prompt(10, "sum of amount");
        p.response = Some(PromptResponse::Text("2150".to_string()));
        conv.prompts.push(p);
        app.conversations.push(conv);
        app.selected = Some(1);

        let mut tui = TuiState::new(10);
        let text = draw(&app, &mut tui);
        assert!(text.contains("sum of amount"));
        assert!(text.contains("2150"));
        assert!(text.contains("Type your message..."));
        assert!(!text.contains("MAX. 10MB"));
    }

    #[test]
    fn test_draw_data_overlay() {
        let mut app = test_app();
        let mut conv = conversation(1, "Sales");
        conv.files.push(uploaded_file(5, "q1.csv", true));
        app.conversations.push(conv);
        app.selected = Some(1);

        let mut tui = TuiState::new(10);
        tui.data_display = Some(crate::tui::components::DataDisplayState::new(10));
        let text = draw(&app, &mut tui);
        assert!(text.contains("Active Files Data"));
        assert!(text.contains("north"));
    }
}
