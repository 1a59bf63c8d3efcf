use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;
use crate::app::App;
use crate::tui::AppEvent;

/// Lines moved per mouse wheel notch
const WHEEL_STEP: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.scroll_chat_to_bottom(),
        AppEvent::Tick => {
            app.tick_animation();
            app.update().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.chat.is_open() {
        handle_chat_key(app, key);
    } else {
        handle_landing_key(app, key);
    }
}

fn handle_landing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') | KeyCode::Char('a') | KeyCode::Enter => {
            app.chat.open();
            app.scroll_chat_to_bottom();
        }
        _ => {}
    }
}

fn handle_chat_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('r') => {
                let listening = app.chat.toggle_listening();
                debug!(listening, available = app.chat.voice_available(), "voice toggled");
            }
            KeyCode::Char('o') => app.chat.close(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.chat.close(),
        KeyCode::Enter => {
            if app.chat.send() {
                app.apply_scroll_request();
            }
        }
        KeyCode::Backspace => app.chat.backspace(),
        KeyCode::Delete => app.chat.delete(),
        KeyCode::Left => app.chat.cursor_left(),
        KeyCode::Right => app.chat.cursor_right(),
        KeyCode::Home => app.chat.cursor_home(),
        KeyCode::End => app.chat.cursor_end(),

        // Transcript scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.half_page()),
        KeyCode::PageDown => app.scroll_down(app.half_page()),

        KeyCode::Char(c) => app.chat.insert_char(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if !app.chat.is_open() {
        return;
    }
    let Some(area) = app.chat_area else { return };
    if !point_in_rect(mouse.column, mouse.row, area) {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_STEP),
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_STEP),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::responder::NO_KEY_RESPONSE;
    use folio_core::{ChatController, ChatRole, Persona, ResponseClient, SpeechInput};
    use std::sync::Arc;

    fn offline_app() -> App {
        let persona = Persona::default();
        let responder = ResponseClient::new(None, "test-model", &persona);
        let chat = ChatController::new(Arc::new(responder), SpeechInput::unavailable());
        App::with_controller(chat, persona, "test-model".to_string(), false)
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, press(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn q_quits_only_from_landing() {
        let mut app = offline_app();

        handle_event(&mut app, press(KeyCode::Char('c'))).await.unwrap();
        assert!(app.chat.is_open());

        type_text(&mut app, "quiet").await;
        assert!(!app.should_quit);
        assert_eq!(app.chat.input(), "quiet");

        handle_event(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert!(!app.chat.is_open());
        assert_eq!(app.chat.input(), "quiet");

        handle_event(&mut app, press(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn ctrl_c_quits_from_chat() {
        let mut app = offline_app();
        app.chat.open();
        handle_event(&mut app, ctrl('c')).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn enter_sends_and_tick_delivers_reply() {
        let mut app = offline_app();
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert!(app.chat.is_open());

        // Blank input is not sent
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert!(app.chat.messages().is_empty());

        type_text(&mut app, "hello").await;
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.chat.messages().len(), 1);
        assert_eq!(app.chat.input(), "");

        app.chat.finish_pending().await;
        handle_event(&mut app, AppEvent::Tick).await.unwrap();

        let last = app.chat.conversation().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, NO_KEY_RESPONSE);
    }

    #[tokio::test]
    async fn voice_toggle_without_recognizer_keeps_draft() {
        let mut app = offline_app();
        app.chat.open();
        type_text(&mut app, "draft").await;

        handle_event(&mut app, ctrl('r')).await.unwrap();
        handle_event(&mut app, AppEvent::Tick).await.unwrap();

        assert!(!app.chat.is_listening());
        assert_eq!(app.chat.input(), "draft");
    }

    #[tokio::test]
    async fn resize_returns_to_latest_entry() {
        let mut app = offline_app();
        app.chat_width = 20;
        app.chat_height = 2;
        app.chat.open();
        type_text(&mut app, "hello").await;
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        app.chat.finish_pending().await;
        handle_event(&mut app, AppEvent::Tick).await.unwrap();

        handle_event(&mut app, press(KeyCode::PageUp)).await.unwrap();
        assert_eq!(app.chat_scroll, 5);

        handle_event(&mut app, AppEvent::Resize).await.unwrap();
        assert_eq!(app.chat_scroll, 6);
    }

    #[test]
    fn point_hit_testing() {
        let rect = Rect::new(10, 5, 4, 2);
        assert!(point_in_rect(10, 5, rect));
        assert!(point_in_rect(13, 6, rect));
        assert!(!point_in_rect(14, 6, rect));
        assert!(!point_in_rect(9, 5, rect));
    }
}
