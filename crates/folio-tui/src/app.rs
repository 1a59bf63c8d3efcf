use std::sync::Arc;

use ratatui::layout::Rect;
use folio_core::{ChatController, Config, Persona, ResponseClient, SpeechInput};
use crate::ui;

/// Fallback wrap width / height before the first render has measured the widget.
const DEFAULT_CHAT_WIDTH: u16 = 50;
const DEFAULT_CHAT_HEIGHT: u16 = 20;

pub struct App {
    pub should_quit: bool,
    pub persona: Persona,
    pub chat: ChatController,

    // Shown in the widget title
    pub model: String,
    pub assistant_configured: bool,

    // Transcript view state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the transcript, for scroll calculations
    pub chat_width: u16,  // inner width of the transcript, for wrap calculations

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(config: &Config) -> Self {
        let persona = Persona::default();
        let responder = ResponseClient::from_config(config, &persona);
        let model = responder.model().to_string();
        let assistant_configured = responder.is_configured();

        let chat = ChatController::new(Arc::new(responder), SpeechInput::from_config(config))
            .with_context_limit(config.max_context_messages);

        Self::with_controller(chat, persona, model, assistant_configured)
    }

    pub fn with_controller(
        chat: ChatController,
        persona: Persona,
        model: String,
        assistant_configured: bool,
    ) -> Self {
        Self {
            should_quit: false,
            persona,
            chat,
            model,
            assistant_configured,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_area: None,
            animation_frame: 0,
        }
    }

    /// Pick up finished replies and transcripts, then honour autoscroll.
    pub async fn update(&mut self) {
        self.chat.poll_response().await;
        self.chat.poll_speech();
        self.apply_scroll_request();
    }

    pub fn apply_scroll_request(&mut self) {
        if self.chat.take_scroll_request() {
            self.scroll_chat_to_bottom();
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Number of rendered transcript lines, including the thinking indicator.
    /// Wrapped exactly as the transcript is drawn.
    pub fn transcript_lines(&self) -> usize {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width
        } else {
            DEFAULT_CHAT_WIDTH
        };
        ui::transcript_line_count(self, wrap_width)
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            DEFAULT_CHAT_HEIGHT
        }
    }

    /// Scroll offsets are u16 in ratatui; very long transcripts pin to the limit.
    fn max_scroll(&self) -> u16 {
        let hidden = self
            .transcript_lines()
            .saturating_sub(self.visible_height() as usize);
        u16::try_from(hidden).unwrap_or(u16::MAX)
    }

    /// Scroll the transcript so the latest entry (or "thinking") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.visible_height() / 2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_app() -> App {
        let persona = Persona::default();
        let responder = ResponseClient::new(None, "test-model", &persona);
        let chat = ChatController::new(Arc::new(responder), SpeechInput::unavailable());
        App::with_controller(chat, persona, "test-model".to_string(), false)
    }

    #[tokio::test]
    async fn update_appends_reply_and_scrolls_to_bottom() {
        let mut app = offline_app();
        app.chat_width = 10;
        app.chat_height = 3;

        app.chat.set_input("a question that wraps");
        assert!(app.chat.send());
        app.chat.finish_pending().await;
        app.update().await;

        assert_eq!(app.chat.messages().len(), 2);
        assert!(!app.chat.is_loading());
        assert_eq!(app.chat_scroll as usize, app.transcript_lines() - 3);
    }

    #[test]
    fn unmeasured_view_uses_defaults() {
        let mut app = offline_app();
        app.chat.set_input("composing is not part of the transcript");
        // Only the greeting, which fits without scrolling
        let greeting_lines = app.transcript_lines();
        assert!(greeting_lines > 0 && greeting_lines < DEFAULT_CHAT_HEIGHT as usize);
        app.scroll_down(5);
        assert_eq!(app.chat_scroll, 0);
        assert_eq!(app.half_page(), DEFAULT_CHAT_HEIGHT / 2);
    }

    #[tokio::test]
    async fn manual_scroll_is_clamped() {
        let mut app = offline_app();
        app.chat_width = 20;
        app.chat_height = 2;

        app.chat.set_input("hello");
        app.chat.send();
        app.chat.finish_pending().await;

        // "You:" + "hello" + blank, "AI:" + the notice wrapped at word
        // boundaries into 3 lines + blank
        assert_eq!(app.transcript_lines(), 8);

        app.scroll_down(100);
        assert_eq!(app.chat_scroll, 6);
        app.scroll_up(4);
        assert_eq!(app.chat_scroll, 2);
        app.scroll_up(10);
        assert_eq!(app.chat_scroll, 0);
    }

    #[tokio::test]
    async fn transcript_taller_than_u16_pins_scroll_to_limit() {
        let mut app = offline_app();
        app.chat_width = 1;
        app.chat_height = 2;

        // One row per character at width 1
        let long_prompt = "x ".repeat(2_500);
        for _ in 0..30 {
            app.chat.set_input(&long_prompt);
            assert!(app.chat.send());
            app.chat.finish_pending().await;
            app.update().await;
        }

        assert!(app.transcript_lines() > u16::MAX as usize);
        assert_eq!(app.chat_scroll, u16::MAX);

        app.scroll_down(10);
        assert_eq!(app.chat_scroll, u16::MAX);
    }

    #[test]
    fn animation_only_runs_while_loading() {
        let mut app = offline_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
