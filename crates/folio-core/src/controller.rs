//! Chat widget controller.
//!
//! Owns the conversation, the composing buffer and the widget flags. All
//! mutation goes through the transitions below; surfaces only read state and
//! forward user intents.

use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info};

use crate::conversation::Conversation;
use crate::responder::{Respond, ERROR_RESPONSE};
use crate::speech::SpeechInput;
use crate::state::ChatMessage;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct ChatController {
    responder: Arc<dyn Respond>,
    speech: SpeechInput,
    conversation: Conversation,
    context_limit: Option<usize>,

    input: String,
    cursor: usize, // char position in input

    is_open: bool,
    is_loading: bool,
    pending: Option<JoinHandle<String>>,
    scroll_requested: bool,
}

impl ChatController {
    pub fn new(responder: Arc<dyn Respond>, speech: SpeechInput) -> Self {
        Self {
            responder,
            speech,
            conversation: Conversation::new(),
            context_limit: None,
            input: String::new(),
            cursor: 0,
            is_open: false,
            is_loading: false,
            pending: None,
            scroll_requested: false,
        }
    }

    pub fn with_context_limit(mut self, limit: Option<usize>) -> Self {
        self.context_limit = limit;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.all()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_listening(&self) -> bool {
        self.speech.is_listening()
    }

    pub fn voice_available(&self) -> bool {
        self.speech.is_available()
    }

    // Widget visibility. History survives close/reopen.
    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn open(&mut self) {
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.is_open = false;
    }

    // Composing
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor = self.input.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Start a turn. Ignored when the input is blank or a request is already
    /// in flight. Must be called inside a tokio runtime.
    pub fn send(&mut self) -> bool {
        let prompt = self.input.trim().to_string();
        if prompt.is_empty() || self.is_loading {
            return false;
        }

        let history = self.conversation.context(self.context_limit).to_vec();

        self.conversation.append(ChatMessage::user(prompt.as_str()));
        self.input.clear();
        self.cursor = 0;
        self.is_loading = true;
        self.scroll_requested = true;

        info!(messages = self.conversation.len(), context = history.len(), "sending chat turn");

        let responder = Arc::clone(&self.responder);
        self.pending = Some(tokio::spawn(async move {
            responder.respond(&prompt, &history).await
        }));

        true
    }

    /// Complete the turn if its response has arrived. Never blocks.
    pub async fn poll_response(&mut self) -> bool {
        let finished = self
            .pending
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if finished {
            self.finish_pending().await;
        }
        finished
    }

    /// Wait for the outstanding response, if any, and append it.
    pub async fn finish_pending(&mut self) {
        if let Some(task) = self.pending.take() {
            let result = task.await;
            self.complete(result);
        }
    }

    fn complete(&mut self, result: Result<String, JoinError>) {
        let text = result.unwrap_or_else(|e| {
            error!(error = %e, "response task failed");
            ERROR_RESPONSE.to_string()
        });

        debug!(chars = text.len(), open = self.is_open, "appending assistant reply");
        self.conversation.append(ChatMessage::assistant(text));
        self.is_loading = false;
        self.scroll_requested = true;
    }

    // Voice
    pub fn toggle_listening(&mut self) -> bool {
        self.speech.toggle_listening()
    }

    /// Apply a finished transcript, replacing whatever was being composed.
    pub fn poll_speech(&mut self) -> bool {
        match self.speech.poll() {
            Some(transcript) => {
                self.set_input(transcript);
                true
            }
            None => false,
        }
    }

    /// Returns true once after each append; the view scrolls to the bottom.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        self.speech.stop_listening();
    }
}
