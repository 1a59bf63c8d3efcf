//! In-memory conversation log for a single widget session.

use crate::state::{ChatMessage, ChatRole};

/// Ordered, append-only sequence of chat messages.
///
/// Insertion order is turn order. Nothing is ever removed; the log lives as
/// long as the owning controller.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Trailing messages to send as request context. `None` means everything.
    pub fn context(&self, limit: Option<usize>) -> &[ChatMessage] {
        match limit {
            Some(n) => &self.messages[self.messages.len().saturating_sub(n)..],
            None => &self.messages,
        }
    }

    /// Whether the log follows the user, assistant, user, ... pattern.
    pub fn alternates(&self) -> bool {
        self.messages.iter().enumerate().all(|(i, msg)| {
            let expected = if i % 2 == 0 {
                ChatRole::User
            } else {
                ChatRole::Assistant
            };
            msg.role == expected
        })
    }
}
