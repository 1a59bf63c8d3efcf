//! Response client: turns a prompt plus history into displayable text.
//!
//! Every path resolves to a string. Missing credentials, transport failures
//! and empty generations each map to a fixed fallback message.

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::ai::{Content, GeminiClient};
use crate::config::Config;
use crate::persona::Persona;
use crate::state::{ChatMessage, ChatRole};

pub const NO_KEY_RESPONSE: &str = "API key not found. Please ensure it is configured.";
pub const EMPTY_RESPONSE: &str = "I'm having trouble thinking right now. Please try again.";
pub const ERROR_RESPONSE: &str = "Sorry, I encountered an error connecting to my neural network.";

/// Anything that can answer a chat turn.
#[async_trait]
pub trait Respond: Send + Sync {
    async fn respond(&self, prompt: &str, history: &[ChatMessage]) -> String;
}

#[derive(Clone)]
pub struct ResponseClient {
    client: Option<GeminiClient>,
    model: String,
    system_instruction: String,
}

impl ResponseClient {
    pub fn new(client: Option<GeminiClient>, model: &str, persona: &Persona) -> Self {
        Self {
            client,
            model: model.to_string(),
            system_instruction: persona.system_instruction(),
        }
    }

    /// Build from config, reading the credential once.
    pub fn from_config(config: &Config, persona: &Persona) -> Self {
        let client = config
            .resolve_api_key()
            .map(|key| GeminiClient::new(&key).with_base_url(&config.base_url));

        if client.is_none() {
            warn!("no API key configured, assistant will answer with a fixed notice");
        }

        Self::new(client, &config.model, persona)
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Persona preamble, then history role-for-role, then the new prompt.
    pub fn build_contents(&self, prompt: &str, history: &[ChatMessage]) -> Vec<Content> {
        let mut contents = Vec::with_capacity(history.len() + 2);
        contents.push(Content::user(self.system_instruction.as_str()));
        contents.extend(history.iter().map(|msg| match msg.role {
            ChatRole::Assistant => Content::model(msg.content.as_str()),
            ChatRole::User => Content::user(msg.content.as_str()),
        }));
        contents.push(Content::user(prompt));
        contents
    }
}

#[async_trait]
impl Respond for ResponseClient {
    async fn respond(&self, prompt: &str, history: &[ChatMessage]) -> String {
        let Some(client) = &self.client else {
            return NO_KEY_RESPONSE.to_string();
        };

        let contents = self.build_contents(prompt, history);

        match client.generate(&self.model, &contents).await {
            Ok(text) if text.trim().is_empty() => {
                warn!(model = %self.model, "generation returned empty content");
                EMPTY_RESPONSE.to_string()
            }
            Ok(text) => {
                info!(model = %self.model, chars = text.len(), "generation succeeded");
                text
            }
            Err(e) => {
                error!(model = %self.model, error = %e, "Gemini API error");
                ERROR_RESPONSE.to_string()
            }
        }
    }
}
