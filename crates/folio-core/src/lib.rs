pub mod ai;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod error;
pub mod persona;
pub mod responder;
pub mod speech;
pub mod state;

// Re-export main types for convenience
pub use ai::GeminiClient;
pub use config::Config;
pub use controller::ChatController;
pub use conversation::Conversation;
pub use error::{GenerationError, SpeechError};
pub use persona::Persona;
pub use responder::{Respond, ResponseClient};
pub use speech::{CommandRecognizer, EventSink, Recognizer, SpeechEvent, SpeechInput, VoiceInput};
pub use state::{ChatMessage, ChatRole};
