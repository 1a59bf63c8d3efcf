pub mod gemini;

pub use gemini::{Content, GeminiClient, GenerationConfig, Part};
