//! Error types for the assistant core.
//!
//! These never reach the controller: the response client and the speech
//! adapter log them and turn them into plain values at their boundary.

/// Failure talking to the generation endpoint.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Connection, TLS or timeout failure from the HTTP client.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Gemini API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure capturing a voice transcript.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// No recognizer is available in this environment.
    #[error("speech recognition unavailable")]
    Unavailable,

    /// The recognizer process could not be launched.
    #[error("failed to start recognizer: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O error while reading the recognizer output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The recognizer exited unsuccessfully.
    #[error("recognizer exited with {0}")]
    Exit(std::process::ExitStatus),

    /// Capture ran past the configured limit.
    #[error("capture timed out after {0}s")]
    Timeout(u64),

    /// The recognizer finished without producing any text.
    #[error("no speech recognized")]
    NoTranscript,
}
