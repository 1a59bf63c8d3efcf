//! Optional voice input.
//!
//! The host may or may not offer speech recognition. The adapter hides that
//! behind [`VoiceInput`] so the controller never touches a concrete backend.
//! Captures are single-utterance and final-only: the first recognized line
//! ends the capture.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::SpeechError;

/// Environment variable carrying the capture locale to the recognizer command.
pub const LANGUAGE_ENV: &str = "FOLIO_SPEECH_LANG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionSettings {
    pub language: String,
    pub timeout: Duration,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl RecognitionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            language: config.speech_language.clone(),
            timeout: Duration::from_secs(config.speech_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Transcript(String),
    Error(String),
    End,
}

/// Sender handed to a recognizer for one capture. Every event is stamped
/// with that capture's number so late output from an abandoned capture can
/// be told apart from the current one.
#[derive(Debug, Clone)]
pub struct EventSink {
    capture: u64,
    tx: UnboundedSender<(u64, SpeechEvent)>,
}

impl EventSink {
    fn new(capture: u64, tx: UnboundedSender<(u64, SpeechEvent)>) -> Self {
        Self { capture, tx }
    }

    /// Returns false once the adapter is gone.
    pub fn send(&self, event: SpeechEvent) -> bool {
        self.tx.send((self.capture, event)).is_ok()
    }
}

/// A speech recognition backend.
pub trait Recognizer: Send {
    /// Begin one capture. Results arrive on `events`.
    fn start(
        &mut self,
        settings: &RecognitionSettings,
        events: EventSink,
    ) -> Result<(), SpeechError>;

    /// Abandon the current capture, if any.
    fn stop(&mut self);
}

pub enum VoiceInput {
    Available(Box<dyn Recognizer>),
    Unavailable,
}

impl VoiceInput {
    /// Voice input is available when a recognizer command is configured and
    /// its program can be found.
    pub fn detect(config: &Config) -> Self {
        let Some(argv) = config.speech_command.as_deref() else {
            debug!("no speech command configured, voice input disabled");
            return VoiceInput::Unavailable;
        };

        match CommandRecognizer::from_argv(argv) {
            Some(recognizer) => {
                info!(program = %recognizer.program.display(), "voice input available");
                VoiceInput::Available(Box::new(recognizer))
            }
            None => {
                warn!(command = ?argv, "speech command not found, voice input disabled");
                VoiceInput::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, VoiceInput::Available(_))
    }
}

/// Speech input adapter: owns the recognizer, the listening flag and the
/// event queue the recognizer reports into.
pub struct SpeechInput {
    voice: VoiceInput,
    settings: RecognitionSettings,
    listening: bool,
    capture: u64,
    tx: UnboundedSender<(u64, SpeechEvent)>,
    rx: UnboundedReceiver<(u64, SpeechEvent)>,
}

impl SpeechInput {
    pub fn new(voice: VoiceInput, settings: RecognitionSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            voice,
            settings,
            listening: false,
            capture: 0,
            tx,
            rx,
        }
    }

    pub fn unavailable() -> Self {
        Self::new(VoiceInput::Unavailable, RecognitionSettings::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            VoiceInput::detect(config),
            RecognitionSettings::from_config(config),
        )
    }

    pub fn is_available(&self) -> bool {
        self.voice.is_available()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Returns whether capture actually started.
    pub fn start_listening(&mut self) -> bool {
        let VoiceInput::Available(recognizer) = &mut self.voice else {
            debug!("start_listening ignored: {}", SpeechError::Unavailable);
            return false;
        };

        self.capture += 1;
        let sink = EventSink::new(self.capture, self.tx.clone());

        match recognizer.start(&self.settings, sink) {
            Ok(()) => {
                self.listening = true;
                true
            }
            Err(e) => {
                warn!(error = %e, "speech capture failed to start");
                self.listening = false;
                false
            }
        }
    }

    pub fn stop_listening(&mut self) {
        if let VoiceInput::Available(recognizer) = &mut self.voice {
            recognizer.stop();
        }
        self.listening = false;
    }

    /// Returns the new listening state.
    pub fn toggle_listening(&mut self) -> bool {
        if self.listening {
            self.stop_listening();
            false
        } else {
            self.start_listening()
        }
    }

    /// Drain pending recognizer events. Returns a transcript if the current
    /// capture produced one.
    pub fn poll(&mut self) -> Option<String> {
        let mut transcript = None;

        while let Ok((capture, event)) = self.rx.try_recv() {
            if capture != self.capture || (!self.listening && transcript.is_none()) {
                debug!(capture, current = self.capture, "dropping stale speech event");
                continue;
            }
            match event {
                SpeechEvent::Transcript(text) => {
                    self.listening = false;
                    transcript = Some(text);
                }
                SpeechEvent::Error(reason) => {
                    debug!(%reason, "speech capture error");
                    self.listening = false;
                }
                SpeechEvent::End => self.listening = false,
            }
        }

        transcript
    }
}

/// Recognizer backed by an external command that records one utterance and
/// prints the transcript on stdout.
pub struct CommandRecognizer {
    program: PathBuf,
    args: Vec<String>,
    task: Option<JoinHandle<()>>,
}

impl CommandRecognizer {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            task: None,
        }
    }

    /// Resolve `argv[0]` on `PATH`; `None` if it can't be found.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        let program = which::which(program).ok()?;
        Some(Self::new(program, args.to_vec()))
    }
}

impl Recognizer for CommandRecognizer {
    fn start(
        &mut self,
        settings: &RecognitionSettings,
        events: EventSink,
    ) -> Result<(), SpeechError> {
        self.stop();

        let program = self.program.clone();
        let args = self.args.clone();
        let settings = settings.clone();

        self.task = Some(tokio::spawn(async move {
            match capture(&program, &args, &settings).await {
                Ok(text) => {
                    info!(chars = text.len(), "speech transcript captured");
                    events.send(SpeechEvent::Transcript(text));
                    events.send(SpeechEvent::End);
                }
                Err(e) => {
                    events.send(SpeechEvent::Error(e.to_string()));
                }
            }
        }));

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CommandRecognizer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn capture(
    program: &Path,
    args: &[String],
    settings: &RecognitionSettings,
) -> Result<String, SpeechError> {
    let mut child = Command::new(program)
        .args(args)
        .env(LANGUAGE_ENV, &settings.language)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(SpeechError::Spawn)?;

    let stdout = child.stdout.take().ok_or(SpeechError::NoTranscript)?;
    let mut lines = BufReader::new(stdout).lines();

    let first_line = async {
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
        Ok::<_, SpeechError>(None)
    };

    let transcript = tokio::time::timeout(settings.timeout, first_line)
        .await
        .map_err(|_| SpeechError::Timeout(settings.timeout.as_secs()))??;

    match transcript {
        Some(text) => Ok(text),
        None => {
            let status = child.wait().await?;
            if status.success() {
                Err(SpeechError::NoTranscript)
            } else {
                Err(SpeechError::Exit(status))
            }
        }
    }
}
