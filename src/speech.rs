//! Speech capture: an abstract recognition engine plus the adapter that
//! assembles transcripts and accumulates speaking metrics.
//!
//! The engine is a capability seam: the binary wires in a [`PipeEngine`]
//! over a configured external recognizer command, tests drive the adapter
//! with scripted events. Event-ordering contract: zero or more `Result`
//! events, then exactly one `Ended`, optionally preceded by one `Error`.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::SpeakingDuration;
use crate::error::CoachError;

/// A recording shorter than this is not worth a review hint.
pub const HINT_MIN_TOTAL: Duration = Duration::from_secs(1);
/// How long the post-recording review hint stays on screen.
pub const HINT_TTL: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// Engine capability
// ---------------------------------------------------------------------------

/// Lifecycle and result events emitted by a recognition engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Started,
    /// A recognized piece of the current segment. Interim results replace
    /// the previous interim; final results accumulate.
    Result { transcript: String, is_final: bool },
    /// The engine detected the start of audible speech.
    SpeechStart,
    /// The engine detected the end of audible speech.
    SpeechEnd,
    Error(String),
    /// The engine closed the session (user stop or its own silence timeout).
    Ended,
}

/// Abstract continuous-recognition capability.
pub trait SpeechEngine: Send {
    /// Begin a recognition session; events arrive on the returned channel.
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<EngineEvent>, CoachError>;
    /// Request the session to end. The `Ended` event still arrives on the
    /// channel; callers must not assume it has fired when this returns.
    fn stop(&mut self);
}

// ---------------------------------------------------------------------------
// Capture adapter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Listening,
}

/// Timing accumulated over one recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeechOutcome {
    pub total: Duration,
    pub active: Duration,
}

impl SpeechOutcome {
    pub fn hint_worthy(&self) -> bool {
        self.total > HINT_MIN_TOTAL
    }

    /// Whole-second payload for the analyze request. `None` when nothing
    /// was actually recorded.
    pub fn to_payload(&self) -> Option<SpeakingDuration> {
        if self.total.is_zero() {
            return None;
        }
        Some(SpeakingDuration {
            total_seconds: self.total.as_secs_f64().round() as u64,
            active_seconds: self.active.as_secs_f64().round() as u64,
        })
    }
}

/// What the controller should do after feeding an event to the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureUpdate {
    None,
    /// Replace the explanation text with this composed transcript.
    Text(String),
    /// The session ended; metrics are final.
    Ended(SpeechOutcome),
    /// The engine failed; the session will still end on its own.
    Failed(String),
}

#[derive(Debug)]
struct Metrics {
    started_at: Option<Instant>,
    active: Duration,
    active_since: Option<Instant>,
}

impl Metrics {
    fn reset(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.active = Duration::ZERO;
        self.active_since = None;
    }

    fn fold_open_interval(&mut self, now: Instant) {
        if let Some(since) = self.active_since.take() {
            self.active += now.saturating_duration_since(since);
        }
    }
}

/// State machine `Idle → Listening → Idle` over an engine's event stream.
///
/// While listening, every result rebuilds the full recognized segment and
/// composes it onto the text that existed when recording began.
pub struct SpeechCapture {
    state: CaptureState,
    base_text: String,
    finals: Vec<String>,
    interim: Option<String>,
    metrics: Metrics,
}

impl SpeechCapture {
    pub fn new() -> Self {
        SpeechCapture {
            state: CaptureState::Idle,
            base_text: String::new(),
            finals: Vec::new(),
            interim: None,
            metrics: Metrics {
                started_at: None,
                active: Duration::ZERO,
                active_since: None,
            },
        }
    }

    pub fn is_listening(&self) -> bool {
        self.state == CaptureState::Listening
    }

    /// `Idle → Listening`: snapshot the existing text as the base to append
    /// to, and zero the metrics.
    pub fn begin(&mut self, existing_text: &str, now: Instant) {
        self.state = CaptureState::Listening;
        self.base_text = existing_text.to_string();
        self.finals.clear();
        self.interim = None;
        self.metrics.reset(now);
        debug!(base_len = self.base_text.len(), "speech capture started");
    }

    pub fn handle_event(&mut self, event: EngineEvent, now: Instant) -> CaptureUpdate {
        if self.state != CaptureState::Listening {
            return CaptureUpdate::None;
        }
        match event {
            EngineEvent::Started => CaptureUpdate::None,
            EngineEvent::Result {
                transcript,
                is_final,
            } => {
                if is_final {
                    self.interim = None;
                    let trimmed = transcript.trim();
                    if !trimmed.is_empty() {
                        self.finals.push(trimmed.to_string());
                    }
                } else {
                    self.interim = Some(transcript.trim().to_string());
                }
                CaptureUpdate::Text(self.composed_text())
            }
            EngineEvent::SpeechStart => {
                self.metrics.active_since = Some(now);
                CaptureUpdate::None
            }
            EngineEvent::SpeechEnd => {
                self.metrics.fold_open_interval(now);
                CaptureUpdate::None
            }
            EngineEvent::Error(message) => {
                warn!(%message, "speech engine error");
                CaptureUpdate::Failed(message)
            }
            EngineEvent::Ended => {
                self.metrics.fold_open_interval(now);
                let total = self
                    .metrics
                    .started_at
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or(Duration::ZERO);
                // active can drift past total by scheduling jitter; clamp
                // so the invariant holds.
                let active = self.metrics.active.min(total);
                self.state = CaptureState::Idle;
                CaptureUpdate::Ended(SpeechOutcome { total, active })
            }
        }
    }

    /// Base text plus the full recognized segment, separated by a single
    /// space only when the base is non-empty and doesn't already end in
    /// whitespace.
    pub fn composed_text(&self) -> String {
        let segment = self.segment();
        if segment.is_empty() {
            return self.base_text.clone();
        }
        if self.base_text.is_empty() {
            return segment;
        }
        if self.base_text.ends_with(char::is_whitespace) {
            format!("{}{}", self.base_text, segment)
        } else {
            format!("{} {}", self.base_text, segment)
        }
    }

    fn segment(&self) -> String {
        let mut parts: Vec<&str> = self.finals.iter().map(|s| s.as_str()).collect();
        if let Some(interim) = &self.interim {
            if !interim.is_empty() {
                parts.push(interim);
            }
        }
        parts.join(" ")
    }
}

impl Default for SpeechCapture {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Pipe engine
// ---------------------------------------------------------------------------

/// Engine over an external line-oriented recognizer command (configured as
/// `speech_command`). Each stdout line becomes one final result bracketed
/// by speech-start/speech-end; process exit ends the session.
pub struct PipeEngine {
    command: String,
    child: Option<Child>,
}

impl PipeEngine {
    pub fn new(command: impl Into<String>) -> Self {
        PipeEngine {
            command: command.into(),
            child: None,
        }
    }
}

impl SpeechEngine for PipeEngine {
    fn start(&mut self) -> Result<mpsc::UnboundedReceiver<EngineEvent>, CoachError> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            CoachError::Io(std::io::Error::other("recognizer stdout unavailable"))
        })?;
        self.child = Some(child);

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let _ = tx.send(EngineEvent::Started);
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        let _ = tx.send(EngineEvent::SpeechStart);
                        let _ = tx.send(EngineEvent::Result {
                            transcript: line,
                            is_final: true,
                        });
                        let _ = tx.send(EngineEvent::SpeechEnd);
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx.send(EngineEvent::Error(e.to_string()));
                        break;
                    }
                }
            }
            let _ = tx.send(EngineEvent::Ended);
        });

        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            // Kill triggers EOF on the reader task, which emits Ended.
            let _ = child.start_kill();
        }
        self.child = None;
    }
}
