//! Session and turn tracking for interview mode, plus the typed mode bus.
//!
//! The tracker is a pure state container: it never makes network calls of
//! its own. It resets on a published mode change or on a response carrying
//! `conversation_complete`, and advances when the interviewer asks a
//! follow-up question.

use clap::ValueEnum;
use serde::Serialize;
use tokio::sync::watch;

use crate::api::AnalyzeResponse;

// ---------------------------------------------------------------------------
// Purpose mode
// ---------------------------------------------------------------------------

/// Why the user is explaining: one-shot feedback or multi-turn questioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Learning,
    Interview,
}

impl std::fmt::Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Purpose::Learning => write!(f, "learning"),
            Purpose::Interview => write!(f, "interview"),
        }
    }
}

impl Default for Purpose {
    fn default() -> Self {
        Purpose::Learning
    }
}

// ---------------------------------------------------------------------------
// Input mode
// ---------------------------------------------------------------------------

/// How the immediately preceding input action entered the explanation.
/// Reset to `Text` after every submission; reflects the last action only,
/// not cumulative history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Text,
    Speech,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputMode::Text => write!(f, "text"),
            InputMode::Speech => write!(f, "speech"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// What the session tracker observed in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The interviewer asked another question; the session advanced a turn.
    Advanced,
    /// The interviewer declared the conversation complete; state was reset.
    Completed,
    /// Nothing session-related in the response.
    Unchanged,
}

/// Interview session identity and turn counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub session_id: Option<String>,
    pub turn_index: u32,
}

impl SessionState {
    pub fn new() -> Self {
        SessionState {
            session_id: None,
            turn_index: 1,
        }
    }

    pub fn reset(&mut self) {
        self.session_id = None;
        self.turn_index = 1;
    }

    /// Apply a response's session signals.
    ///
    /// `conversation_complete` wins over a follow-up if a confused backend
    /// ever sends both: the interview is over either way.
    pub fn observe(&mut self, response: &AnalyzeResponse) -> SessionEvent {
        if response.conversation_complete {
            self.reset();
            return SessionEvent::Completed;
        }
        if response.interviewer_followup.is_some() {
            if let Some(id) = &response.session_id {
                self.session_id = Some(id.clone());
            }
            self.turn_index = match response.turn_index {
                Some(server_turn) => server_turn + 1,
                None => self.turn_index + 1,
            };
            return SessionEvent::Advanced;
        }
        SessionEvent::Unchanged
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Mode bus
// ---------------------------------------------------------------------------

/// Typed publish side of the purpose-mode channel.
///
/// Replaces the original's DOM-attribute observation: publishers call
/// [`ModeBus::publish`], subscribers poll their [`ModeSignal`].
pub struct ModeBus {
    tx: watch::Sender<Purpose>,
}

impl ModeBus {
    pub fn new(initial: Purpose) -> Self {
        let (tx, _) = watch::channel(initial);
        ModeBus { tx }
    }

    pub fn publish(&self, purpose: Purpose) {
        // send only fails with no receivers; a mode change with nobody
        // listening is still a valid publish.
        let _ = self.tx.send(purpose);
    }

    pub fn subscribe(&self) -> ModeSignal {
        ModeSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Subscriber handle. `take_change` is level-triggered: it reports a change
/// at most once, then arms again for the next publish.
pub struct ModeSignal {
    rx: watch::Receiver<Purpose>,
}

impl ModeSignal {
    pub fn current(&self) -> Purpose {
        *self.rx.borrow()
    }

    /// Returns the new purpose if one was published since the last poll.
    pub fn take_change(&mut self) -> Option<Purpose> {
        if self.rx.has_changed().unwrap_or(false) {
            Some(*self.rx.borrow_and_update())
        } else {
            None
        }
    }
}
