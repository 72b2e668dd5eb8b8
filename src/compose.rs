//! Request composition: pure functions over an explicit application state,
//! so submission logic is testable with no terminal or network attached.

use crate::api::AnalyzeRequest;
use crate::session::{InputMode, Purpose, SessionState};
use crate::speech::SpeechOutcome;

/// Informational character cap shown by the counter. Never enforced.
pub const DEFAULT_CHAR_LIMIT: usize = 2000;

/// The three form fields, mutated by user input and read at submission.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    pub concept: String,
    pub audience: String,
    pub explanation: String,
}

/// Everything the composer and renderer read: form fields, the uploaded
/// source, the attempt reference, the input-mode flag, the purpose mode,
/// the last recording's timing, and the interview session.
#[derive(Debug, Clone)]
pub struct AppState {
    pub form: FormInput,
    pub source_text: Option<String>,
    pub last_attempt_id: Option<String>,
    pub input_mode: InputMode,
    pub purpose: Purpose,
    pub speaking: Option<SpeechOutcome>,
    pub session: SessionState,
}

impl AppState {
    pub fn new(purpose: Purpose, audience: impl Into<String>) -> Self {
        AppState {
            form: FormInput {
                concept: String::new(),
                audience: audience.into(),
                explanation: String::new(),
            },
            source_text: None,
            last_attempt_id: None,
            input_mode: InputMode::Text,
            purpose,
            speaking: None,
            session: SessionState::new(),
        }
    }

    /// Each submission spends the speech flag, success or failure.
    pub fn spend_input_mode(&mut self) {
        self.input_mode = InputMode::Text;
        self.speaking = None;
    }
}

/// `N / 2000 chars` counter line, updated on every input action.
pub fn char_counter(text: &str, limit: usize) -> String {
    format!("{} / {} chars", text.chars().count(), limit)
}

/// Assemble the outgoing payload. `None` when concept or explanation is
/// empty — submission is a silent no-op, no error shown.
pub fn compose(state: &AppState) -> Option<AnalyzeRequest> {
    if state.form.concept.trim().is_empty() || state.form.explanation.trim().is_empty() {
        return None;
    }

    let speaking_duration = match state.input_mode {
        InputMode::Speech => state.speaking.and_then(|o| o.to_payload()),
        InputMode::Text => None,
    };

    let (session_id, turn_index) = match state.purpose {
        Purpose::Interview => (
            state.session.session_id.clone(),
            Some(state.session.turn_index),
        ),
        Purpose::Learning => (None, None),
    };

    Some(AnalyzeRequest {
        concept: state.form.concept.clone(),
        explanation: state.form.explanation.clone(),
        target_audience: state.form.audience.clone(),
        source_text: state.source_text.clone(),
        previous_attempt_id: state.last_attempt_id.clone(),
        input_mode: state.input_mode,
        speaking_duration,
        purpose: state.purpose,
        session_id,
        turn_index,
    })
}
