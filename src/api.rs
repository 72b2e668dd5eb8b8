//! Wire types for the Mr. Feynman backend.
//!
//! Mirrors the JSON contract of `/api/v1/analyze`, `/api/v2/upload` and
//! `/api/v1/history`. Conditional fields are omitted from the serialized
//! body entirely (not set to `null`); `source_text` and
//! `previous_attempt_id` are always present, as `null` when unset.

use serde::{Deserialize, Serialize};

use crate::session::{InputMode, Purpose};

/// Sentinel the backend returns when it could not compute a progress
/// comparison; the comparison panel stays hidden when it appears.
pub const COMPARISON_UNAVAILABLE: &str = "Unable to generate comparison.";

// -- Analyze request --------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub concept: String,
    pub explanation: String,
    pub target_audience: String,
    pub source_text: Option<String>,
    pub previous_attempt_id: Option<String>,
    pub input_mode: InputMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaking_duration: Option<SpeakingDuration>,
    pub purpose: Purpose,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_index: Option<u32>,
}

/// Recorded speaking time, whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeakingDuration {
    pub total_seconds: u64,
    pub active_seconds: u64,
}

// -- Analyze response -------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub attempt_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub turn_index: Option<u32>,
    #[serde(default)]
    pub interviewer_followup: Option<InterviewerFollowup>,
    #[serde(default)]
    pub conversation_complete: bool,
    pub analysis: Analysis,
    #[serde(default)]
    pub comparison: Option<Comparison>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Analysis {
    pub summary: String,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
    #[serde(default)]
    pub speaking_metrics: Option<SpeakingMetricsReport>,
    #[serde(default)]
    pub filler_analysis: Option<FillerAnalysis>,
}

/// One interviewer question plus the stated reason for asking it.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewerFollowup {
    pub question: String,
    #[serde(default)]
    pub intent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comparison {
    pub summary_of_progress: String,
    #[serde(default)]
    pub improvements: Vec<String>,
}

impl Comparison {
    /// Whether the panel should render at all.
    pub fn is_presentable(&self) -> bool {
        self.summary_of_progress != COMPARISON_UNAVAILABLE
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeakingMetricsReport {
    #[serde(default)]
    pub total_time_seconds: f64,
    #[serde(default)]
    pub active_speaking_seconds: f64,
    #[serde(default)]
    pub pause_ratio: f64,
    #[serde(default)]
    pub insight: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FillerAnalysis {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub common_fillers: Vec<String>,
    #[serde(default)]
    pub insight: Option<String>,
}

// -- Upload -----------------------------------------------------------------

/// Success body from `/api/v2/upload`. The backend also returns bookkeeping
/// fields; only `text` is consumed but the rest must deserialize cleanly.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub text: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub text_length: Option<usize>,
}

/// Failure body from `/api/v2/upload`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFailure {
    pub detail: String,
}

// -- History ----------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub attempt_id: String,
    pub concept: String,
    #[serde(default)]
    pub explanation_text: String,
    #[serde(default)]
    pub timestamp: String,
}
