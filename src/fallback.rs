//! Canned result set shown when the backend is unreachable.
//!
//! Only reachable behind the `--offline-fallback` flag: it exists so the
//! result panels can be exercised without a working backend, and it masks
//! real failures, so it must never be the default path.

use once_cell::sync::Lazy;

use crate::api::{Analysis, AnalyzeResponse};

static OFFLINE_RESPONSE: Lazy<AnalyzeResponse> = Lazy::new(|| AnalyzeResponse {
    attempt_id: None,
    session_id: None,
    turn_index: None,
    interviewer_followup: None,
    conversation_complete: false,
    analysis: Analysis {
        summary: "We encountered an error connecting to the brain (LLM). Since this is a \
                  local environment, looking at the logs might help. However, here is what \
                  the feedback would look like!"
            .to_string(),
        gaps: vec![
            "Connection to the LLM failed".to_string(),
            "The analysis backend might be missing its model".to_string(),
        ],
        suggestions: vec![
            "Check the backend logs".to_string(),
            "Ensure the GGUF model is in models/".to_string(),
        ],
        follow_up_questions: vec![
            "Did you install the requirements?".to_string(),
            "Is the analysis server running?".to_string(),
        ],
        speaking_metrics: None,
        filler_analysis: None,
    },
    comparison: None,
});

/// A fresh copy of the fixed offline result set.
pub fn offline_response() -> AnalyzeResponse {
    OFFLINE_RESPONSE.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_response_shape() {
        let resp = offline_response();
        assert!(resp.analysis.summary.contains("brain (LLM)"));
        assert_eq!(resp.analysis.gaps.len(), 2);
        assert_eq!(resp.analysis.suggestions.len(), 2);
        assert_eq!(resp.analysis.follow_up_questions.len(), 2);
        assert!(resp.comparison.is_none());
        assert!(resp.interviewer_followup.is_none());
    }

    #[test]
    fn test_offline_response_never_advances_session() {
        let resp = offline_response();
        assert!(!resp.conversation_complete);
        assert!(resp.session_id.is_none());
        assert!(resp.attempt_id.is_none());
    }
}
