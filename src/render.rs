//! Result rendering: a pure function of response data to terminal output.
//!
//! Panels render in a fixed order — follow-up, summary, gaps, suggestions,
//! follow-up questions, comparison, speaking metrics, filler words — and
//! the last three hide themselves unless their data says otherwise.

use std::io::{self, Write};

use colored::*;

use crate::api::{
    AnalyzeResponse, Comparison, FillerAnalysis, InterviewerFollowup, SpeakingMetricsReport,
};

/// What the renderer needs to know beyond the response itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    /// Whether a reference document is active (changes the framing caption).
    pub has_source: bool,
}

/// Render every panel of an analysis response.
pub fn render_results<W: Write>(
    out: &mut W,
    response: &AnalyzeResponse,
    ctx: &RenderContext,
) -> io::Result<()> {
    writeln!(out)?;

    // Framing caption: three mutually exclusive cases.
    if let Some(followup) = &response.interviewer_followup {
        writeln!(out, "{}", "The interviewer has a follow-up for you".bold().bright_magenta())?;
        render_followup(out, followup)?;
    } else if ctx.has_source {
        writeln!(
            out,
            "{}",
            "Feedback, grounded in your reference document".bold().bright_cyan()
        )?;
    } else {
        writeln!(out, "{}", "Feedback on your explanation".bold().bright_cyan())?;
    }

    writeln!(out, "{}", response.analysis.summary)?;

    render_list(out, "Knowledge gaps", &response.analysis.gaps, false)?;
    render_list(out, "Suggestions", &response.analysis.suggestions, false)?;
    render_list(
        out,
        "Questions to test yourself",
        &response.analysis.follow_up_questions,
        true,
    )?;

    if let Some(comparison) = &response.comparison {
        render_comparison(out, comparison)?;
    }
    if let Some(metrics) = &response.analysis.speaking_metrics {
        render_speaking_metrics(out, metrics)?;
    }
    if let Some(fillers) = &response.analysis.filler_analysis {
        render_filler_analysis(out, fillers)?;
    }

    writeln!(out)?;
    Ok(())
}

fn render_followup<W: Write>(out: &mut W, followup: &InterviewerFollowup) -> io::Result<()> {
    writeln!(out, "  {}", followup.question.bright_white().bold())?;
    if !followup.intent.is_empty() {
        writeln!(out, "  {}", format!("({})", followup.intent).dimmed())?;
    }
    writeln!(out)?;
    Ok(())
}

/// Skips the header entirely when the list is empty; a missing array is
/// not an error.
fn render_list<W: Write>(out: &mut W, title: &str, items: &[String], quoted: bool) -> io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", title.bold().bright_yellow())?;
    for item in items {
        if quoted {
            writeln!(out, "  - {}", format!("\"{}\"", item).italic())?;
        } else {
            writeln!(out, "  - {}", item)?;
        }
    }
    Ok(())
}

/// Hidden when the backend could not compute one.
fn render_comparison<W: Write>(out: &mut W, comparison: &Comparison) -> io::Result<()> {
    if !comparison.is_presentable() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", "Progress since your last attempt".bold().bright_green())?;
    writeln!(out, "{}", comparison.summary_of_progress)?;
    for improvement in &comparison.improvements {
        writeln!(out, "  - {}", improvement)?;
    }
    Ok(())
}

/// Hidden unless a non-zero total time was reported.
fn render_speaking_metrics<W: Write>(
    out: &mut W,
    metrics: &SpeakingMetricsReport,
) -> io::Result<()> {
    if metrics.total_time_seconds <= 0.0 {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", "Speaking delivery".bold().bright_blue())?;
    writeln!(
        out,
        "  spoke for {}s, {}s of it actively, {} pauses",
        metrics.total_time_seconds,
        metrics.active_speaking_seconds,
        format_pause_ratio(metrics.pause_ratio)
    )?;
    if let Some(insight) = &metrics.insight {
        writeln!(out, "  {}", insight)?;
    }
    for suggestion in &metrics.suggestions {
        writeln!(out, "  - {}", suggestion)?;
    }
    Ok(())
}

/// Hidden unless any filler words were counted.
fn render_filler_analysis<W: Write>(out: &mut W, fillers: &FillerAnalysis) -> io::Result<()> {
    if fillers.total_count == 0 {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{}", "Filler words".bold().bright_red())?;
    writeln!(
        out,
        "  {} fillers ({})",
        fillers.total_count,
        fillers.common_fillers.join(", ")
    )?;
    let insight = fillers
        .insight
        .as_deref()
        .unwrap_or("Filler words can blur an otherwise clear explanation.");
    writeln!(out, "  {}", insight)?;
    Ok(())
}

/// Whole-percent pause ratio, e.g. `0.286` → `29%`.
pub fn format_pause_ratio(ratio: f64) -> String {
    format!("{}%", (ratio * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Analysis;

    fn rendered(response: &AnalyzeResponse, ctx: &RenderContext) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        render_results(&mut buf, response, ctx).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    fn bare_response(summary: &str) -> AnalyzeResponse {
        AnalyzeResponse {
            attempt_id: None,
            session_id: None,
            turn_index: None,
            interviewer_followup: None,
            conversation_complete: false,
            analysis: Analysis {
                summary: summary.to_string(),
                gaps: vec![],
                suggestions: vec![],
                follow_up_questions: vec![],
                speaking_metrics: None,
                filler_analysis: None,
            },
            comparison: None,
        }
    }

    #[test]
    fn test_format_pause_ratio_rounds() {
        assert_eq!(format_pause_ratio(0.286), "29%");
        assert_eq!(format_pause_ratio(0.0), "0%");
        assert_eq!(format_pause_ratio(1.0), "100%");
        assert_eq!(format_pause_ratio(0.004), "0%");
    }

    #[test]
    fn test_caption_without_source_or_followup() {
        let text = rendered(&bare_response("S"), &RenderContext::default());
        assert!(text.contains("Feedback on your explanation"));
        assert!(!text.contains("reference document"));
    }

    #[test]
    fn test_caption_with_source() {
        let ctx = RenderContext { has_source: true };
        let text = rendered(&bare_response("S"), &ctx);
        assert!(text.contains("grounded in your reference document"));
    }

    #[test]
    fn test_followup_caption_wins_over_source() {
        let mut response = bare_response("S");
        response.interviewer_followup = Some(InterviewerFollowup {
            question: "What breaks first?".to_string(),
            intent: "edge cases".to_string(),
        });
        let ctx = RenderContext { has_source: true };
        let text = rendered(&response, &ctx);
        assert!(text.contains("interviewer has a follow-up"));
        assert!(text.contains("What breaks first?"));
        assert!(text.contains("(edge cases)"));
        assert!(!text.contains("reference document"));
    }

    #[test]
    fn test_lists_render_in_order_and_quoted() {
        let mut response = bare_response("S");
        response.analysis.gaps = vec!["g1".to_string(), "g2".to_string()];
        response.analysis.suggestions = vec!["s1".to_string()];
        response.analysis.follow_up_questions = vec!["q1".to_string(), "q2".to_string()];
        let text = rendered(&response, &RenderContext::default());
        assert!(text.contains("S"));
        let g1 = text.find("g1").expect("g1");
        let g2 = text.find("g2").expect("g2");
        assert!(g1 < g2);
        assert!(text.contains("- s1"));
        assert!(text.contains("\"q1\""));
        assert!(text.contains("\"q2\""));
        assert!(!text.contains("Progress since your last attempt"));
    }

    #[test]
    fn test_empty_lists_omit_headers() {
        let text = rendered(&bare_response("S"), &RenderContext::default());
        assert!(!text.contains("Knowledge gaps"));
        assert!(!text.contains("Suggestions"));
        assert!(!text.contains("Questions to test yourself"));
    }

    #[test]
    fn test_comparison_sentinel_stays_hidden() {
        let mut response = bare_response("S");
        response.comparison = Some(Comparison {
            summary_of_progress: crate::api::COMPARISON_UNAVAILABLE.to_string(),
            improvements: vec![],
        });
        let text = rendered(&response, &RenderContext::default());
        assert!(!text.contains("Progress since your last attempt"));
        assert!(!text.contains("Unable to generate comparison."));
    }

    #[test]
    fn test_comparison_renders_progress_and_bullets() {
        let mut response = bare_response("S");
        response.comparison = Some(Comparison {
            summary_of_progress: "Clearer than last time.".to_string(),
            improvements: vec!["fewer gaps".to_string(), "less jargon".to_string()],
        });
        let text = rendered(&response, &RenderContext::default());
        assert!(text.contains("Progress since your last attempt"));
        assert!(text.contains("Clearer than last time."));
        assert!(text.contains("- fewer gaps"));
        assert!(text.contains("- less jargon"));
    }

    #[test]
    fn test_speaking_panel_hidden_for_zero_total() {
        let mut response = bare_response("S");
        response.analysis.speaking_metrics = Some(SpeakingMetricsReport {
            total_time_seconds: 0.0,
            active_speaking_seconds: 0.0,
            pause_ratio: 0.0,
            insight: None,
            suggestions: vec![],
        });
        let text = rendered(&response, &RenderContext::default());
        assert!(!text.contains("Speaking delivery"));
    }

    #[test]
    fn test_speaking_panel_renders_rounded_pause_ratio() {
        let mut response = bare_response("S");
        response.analysis.speaking_metrics = Some(SpeakingMetricsReport {
            total_time_seconds: 42.0,
            active_speaking_seconds: 30.0,
            pause_ratio: 0.286,
            insight: Some("Good pace overall.".to_string()),
            suggestions: vec!["Shorten your pauses".to_string()],
        });
        let text = rendered(&response, &RenderContext::default());
        assert!(text.contains("Speaking delivery"));
        assert!(text.contains("42"));
        assert!(text.contains("30"));
        assert!(text.contains("29% pauses"));
        assert!(text.contains("Good pace overall."));
        assert!(text.contains("- Shorten your pauses"));
    }

    #[test]
    fn test_filler_panel_hidden_for_zero_count() {
        let mut response = bare_response("S");
        response.analysis.filler_analysis = Some(FillerAnalysis {
            total_count: 0,
            common_fillers: vec![],
            insight: None,
        });
        let text = rendered(&response, &RenderContext::default());
        assert!(!text.contains("Filler words"));
    }

    #[test]
    fn test_filler_panel_joins_fillers_and_falls_back_on_insight() {
        let mut response = bare_response("S");
        response.analysis.filler_analysis = Some(FillerAnalysis {
            total_count: 5,
            common_fillers: vec!["um".to_string(), "like".to_string()],
            insight: None,
        });
        let text = rendered(&response, &RenderContext::default());
        assert!(text.contains("5 fillers (um, like)"));
        assert!(text.contains("Filler words can blur an otherwise clear explanation."));
    }

    #[test]
    fn test_filler_panel_uses_backend_insight_when_present() {
        let mut response = bare_response("S");
        response.analysis.filler_analysis = Some(FillerAnalysis {
            total_count: 3,
            common_fillers: vec!["uh".to_string()],
            insight: Some("Mostly at sentence starts.".to_string()),
        });
        let text = rendered(&response, &RenderContext::default());
        assert!(text.contains("Mostly at sentence starts."));
    }
}
