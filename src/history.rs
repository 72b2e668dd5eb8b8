//! Past-attempt history panel: toggle, fetch-on-open, cached while open.

use std::io::{self, Write};

use colored::*;

use crate::api::HistoryEntry;
use crate::client::BackendClient;
use crate::error::CoachError;

/// Locale-ish time-of-day from the backend's ISO-8601 timestamps. The
/// backend emits naive UTC timestamps without an offset; tolerate both.
pub fn format_time_of_day(timestamp: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp) {
        return dt.format("%H:%M:%S").to_string();
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%H:%M:%S").to_string();
    }
    timestamp.to_string()
}

/// Toggleable list of past attempts. Opening fetches a fresh list; the
/// cache lives only while the panel stays open.
pub struct HistoryPanel {
    visible: bool,
    entries: Vec<HistoryEntry>,
}

impl HistoryPanel {
    pub fn new() -> Self {
        HistoryPanel {
            visible: false,
            entries: Vec::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Open (fetching the list) or close (keeping the cache). Returns
    /// whether the panel is now visible.
    pub async fn toggle(&mut self, client: &BackendClient) -> Result<bool, CoachError> {
        if self.visible {
            self.visible = false;
            return Ok(false);
        }
        self.entries = client.history().await?;
        self.visible = true;
        Ok(true)
    }

    /// Look up a 1-based row index as shown in the rendered panel.
    pub fn pick(&self, index: usize) -> Option<&HistoryEntry> {
        if index == 0 {
            return None;
        }
        self.entries.get(index - 1)
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", "Past attempts".bold().bright_cyan())?;
        if self.entries.is_empty() {
            writeln!(out, "  {}", "No attempts yet".dimmed())?;
            return Ok(());
        }
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(
                out,
                "  {} {}  {}",
                format!("[{}]", i + 1).bright_yellow(),
                entry.concept,
                format_time_of_day(&entry.timestamp).dimmed()
            )?;
        }
        Ok(())
    }
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, concept: &str, ts: &str) -> HistoryEntry {
        HistoryEntry {
            attempt_id: id.to_string(),
            concept: concept.to_string(),
            explanation_text: format!("{} explained", concept),
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn test_format_naive_iso_timestamp() {
        assert_eq!(
            format_time_of_day("2026-08-30T14:03:52.123456"),
            "14:03:52"
        );
    }

    #[test]
    fn test_format_rfc3339_timestamp() {
        assert_eq!(format_time_of_day("2026-08-30T14:03:52+00:00"), "14:03:52");
    }

    #[test]
    fn test_format_unparseable_timestamp_passes_through() {
        assert_eq!(format_time_of_day("yesterday-ish"), "yesterday-ish");
    }

    #[test]
    fn test_pick_is_one_based() {
        let mut panel = HistoryPanel::new();
        panel.entries = vec![
            entry("a-1", "entropy", "2026-08-30T09:00:00"),
            entry("a-2", "osmosis", "2026-08-30T10:00:00"),
        ];
        assert_eq!(panel.pick(1).map(|e| e.attempt_id.as_str()), Some("a-1"));
        assert_eq!(panel.pick(2).map(|e| e.attempt_id.as_str()), Some("a-2"));
        assert!(panel.pick(0).is_none());
        assert!(panel.pick(3).is_none());
    }

    #[test]
    fn test_render_empty_list_shows_placeholder() {
        colored::control::set_override(false);
        let panel = HistoryPanel::new();
        let mut buf = Vec::new();
        panel.render(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("No attempts yet"));
    }

    #[test]
    fn test_render_rows_show_concept_and_time() {
        colored::control::set_override(false);
        let mut panel = HistoryPanel::new();
        panel.entries = vec![entry("a-1", "entropy", "2026-08-30T09:15:00")];
        let mut buf = Vec::new();
        panel.render(&mut buf).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("[1] entropy"));
        assert!(text.contains("09:15:00"));
    }

    #[tokio::test]
    async fn test_toggle_close_keeps_cache_without_fetch() {
        use crate::client::BackendConfig;
        // Client points at an unroutable host; closing must not touch it.
        let client = BackendClient::new(BackendConfig::new("http://127.0.0.1:1")).expect("client");
        let mut panel = HistoryPanel::new();
        panel.visible = true;
        panel.entries = vec![entry("a-1", "entropy", "2026-08-30T09:00:00")];
        let visible = panel.toggle(&client).await.expect("close is local");
        assert!(!visible);
        assert_eq!(panel.entries().len(), 1);
    }
}
