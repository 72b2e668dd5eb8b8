//! Interactive controller: the command loop that ties the adapters together.
//!
//! Single-threaded and event-driven. User lines and speech-engine events
//! are multiplexed on one select; all shared state mutation happens here,
//! in the sequence the submission flow prescribes.

use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::AnalyzeResponse;
use crate::client::BackendClient;
use crate::compose::{char_counter, compose, AppState, DEFAULT_CHAR_LIMIT};
use crate::error::CoachError;
use crate::fallback::offline_response;
use crate::history::HistoryPanel;
use crate::render::{render_results, RenderContext};
use crate::session::{InputMode, ModeBus, ModeSignal, Purpose};
use crate::source::{DocumentSource, UploadLabel};
use crate::speech::{CaptureUpdate, EngineEvent, SpeechCapture, SpeechEngine, HINT_TTL};

/// A finished analysis task: the generation it was dispatched under,
/// plus the request outcome.
type AnalysisOutcome = (u64, Result<AnalyzeResponse, CoachError>);

pub struct App {
    client: BackendClient,
    state: AppState,
    capture: SpeechCapture,
    engine: Option<Box<dyn SpeechEngine>>,
    engine_rx: Option<mpsc::UnboundedReceiver<EngineEvent>>,
    history: HistoryPanel,
    source: DocumentSource,
    mode_bus: ModeBus,
    mode_signal: ModeSignal,
    offline_fallback: bool,
    char_limit: usize,
    /// Transient status line with an expiry, pruned each loop pass.
    status: Option<(String, Instant)>,
    /// True while an analysis request is in flight.
    loading: bool,
    /// Staleness guard: each submission is tagged with a generation, and
    /// a finished request whose generation is no longer current is
    /// discarded instead of rendered.
    generation: u64,
    analysis_tx: mpsc::UnboundedSender<AnalysisOutcome>,
    analysis_rx: mpsc::UnboundedReceiver<AnalysisOutcome>,
}

impl App {
    pub fn new(
        client: BackendClient,
        purpose: Purpose,
        audience: String,
        engine: Option<Box<dyn SpeechEngine>>,
        offline_fallback: bool,
        char_limit: Option<usize>,
    ) -> Self {
        let mode_bus = ModeBus::new(purpose);
        let mode_signal = mode_bus.subscribe();
        let (analysis_tx, analysis_rx) = mpsc::unbounded_channel();
        App {
            client,
            state: AppState::new(purpose, audience),
            capture: SpeechCapture::new(),
            engine,
            engine_rx: None,
            history: HistoryPanel::new(),
            source: DocumentSource::new(),
            mode_bus,
            mode_signal,
            offline_fallback,
            char_limit: char_limit.unwrap_or(DEFAULT_CHAR_LIMIT),
            status: None,
            loading: false,
            generation: 0,
            analysis_tx,
            analysis_rx,
        }
    }

    /// Upload an initial reference document before the loop starts.
    pub async fn preload_source(&mut self, path: &str) -> Result<(), CoachError> {
        let len = self.source.upload(&self.client, Path::new(path)).await?;
        self.state.source_text = self.source.text().map(|t| t.to_string());
        println!(
            "{} {} ({} chars of context)",
            "✓".bright_green(),
            self.source.label().text(),
            len
        );
        Ok(())
    }

    pub async fn run(&mut self) -> Result<(), CoachError> {
        let run_id = Uuid::new_v4();
        info!(%run_id, base_url = self.client.base_url(), "coach session started");
        self.print_banner();

        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            self.prune_status();
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if !self.dispatch(line.trim()).await? {
                        break;
                    }
                }
                Some((generation, outcome)) = self.analysis_rx.recv() => {
                    self.on_analysis(generation, outcome)?;
                }
                Some(event) = engine_events(&mut self.engine_rx) => {
                    self.on_engine_event(event);
                }
            }
        }
        Ok(())
    }

    fn print_banner(&self) {
        println!("{}", "Mr. Feynman — explain it simply".bold().bright_cyan());
        println!("Type your explanation; lines starting with / are commands.");
        println!(
            "  /concept <name>   /audience <who>   /mode <learning|interview>\n  \
             /source <path>    /history          /pick <n>\n  \
             /show             /clear            /submit           /quit"
        );
        if self.engine.is_some() {
            println!("  /record toggles speech capture.");
        }
        println!();
    }

    // -----------------------------------------------------------------------
    // Input dispatch
    // -----------------------------------------------------------------------

    /// Returns `false` when the loop should exit.
    async fn dispatch(&mut self, line: &str) -> Result<bool, CoachError> {
        if line.is_empty() {
            return Ok(true);
        }
        if !line.starts_with('/') {
            self.append_explanation(line);
            return Ok(true);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "/concept" => {
                self.state.form.concept = rest.to_string();
                println!("concept: {}", self.state.form.concept.bright_white());
            }
            "/audience" => {
                self.state.form.audience = rest.to_string();
                println!("audience: {}", self.state.form.audience.bright_white());
            }
            "/mode" => self.change_mode(rest),
            "/show" => self.show_form(),
            "/clear" => {
                self.state.form.explanation.clear();
                println!("{}", char_counter("", self.char_limit).dimmed());
            }
            "/record" => self.toggle_recording(),
            "/stop" => self.stop_recording(),
            "/source" => self.upload_source(rest).await,
            "/history" => self.toggle_history().await,
            "/pick" => self.pick_history(rest),
            "/submit" => self.submit(),
            "/quit" | "/q" => return Ok(false),
            other => println!("{} unknown command {}", "?".bright_yellow(), other),
        }
        Ok(true)
    }

    fn append_explanation(&mut self, line: &str) {
        if self.capture.is_listening() {
            // The recognizer owns the text field while listening.
            println!("{}", "(finish recording before typing)".dimmed());
            return;
        }
        if !self.state.form.explanation.is_empty() {
            self.state.form.explanation.push('\n');
        }
        self.state.form.explanation.push_str(line);
        // Another input action supersedes any transient hint.
        self.status = None;
        println!(
            "{}",
            char_counter(&self.state.form.explanation, self.char_limit).dimmed()
        );
    }

    fn show_form(&mut self) {
        println!("concept:  {}", self.state.form.concept);
        println!("audience: {}", self.state.form.audience);
        println!("mode:     {}", self.state.purpose);
        println!("source:   {}", self.source.label().text());
        if self.state.purpose == Purpose::Interview {
            println!(
                "session:  {} (turn {})",
                self.state.session.session_id.as_deref().unwrap_or("-"),
                self.state.session.turn_index
            );
        }
        println!("---");
        println!("{}", self.state.form.explanation);
        println!(
            "{}",
            char_counter(&self.state.form.explanation, self.char_limit).dimmed()
        );
    }

    // -----------------------------------------------------------------------
    // Mode handling
    // -----------------------------------------------------------------------

    fn change_mode(&mut self, value: &str) {
        let purpose = match value {
            "learning" => Purpose::Learning,
            "interview" => Purpose::Interview,
            other => {
                println!("{} unknown mode {}", "?".bright_yellow(), other);
                return;
            }
        };
        self.mode_bus.publish(purpose);
        self.apply_mode_change();
        println!("mode: {}", purpose.to_string().bright_white());
    }

    /// Drain the mode signal; a change resets the interview session.
    fn apply_mode_change(&mut self) {
        if let Some(purpose) = self.mode_signal.take_change() {
            self.state.purpose = purpose;
            self.state.session.reset();
        }
    }

    // -----------------------------------------------------------------------
    // Speech capture
    // -----------------------------------------------------------------------

    fn toggle_recording(&mut self) {
        if self.capture.is_listening() {
            self.stop_recording();
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            let e = CoachError::SpeechUnavailable;
            println!("{}", format!("({})", e).dimmed());
            return;
        };
        match engine.start() {
            Ok(rx) => {
                self.capture
                    .begin(&self.state.form.explanation, Instant::now());
                self.state.input_mode = InputMode::Speech;
                self.engine_rx = Some(rx);
                println!("{}", "● recording — /record again to stop".bright_red());
            }
            Err(e) => {
                warn!(error = %e, "speech engine failed to start");
                println!("{}", "(could not start the recognizer)".dimmed());
            }
        }
    }

    fn stop_recording(&mut self) {
        if !self.capture.is_listening() {
            return;
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
        // Ended arrives on the event channel and finalizes metrics there.
    }

    fn on_engine_event(&mut self, event: EngineEvent) {
        match self.capture.handle_event(event, Instant::now()) {
            CaptureUpdate::None => {}
            CaptureUpdate::Text(text) => {
                self.state.form.explanation = text;
                // Mirror the synthetic input event: counter stays in sync.
                println!(
                    "{}",
                    char_counter(&self.state.form.explanation, self.char_limit).dimmed()
                );
            }
            CaptureUpdate::Failed(message) => {
                // Logged only; the session aborts via its own Ended event.
                warn!(%message, "speech recognition error");
            }
            CaptureUpdate::Ended(outcome) => {
                self.state.speaking = Some(outcome);
                println!("{}", "recording stopped".dimmed());
                if outcome.hint_worthy() {
                    self.set_status(
                        "Captured your spoken explanation — review it, then /submit".to_string(),
                    );
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Upload & history
    // -----------------------------------------------------------------------

    async fn upload_source(&mut self, path: &str) {
        if path.is_empty() {
            println!("usage: /source <path>");
            return;
        }
        println!("{}", self.label_line(UploadLabel::Busy));
        match self.source.upload(&self.client, Path::new(path)).await {
            Ok(len) => {
                self.state.source_text = self.source.text().map(|t| t.to_string());
                println!("{}", self.label_line(UploadLabel::Added));
                println!(
                    "{}",
                    format!(
                        "Your explanation will be checked against {} chars of source context.",
                        len
                    )
                    .dimmed()
                );
            }
            Err(e) => {
                println!(
                    "{} {}",
                    self.label_line(UploadLabel::Failed),
                    e.to_string().dimmed()
                );
            }
        }
    }

    fn label_line(&self, label: UploadLabel) -> ColoredString {
        match label {
            UploadLabel::Busy => label.text().bright_yellow(),
            UploadLabel::Added => label.text().bright_green(),
            UploadLabel::Failed => label.text().bright_red(),
            UploadLabel::Idle => label.text().normal(),
        }
    }

    async fn toggle_history(&mut self) {
        match self.history.toggle(&self.client).await {
            Ok(true) => {
                let mut out = std::io::stdout();
                if let Err(e) = self.history.render(&mut out) {
                    error!(error = %e, "history render failed");
                }
                let _ = out.flush();
            }
            Ok(false) => println!("{}", "(history hidden)".dimmed()),
            Err(e) => {
                warn!(error = %e, "history fetch failed");
                println!("{}", "could not load history".bright_red());
            }
        }
    }

    fn pick_history(&mut self, arg: &str) {
        let Ok(index) = arg.parse::<usize>() else {
            println!("usage: /pick <n>");
            return;
        };
        let Some(entry) = self.history.pick(index) else {
            println!("no attempt at {}", index);
            return;
        };
        self.state.form.concept = entry.concept.clone();
        self.state.form.explanation = entry.explanation_text.clone();
        self.state.last_attempt_id = Some(entry.attempt_id.clone());
        println!(
            "{}",
            "Loaded a previous attempt — this submission will be scored as a revision".dimmed()
        );
        self.show_form();
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Compose the form and dispatch it on its own task. Another `/submit`
    /// while one is in flight supersedes it: the generation advances and
    /// the older result is discarded when it arrives.
    fn submit(&mut self) {
        // A mode change published since the last poll lands before compose.
        self.apply_mode_change();

        let Some(request) = compose(&self.state) else {
            // Missing concept or explanation: silent no-op per the form's
            // contract, no error shown.
            return;
        };

        if self.loading {
            println!("{}", "(replacing the analysis still in flight)".dimmed());
        }
        self.generation += 1;
        let generation = self.generation;
        self.set_loading(true);

        let client = self.client.clone();
        let tx = self.analysis_tx.clone();
        tokio::spawn(async move {
            let outcome = client.analyze(&request).await;
            // Receiver lives as long as the app; a send failure only
            // happens during shutdown.
            let _ = tx.send((generation, outcome));
        });
    }

    /// Apply a finished analysis. A result from a superseded generation
    /// is dropped without touching any state; the newer request still in
    /// flight owns the loading indicator.
    fn on_analysis(
        &mut self,
        generation: u64,
        outcome: Result<AnalyzeResponse, CoachError>,
    ) -> Result<(), CoachError> {
        if generation != self.generation {
            warn!(
                generation,
                current = self.generation,
                "discarding superseded analysis response"
            );
            return Ok(());
        }

        let rendered = match outcome {
            Ok(response) => {
                if let Some(id) = &response.attempt_id {
                    self.state.last_attempt_id = Some(id.clone());
                }
                self.state.session.observe(&response);
                self.render_response(&response)
            }
            Err(e) => {
                error!(error = %e, "analysis request failed");
                if self.offline_fallback {
                    self.render_response(&offline_response())
                } else {
                    println!("{} {}", "analysis failed:".bright_red().bold(), e);
                    Ok(())
                }
            }
        };

        // Input mode and loading state reset even when rendering failed.
        self.state.spend_input_mode();
        self.set_loading(false);
        rendered.map_err(CoachError::from)
    }

    fn render_response(&self, response: &AnalyzeResponse) -> io::Result<()> {
        let ctx = RenderContext {
            has_source: self.source.is_present(),
        };
        let mut out = io::stdout();
        render_results(&mut out, response, &ctx)?;
        out.flush()
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if loading {
            println!("{}", "Analyzing...".bright_yellow());
        }
    }

    // -----------------------------------------------------------------------
    // Transient status
    // -----------------------------------------------------------------------

    fn set_status(&mut self, message: String) {
        println!("{}", message.bright_green());
        self.status = Some((message, Instant::now() + HINT_TTL));
    }

    fn prune_status(&mut self) {
        if let Some((_, expires_at)) = &self.status {
            if Instant::now() >= *expires_at {
                self.status = None;
            }
        }
    }
}

/// Receive from the speech engine when one is wired up; pends forever
/// otherwise so the branch stays quiet in the select loop. Clears the
/// receiver once the engine closes its channel.
async fn engine_events(
    rx: &mut Option<mpsc::UnboundedReceiver<EngineEvent>>,
) -> Option<EngineEvent> {
    match rx {
        Some(receiver) => {
            let event = receiver.recv().await;
            if event.is_none() {
                *rx = None;
            }
            event
        }
        None => std::future::pending().await,
    }
}
