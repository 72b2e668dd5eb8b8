use std::time::Duration;

use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use feynman_coach::app::App;
use feynman_coach::cli::{self, Args};
use feynman_coach::client::{BackendClient, BackendConfig};
use feynman_coach::config::CoachConfig;
use feynman_coach::error::CoachError;
use feynman_coach::speech::{PipeEngine, SpeechEngine};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("{} {}", "error:".bright_red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CoachError> {
    let config = CoachConfig::load_or_default(args.config.as_deref())?;

    let base_url = cli::resolve_base_url(&args.base_url, config.base_url.as_deref());
    let mut backend = BackendConfig::new(base_url);
    if let Some(secs) = config.connect_timeout_secs {
        backend.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = config.request_timeout_secs {
        backend.request_timeout = Duration::from_secs(secs);
    }
    let client = BackendClient::new(backend)?;

    // Speech is a capability: present only when a recognizer command is
    // configured, hidden otherwise.
    let engine: Option<Box<dyn SpeechEngine>> = config
        .speech_command
        .as_deref()
        .map(|command| Box::new(PipeEngine::new(command)) as Box<dyn SpeechEngine>);

    let audience = cli::resolve_audience(&args.audience, config.default_audience.as_deref());

    let mut app = App::new(
        client,
        args.purpose,
        audience,
        engine,
        args.offline_fallback,
        config.char_limit,
    );

    if let Some(path) = &args.source {
        // Upload failures are surfaced but never fatal; the user can try
        // again inside the session.
        if let Err(e) = app.preload_source(path).await {
            eprintln!("{} {}", "upload failed:".bright_red(), e);
        }
    }

    app.run().await
}
