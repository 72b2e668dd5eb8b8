use crate::session::Purpose;
use clap::Parser;

/// CLI-default base URL; an explicit config-file entry overrides it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// CLI-default target audience, same override rule.
pub const DEFAULT_AUDIENCE: &str = "5-year-old";

#[derive(Parser)]
#[command(name = "feynman-coach")]
#[command(version = "1.0.0")]
#[command(about = "Explain a concept, get structured feedback from the Mr. Feynman backend")]
pub struct Args {
    /// Backend base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Path to a coach.toml config file
    #[arg(long)]
    pub config: Option<String>,

    /// Purpose mode: learning (one-shot feedback) or interview (multi-turn)
    #[arg(long, value_enum, default_value = "learning")]
    pub purpose: Purpose,

    /// Target audience for the explanation
    #[arg(long, default_value = DEFAULT_AUDIENCE)]
    pub audience: String,

    /// Reference document to upload before the first attempt
    #[arg(long)]
    pub source: Option<String>,

    /// Render a canned result set when the backend is unreachable.
    /// UI-testing affordance only — real failures are masked.
    #[arg(long)]
    pub offline_fallback: bool,
}

/// Pick the effective base URL: a CLI value that is still the built-in
/// default yields to an explicit config-file entry.
pub fn resolve_base_url(cli_value: &str, config_value: Option<&str>) -> String {
    if cli_value == DEFAULT_BASE_URL {
        config_value.unwrap_or(cli_value).to_string()
    } else {
        cli_value.to_string()
    }
}

/// Same rule for the target audience.
pub fn resolve_audience(cli_value: &str, config_value: Option<&str>) -> String {
    if cli_value == DEFAULT_AUDIENCE {
        config_value.unwrap_or(cli_value).to_string()
    } else {
        cli_value.to_string()
    }
}
