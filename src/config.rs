//! Optional `coach.toml` configuration.
//!
//! Every field is optional; CLI flags win over file values, and anything
//! unset falls back to a built-in default. A missing file is not an error —
//! only a file that exists but cannot be read or parsed is.

use std::path::Path;

use serde::Deserialize;

use crate::error::CoachError;

/// Default file probed when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "coach.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoachConfig {
    /// Backend base URL, e.g. `http://localhost:8000`.
    pub base_url: Option<String>,
    /// Default target audience when the CLI flag is not given.
    pub default_audience: Option<String>,
    /// Informational character cap shown by the counter.
    pub char_limit: Option<usize>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    /// External line-oriented recognizer command. When unset, speech
    /// capture is unavailable and the record control is hidden.
    pub speech_command: Option<String>,
}

impl CoachConfig {
    pub fn load(path: &Path) -> Result<Self, CoachError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CoachError::Config {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| CoachError::Config {
            path: path.display().to_string(),
            detail: e.to_string(),
        })
    }

    /// Load from an explicit path, or from `coach.toml` if it exists,
    /// or fall back to defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self, CoachError> {
        match path {
            Some(p) => Self::load(Path::new(p)),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_all_none() {
        let c = CoachConfig::default();
        assert!(c.base_url.is_none());
        assert!(c.speech_command.is_none());
        assert!(c.char_limit.is_none());
    }

    #[test]
    fn test_load_full_config() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(
            file,
            r#"
base_url = "http://feynman.local:9000"
default_audience = "college freshman"
char_limit = 4000
connect_timeout_secs = 2
request_timeout_secs = 120
speech_command = "whisper-stream --stdout"
"#
        )
        .expect("write");
        let c = CoachConfig::load(file.path()).expect("load");
        assert_eq!(c.base_url.as_deref(), Some("http://feynman.local:9000"));
        assert_eq!(c.default_audience.as_deref(), Some("college freshman"));
        assert_eq!(c.char_limit, Some(4000));
        assert_eq!(c.connect_timeout_secs, Some(2));
        assert_eq!(c.request_timeout_secs, Some(120));
        assert_eq!(c.speech_command.as_deref(), Some("whisper-stream --stdout"));
    }

    #[test]
    fn test_load_partial_config() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, r#"base_url = "http://localhost:8000""#).expect("write");
        let c = CoachConfig::load(file.path()).expect("load");
        assert!(c.base_url.is_some());
        assert!(c.default_audience.is_none());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = CoachConfig::load(Path::new("/nonexistent/coach.toml")).unwrap_err();
        assert!(matches!(err, CoachError::Config { .. }));
    }

    #[test]
    fn test_load_malformed_toml_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "base_url = [broken").expect("write");
        let err = CoachConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, CoachError::Config { .. }));
    }

    #[test]
    fn test_load_or_default_without_path() {
        // No coach.toml in the test cwd is not guaranteed, so only check
        // the explicit-path branch errs on a missing file.
        let err = CoachConfig::load_or_default(Some("/nonexistent/coach.toml")).unwrap_err();
        assert!(matches!(err, CoachError::Config { .. }));
    }
}
