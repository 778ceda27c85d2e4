use std::env;
use std::path::PathBuf;

const DEFAULT_URL: &str = "http://localhost:5000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backend URL: must be HTTP(S)")]
    InvalidScheme,

    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Where the analysis service lives and where exports are written.
///
/// Environment: `TRIBUTOS_URL`, `TRIBUTOS_OUTPUT_DIR`. Command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub output_dir: PathBuf,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// CLI flags merged over `TRIBUTOS_URL` / `TRIBUTOS_OUTPUT_DIR`.
    pub fn load(url_flag: Option<String>, output_flag: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve(
            url_flag,
            output_flag,
            env::var("TRIBUTOS_URL").ok(),
            env::var("TRIBUTOS_OUTPUT_DIR").ok(),
        )
    }

    /// Merges CLI flags over environment values over defaults. Only the winning URL is validated.
    pub fn resolve(
        url_flag: Option<String>,
        output_flag: Option<PathBuf>,
        url_env: Option<String>,
        output_env: Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = non_empty(url_flag)
            .or_else(|| non_empty(url_env))
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        validate_url(&base_url)?;

        let output_dir = output_flag
            .or_else(|| non_empty(output_env).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            output_dir,
        })
    }
}

fn validate_url(raw: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(raw)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ConfigError::InvalidScheme),
    }
}
