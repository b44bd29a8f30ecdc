//! Client configuration loaded from environment variables.

use std::time::Duration;

/// Default backend origin for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// How long a finished generation connection is kept open so the outcome
/// can be shown before the connection is closed.
pub const DEFAULT_CLOSE_DELAY_MS: u64 = 2000;

/// Connection settings shared by the REST and progress clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, e.g. `https://timetable.uni.example`.
    pub base_url: String,
    /// Bearer token supplied out of band, if any.
    pub token: Option<String>,
    /// Timeout applied to every REST request.
    pub request_timeout: Duration,
    /// Delay between a terminal generation event and closing the connection.
    pub close_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            close_delay: Duration::from_millis(DEFAULT_CLOSE_DELAY_MS),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `TIMETABLER_URL`            | `http://localhost:8000` |
    /// | `TIMETABLER_TOKEN`          | --                      |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `GENERATION_CLOSE_DELAY_MS` | `2000`                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = match lookup("TIMETABLER_URL") {
            Some(url) => parse_base_url(&url)?,
            None => defaults.base_url,
        };

        let token = lookup("TIMETABLER_TOKEN")
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => match parse_u64("REQUEST_TIMEOUT_SECS", &raw)? {
                0 => {
                    return Err(ConfigError::Invalid {
                        var: "REQUEST_TIMEOUT_SECS",
                        value: raw,
                        reason: "must be at least 1 second".to_string(),
                    })
                }
                secs => Duration::from_secs(secs),
            },
            None => defaults.request_timeout,
        };

        let close_delay = match lookup("GENERATION_CLOSE_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse_u64("GENERATION_CLOSE_DELAY_MS", &raw)?),
            None => defaults.close_delay,
        };

        Ok(Self {
            base_url,
            token,
            request_timeout,
            close_delay,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        var: "TIMETABLER_URL",
        value: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ConfigError::Invalid {
            var: "TIMETABLER_URL",
            value: raw.to_string(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

fn parse_u64(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: "expected a non-negative integer".to_string(),
    })
}

/// A configuration value could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}
