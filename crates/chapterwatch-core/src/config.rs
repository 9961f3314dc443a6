use std::fmt;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const DEFAULT_INTERVAL_SECS: u64 = 2 * 60 * 60; // every two hours
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SERIES_NAME: &str = "One Piece";
pub const DEFAULT_SERIES_SLUG: &str = "one-piece";

/// Top-level config (chapterwatch.toml + CHAPTERWATCH_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterwatchConfig {
    /// Raise the default log level to `debug`.
    #[serde(default)]
    pub debug: bool,
    pub telegram: TelegramConfig,
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
}

// Keep the token out of logs.
impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

/// Where and how often to look for the next chapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Page that is fetched on every poll.
    pub url: String,
    /// Prefix joined with the matched path fragment. Defaults to `url`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Human-readable series name used in messages, e.g. "One Piece".
    #[serde(default = "default_series_name")]
    pub series_name: String,
    /// URL slug of the series, e.g. "one-piece".
    #[serde(default = "default_series_slug")]
    pub series_slug: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ScrapeConfig {
    /// Base URL with any trailing `/` removed, so joining it with a
    /// `/chapters/...` fragment never produces `//`.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(&self.url)
            .trim_end_matches('/')
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl DatabaseConfig {
    /// `path` with a leading `~/` expanded to `$HOME`.
    pub fn resolved_path(&self) -> String {
        match self.path.strip_prefix("~/") {
            Some(rest) => format!("{}/{}", home_dir(), rest),
            None => self.path.clone(),
        }
    }

    /// Create the directory holding the database file. Returns the resolved path.
    pub fn ensure_parent_dir(&self) -> Result<String> {
        let path = self.resolved_path();
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(path)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_series_name() -> String {
    DEFAULT_SERIES_NAME.to_string()
}
fn default_series_slug() -> String {
    DEFAULT_SERIES_SLUG.to_string()
}
fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_user_agent() -> String {
    format!("chapterwatch/{}", env!("CARGO_PKG_VERSION"))
}
fn default_db_path() -> String {
    format!("{}/.chapterwatch/chapterwatch.db", home_dir())
}
fn home_dir() -> String {
    std::env::var("HOME").unwrap_or_else(|_| ".".to_string())
}

impl ChapterwatchConfig {
    /// Load config from a TOML file with env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. `CHAPTERWATCH_CONFIG`
    ///   3. ~/.chapterwatch/chapterwatch.toml
    ///
    /// `CHAPTERWATCH_SCRAPE__INTERVAL_SECS=60` style variables override file
    /// values. The older `TELEGRAM_HTTP_API_TOKEN`, `SCRAPE_URL` and `DEBUG`
    /// names are still accepted.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .or_else(|| std::env::var("CHAPTERWATCH_CONFIG").ok())
            .unwrap_or_else(default_config_path);
        tracing::debug!(%path, "loading config");

        let mut figment = Figment::new()
            .merge(Toml::file(&path))
            .merge(legacy_env());
        if let Some(debug) = legacy_debug() {
            figment = figment.merge(Serialized::default("debug", debug));
        }
        let figment =
            figment.merge(Env::prefixed("CHAPTERWATCH_").ignore(&["CONFIG"]).split("__"));

        Self::from_figment(figment)
    }

    /// Extract and validate from an already-assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: ChapterwatchConfig = figment
            .extract()
            .map_err(|e| CoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the bot useless at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(CoreError::Config("telegram.bot_token is empty".into()));
        }
        if self.scrape.url.trim().is_empty() {
            return Err(CoreError::Config("scrape.url is empty".into()));
        }
        if self.scrape.series_slug.trim().is_empty() {
            return Err(CoreError::Config("scrape.series_slug is empty".into()));
        }
        if self.scrape.interval_secs == 0 {
            return Err(CoreError::Config(
                "scrape.interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Unprefixed variable names kept from the first deployment.
fn legacy_env() -> Env {
    Env::raw()
        .only(&["TELEGRAM_HTTP_API_TOKEN", "SCRAPE_URL"])
        .map(|key| {
            if key.as_str().eq_ignore_ascii_case("TELEGRAM_HTTP_API_TOKEN") {
                "telegram.bot_token".into()
            } else {
                "scrape.url".into()
            }
        })
}

/// Legacy `DEBUG` switch: on only for `true`, off for any other value.
///
/// `DEBUG` is often set by unrelated tooling (`DEBUG=1`, `DEBUG=*`), so it is
/// never parsed as a strict boolean.
fn legacy_debug() -> Option<bool> {
    std::env::var_os("DEBUG").map(|value| debug_flag(&value.to_string_lossy()))
}

fn debug_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn default_config_path() -> String {
    format!("{}/.chapterwatch/chapterwatch.toml", home_dir())
}
