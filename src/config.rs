//! Runtime settings.
//!
//! Values come from, in increasing priority: built-in defaults, an optional
//! TOML file, `TABLEWATCH_*` environment variables, and finally whatever the
//! binary's command line overrides. Nested keys use a double underscore in
//! the environment, e.g. `TABLEWATCH_SENTINEL__TOKEN=free`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tablewatch_types::{Sentinel, DEFAULT_EVENT_NAME};

use crate::data::duration::serde_duration;
use crate::data::history::DEFAULT_CAPACITY;
use crate::data::MAX_SAMPLE_PERIOD;
use crate::error::ConfigError;
use crate::source::{DecoderConfig, DEFAULT_BAD_LINE_CEILING};
use crate::ui::timeline::{DEFAULT_CELL_HEIGHT, DEFAULT_CELL_WIDTH};
use crate::ui::TimelineRenderer;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TABLEWATCH";

/// What to do when the bad-line circuit breaker trips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OnBadLines {
    /// Exit the process with an error.
    #[default]
    Exit,
    /// Stop ingesting but keep serving; the status goes unknown once stale.
    Stop,
    /// Reset the count, back off and reconnect.
    Restart,
}

impl std::str::FromStr for OnBadLines {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exit" => Ok(Self::Exit),
            "stop" => Ok(Self::Stop),
            "restart" => Ok(Self::Restart),
            other => Err(format!(
                "unknown policy `{}` (expected exit, stop or restart)",
                other
            )),
        }
    }
}

/// All runtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Address the status server binds to.
    pub listen: String,
    /// Event stream URL. Takes priority over `url_file`.
    pub url: Option<String>,
    /// File holding the event stream URL.
    pub url_file: PathBuf,
    /// SSE event name carrying table status.
    pub event_name: String,
    pub sentinel: Sentinel,
    /// Number of history samples kept.
    pub capacity: usize,
    #[serde(with = "serde_duration")]
    pub sample_period: Duration,
    /// Maximum age of a confirmed status before it counts as unknown.
    #[serde(with = "serde_duration")]
    pub staleness: Duration,
    /// Wait between reconnect attempts.
    #[serde(with = "serde_duration")]
    pub backoff: Duration,
    #[serde(with = "serde_duration")]
    pub connect_timeout: Duration,
    /// Longest wait for a complete line on an open stream; `0s` disables.
    #[serde(with = "serde_duration")]
    pub read_timeout: Duration,
    pub bad_line_ceiling: u32,
    pub on_bad_lines: OnBadLines,
    pub cell_width: u32,
    pub cell_height: u32,
    #[serde(with = "serde_duration")]
    pub page_refresh: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8888".to_string(),
            url: None,
            url_file: PathBuf::from("url.txt"),
            event_name: DEFAULT_EVENT_NAME.to_string(),
            sentinel: Sentinel::default(),
            capacity: DEFAULT_CAPACITY,
            sample_period: Duration::from_secs(60),
            staleness: Duration::from_secs(180),
            backoff: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(300),
            bad_line_ceiling: DEFAULT_BAD_LINE_CEILING,
            on_bad_lines: OnBadLines::Exit,
            cell_width: DEFAULT_CELL_WIDTH,
            cell_height: DEFAULT_CELL_HEIGHT,
            page_refresh: Duration::from_secs(60),
        }
    }
}

impl Settings {
    /// Load defaults, then `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// Replace the port of `listen`, keeping its host.
    pub fn set_port(&mut self, port: u16) -> Result<(), ConfigError> {
        let mut addr = self.listen_addr()?;
        addr.set_port(port);
        self.listen = addr.to_string();
        Ok(())
    }

    /// Parsed listen address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen.parse().map_err(|e| ConfigError::Invalid {
            key: "listen",
            reason: format!("`{}`: {}", self.listen, e),
        })
    }

    /// Reject settings the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        if self.capacity == 0 {
            return Err(invalid("capacity", "must be at least 1"));
        }
        if self.sample_period.is_zero() {
            return Err(invalid("sample_period", "must be greater than zero"));
        }
        if self.sample_period > MAX_SAMPLE_PERIOD {
            return Err(invalid("sample_period", "must be at most 24h"));
        }
        if self.cell_width == 0 {
            return Err(invalid("cell_width", "must be at least 1"));
        }
        if self.cell_height == 0 {
            return Err(invalid("cell_height", "must be at least 1"));
        }
        if self.event_name.trim().is_empty() {
            return Err(invalid("event_name", "must not be empty"));
        }
        Ok(())
    }

    /// The stream URL: `url` if set, otherwise the trimmed content of
    /// `url_file`.
    pub fn resolve_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = self.url.as_deref().map(str::trim) {
            if !url.is_empty() {
                return Ok(url.to_string());
            }
        }

        let content =
            std::fs::read_to_string(&self.url_file).map_err(|source| ConfigError::UrlFile {
                path: self.url_file.clone(),
                source,
            })?;

        let url = content.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUrl {
                path: self.url_file.clone(),
            });
        }
        Ok(url.to_string())
    }

    /// Read timeout, or `None` when disabled.
    pub fn read_timeout(&self) -> Option<Duration> {
        (!self.read_timeout.is_zero()).then_some(self.read_timeout)
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            event_name: self.event_name.clone(),
            sentinel: self.sentinel.clone(),
            bad_line_ceiling: self.bad_line_ceiling,
            ..DecoderConfig::default()
        }
    }

    pub fn timeline_renderer(&self) -> TimelineRenderer {
        TimelineRenderer::new(self.cell_width, self.cell_height)
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_string(),
    }
}
