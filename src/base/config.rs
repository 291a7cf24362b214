//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc, time::Duration};

use serde::Deserialize;

use super::{
    error::ConfigError,
    types::Destination,
};

/// Default assignee marker that routes an issue to the team chat.
fn default_team_assignee_marker() -> String {
    "ССБ ССБ".to_string()
}

/// Default delay between polling cycles, in seconds.
fn default_poll_interval_secs() -> u64 {
    10
}

/// Default per-request timeout for tracker and chat calls, in seconds.
fn default_http_timeout_secs() -> u64 {
    30
}

/// Default page size for issue listing (Redmine caps this at 100).
fn default_redmine_page_size() -> u32 {
    100
}

/// Default Telegram Bot API endpoint.
fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

/// Configuration for the relay.
///
/// Built once at startup and cheaply cloned into every component.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Redmine base URL (`REDMINE_RELAY_REDMINE_URL`).
    pub redmine_url: String,
    /// Redmine API key (`REDMINE_RELAY_REDMINE_API_KEY`).
    pub redmine_api_key: String,
    /// Identifier of the tracked project (`REDMINE_RELAY_REDMINE_PROJECT_ID`).
    pub redmine_project_id: String,
    /// Telegram bot token (`REDMINE_RELAY_TELEGRAM_BOT_TOKEN`).
    pub telegram_bot_token: String,
    /// Chat for issues assigned to the team (`REDMINE_RELAY_TELEGRAM_TEAM_CHAT_ID`).
    pub telegram_team_chat_id: String,
    /// Chat for every other issue (`REDMINE_RELAY_TELEGRAM_GENERAL_CHAT_ID`).
    pub telegram_general_chat_id: String,
    /// Substring of the assignee name that routes to the team chat (`REDMINE_RELAY_TEAM_ASSIGNEE_MARKER`).
    /// Matching is case-sensitive.
    #[serde(default = "default_team_assignee_marker")]
    pub team_assignee_marker: String,
    /// Seconds to wait between polling cycles (`REDMINE_RELAY_POLL_INTERVAL_SECS`).
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Timeout for a single HTTP request, in seconds (`REDMINE_RELAY_HTTP_TIMEOUT_SECS`).
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// Issues requested per page (`REDMINE_RELAY_REDMINE_PAGE_SIZE`).
    #[serde(default = "default_redmine_page_size")]
    pub redmine_page_size: u32,
    /// Telegram Bot API base URL (`REDMINE_RELAY_TELEGRAM_API_URL`).
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,
    /// Offset applied to tracker timestamps before display, in minutes (`REDMINE_RELAY_DISPLAY_UTC_OFFSET_MINUTES`).
    #[serde(default)]
    pub display_utc_offset_minutes: i32,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("REDMINE_RELAY"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        Self::from_inner(cfg.build()?.try_deserialize()?)
    }

    /// Validates and normalizes raw settings.
    pub fn from_inner(mut inner: ConfigInner) -> Result<Self, ConfigError> {
        let required = [
            ("redmine_url", &inner.redmine_url),
            ("redmine_api_key", &inner.redmine_api_key),
            ("redmine_project_id", &inner.redmine_project_id),
            ("telegram_bot_token", &inner.telegram_bot_token),
            ("telegram_team_chat_id", &inner.telegram_team_chat_id),
            ("telegram_general_chat_id", &inner.telegram_general_chat_id),
            ("team_assignee_marker", &inner.team_assignee_marker),
        ];

        let missing: Vec<&str> = required.iter().filter(|(_, value)| value.trim().is_empty()).map(|(name, _)| *name).collect();
        if !missing.is_empty() {
            return Err(ConfigError::Invalid(format!("missing required settings: {}", missing.join(", "))));
        }

        if inner.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll interval must be at least one second.".to_string()));
        }

        if inner.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid("HTTP timeout must be at least one second.".to_string()));
        }

        if inner.redmine_page_size < 1 || inner.redmine_page_size > 100 {
            return Err(ConfigError::Invalid("Redmine page size must be between 1 and 100.".to_string()));
        }

        if inner.display_utc_offset_minutes.abs() >= 24 * 60 {
            return Err(ConfigError::Invalid("display UTC offset must be within 24 hours.".to_string()));
        }

        let trimmed = inner.redmine_url.trim_end_matches('/').len();
        inner.redmine_url.truncate(trimmed);
        let trimmed = inner.telegram_api_url.trim_end_matches('/').len();
        inner.telegram_api_url.truncate(trimmed);

        Ok(Config { inner: Arc::new(inner) })
    }

    /// The chat identifier a destination resolves to.
    pub fn chat_id(&self, destination: Destination) -> &str {
        match destination {
            Destination::Team => &self.telegram_team_chat_id,
            Destination::General => &self.telegram_general_chat_id,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Permalink to an issue in the tracker UI.
    pub fn issue_url(&self, id: u64) -> String {
        format!("{}/issues/{}", self.redmine_url, id)
    }
}
