use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::controller::{ListOptions, LoadingGate};

const DEFAULT_SETTINGS_FILE: &str = "booking.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid server_url '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub server_url: String,
    pub empty_state_delay_ms: u64,
    pub loading_gate: LoadingGate,
    pub session_file: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://192.168.28.198:3001".into(),
            empty_state_delay_ms: 3000,
            loading_gate: LoadingGate::Timer,
            session_file: PathBuf::from("session.json"),
            request_timeout_secs: 15,
        }
    }
}

impl ClientSettings {
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            empty_state_delay: Duration::from_millis(self.empty_state_delay_ms),
            loading_gate: self.loading_gate,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Defaults, then the settings file, then `BOOKING__*` environment overrides.
/// Without an explicit path, `booking.toml` is read only if it exists.
pub fn load_settings(path: Option<&Path>) -> Result<ClientSettings, SettingsError> {
    let settings = match path {
        Some(path) => read_settings_file(path)?,
        None if Path::new(DEFAULT_SETTINGS_FILE).exists() => {
            read_settings_file(Path::new(DEFAULT_SETTINGS_FILE))?
        }
        None => ClientSettings::default(),
    };
    let settings = apply_env_overrides(settings, |key| std::env::var(key).ok())?;
    validate(settings)
}

fn read_settings_file(path: &Path) -> Result<ClientSettings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn apply_env_overrides<F>(
    mut settings: ClientSettings,
    lookup: F,
) -> Result<ClientSettings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("BOOKING__SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("BOOKING__EMPTY_STATE_DELAY_MS") {
        settings.empty_state_delay_ms =
            v.trim().parse().map_err(|_| SettingsError::InvalidValue {
                key: "empty_state_delay_ms",
                value: v.clone(),
            })?;
    }
    if let Some(v) = lookup("BOOKING__LOADING_GATE") {
        settings.loading_gate = match v.trim() {
            "timer" => LoadingGate::Timer,
            "fetch_settled" => LoadingGate::FetchSettled,
            _ => {
                return Err(SettingsError::InvalidValue {
                    key: "loading_gate",
                    value: v.clone(),
                })
            }
        };
    }
    if let Some(v) = lookup("BOOKING__SESSION_FILE") {
        settings.session_file = PathBuf::from(v);
    }
    if let Some(v) = lookup("BOOKING__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs =
            v.trim().parse().map_err(|_| SettingsError::InvalidValue {
                key: "request_timeout_secs",
                value: v.clone(),
            })?;
    }
    Ok(settings)
}

fn validate(mut settings: ClientSettings) -> Result<ClientSettings, SettingsError> {
    let trimmed = settings.server_url.trim().trim_end_matches('/').to_string();
    let parsed = Url::parse(&trimmed).map_err(|err| SettingsError::InvalidUrl {
        value: settings.server_url.clone(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(SettingsError::InvalidUrl {
            value: settings.server_url,
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if settings.request_timeout_secs == 0 {
        return Err(SettingsError::InvalidValue {
            key: "request_timeout_secs",
            value: "0".into(),
        });
    }
    settings.server_url = trimmed;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
