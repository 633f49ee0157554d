use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use crate::{Error, Result};

pub const DEFAULT_ALERTMANAGER_URL: &str = "http://localhost:9093";
pub const DEFAULT_PROMETHEUS_URL: &str = "http://localhost:9090";

/// Request timeout applied to every Alertmanager call.
pub const ALERT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertConfig {
    pub alertmanager_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricConfig {
    pub url: String,
    /// `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl AlertConfig {
    /// Validates the key-value bag handed over by the plugin host.
    pub fn from_map(config: &Map<String, Value>) -> Result<Self> {
        let mut problems = Vec::new();
        let alertmanager_url = required_url(config, "alertmanagerURL", &mut problems);
        finish(problems)?;

        Ok(Self {
            alertmanager_url: alertmanager_url.unwrap_or_default(),
        })
    }

    /// Checks a config built in code; providers call this on construction.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        check_url("alertmanagerURL", &self.alertmanager_url, &mut problems);
        finish(problems)
    }

    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Map::new();
        config.insert(
            "alertmanagerURL".to_string(),
            Value::String(env_or_default("ALERTMANAGER_URL", DEFAULT_ALERTMANAGER_URL)),
        );
        Self::from_map(&config)
    }
}

impl MetricConfig {
    pub fn from_map(config: &Map<String, Value>) -> Result<Self> {
        let mut problems = Vec::new();
        let url = required_url(config, "url", &mut problems);
        let timeout = optional_seconds(config, "timeoutSeconds", &mut problems);
        finish(problems)?;

        Ok(Self {
            url: url.unwrap_or_default(),
            timeout,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        check_url("url", &self.url, &mut problems);
        if self.timeout == Some(Duration::ZERO) {
            problems.push("config field timeoutSeconds must be a positive integer".to_string());
        }
        finish(problems)
    }

    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Map::new();
        config.insert(
            "url".to_string(),
            Value::String(env_or_default("PROMETHEUS_URL", DEFAULT_PROMETHEUS_URL)),
        );
        if let Ok(raw) = std::env::var("PROMETHEUS_TIMEOUT_SECONDS") {
            let value = raw
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or(Value::String(raw));
            config.insert("timeoutSeconds".to_string(), value);
        }
        Self::from_map(&config)
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            alertmanager_url: DEFAULT_ALERTMANAGER_URL.to_string(),
        }
    }
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROMETHEUS_URL.to_string(),
            timeout: None,
        }
    }
}

fn env_or_default(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => {
            tracing::warn!("{} not set, defaulting to {}", key, default);
            default.to_string()
        }
    }
}

fn required_url(config: &Map<String, Value>, key: &str, problems: &mut Vec<String>) -> Option<String> {
    match config.get(key) {
        None | Some(Value::Null) => {
            problems.push(format!("missing required config field: {}", key));
            None
        }
        Some(Value::String(raw)) => check_url(key, raw, problems),
        Some(other) => {
            problems.push(format!("config field {} must be a string, got {}", key, type_name(other)));
            None
        }
    }
}

/// Accepts absolute http(s) URLs, returning them without a trailing slash.
fn check_url(key: &str, raw: &str, problems: &mut Vec<String>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        problems.push(format!("missing required config field: {}", key));
        return None;
    }

    match Url::parse(raw) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            Some(raw.trim_end_matches('/').to_string())
        }
        Ok(url) => {
            problems.push(format!("config field {} has unsupported scheme {}", key, url.scheme()));
            None
        }
        Err(e) => {
            problems.push(format!("config field {} is not a valid URL: {}", key, e));
            None
        }
    }
}

fn optional_seconds(config: &Map<String, Value>, key: &str, problems: &mut Vec<String>) -> Option<Duration> {
    match config.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => match n.as_u64() {
            Some(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                problems.push(format!("config field {} must be a positive integer", key));
                None
            }
        },
        Some(other) => {
            problems.push(format!("config field {} must be a number, got {}", key, type_name(other)));
            None
        }
    }
}

fn finish(problems: Vec<String>) -> Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(problems.join("; ")))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
