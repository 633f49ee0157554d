pub mod alert;
pub mod config;
pub mod metric;
pub mod schema;

use thiserror::Error;

pub use alert::{AlertProvider, AlertmanagerProvider};
pub use config::{AlertConfig, MetricConfig};
pub use metric::{MetricProvider, PrometheusProvider};

/// Registry key shared by the alert and metric adapters.
pub const PROVIDER_NAME: &str = "prometheus";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Missing query expression")]
    MissingExpression,
    #[error("Alert not found: {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(format!("execute request: {}", err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Upstream(format!("decode response: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Reads a response body, turning a non-success status into an upstream error
/// that carries the status and whatever the server sent back.
pub(crate) async fn read_body(response: reqwest::Response, api: &str) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(Error::Upstream(format!(
            "{} API error: {} {}",
            api,
            status.as_u16(),
            body.trim()
        )));
    }
    Ok(body)
}
