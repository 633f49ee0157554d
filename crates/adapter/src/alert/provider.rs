use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::convert::{map_status_to_state, AlertmanagerAlert};
use super::AlertProvider;
use crate::config::{AlertConfig, ALERT_REQUEST_TIMEOUT};
use crate::schema::{Alert, AlertQuery};
use crate::{read_body, Error, Result};

/// Alert provider backed by the Alertmanager v2 API.
#[derive(Debug, Clone)]
pub struct AlertmanagerProvider {
    base_url: String,
    client: Client,
}

impl AlertmanagerProvider {
    pub fn new(config: AlertConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(ALERT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.alertmanager_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetches the raw alert list, narrowed by the given `filter` matchers.
    async fn fetch(&self, filters: &[String]) -> Result<Vec<AlertmanagerAlert>> {
        let url = format!("{}/api/v2/alerts", self.base_url);
        let params: Vec<(&str, &str)> = filters.iter().map(|f| ("filter", f.as_str())).collect();

        debug!(url = %url, filters = ?filters, "Querying Alertmanager");
        let response = self.client.get(&url).query(&params).send().await?;
        let body = read_body(response, "alertmanager").await?;

        // A `null` body is an empty list.
        let alerts: Vec<AlertmanagerAlert> =
            serde_json::from_str::<Option<Vec<_>>>(&body)?.unwrap_or_default();
        debug!(count = alerts.len(), "Alertmanager returned alerts");
        Ok(alerts)
    }
}

/// Builds the Alertmanager `filter` matchers for a query: states first, then
/// severities, then the scope labels.
pub fn build_filters(query: &AlertQuery) -> Vec<String> {
    let states = query
        .statuses
        .iter()
        .map(|status| format!("state=\"{}\"", map_status_to_state(status)));
    let severities = query
        .severities
        .iter()
        .map(|severity| format!("severity=\"{}\"", severity));
    let scope = query
        .scope
        .label_pairs()
        .into_iter()
        .map(|(label, value)| format!("{}=\"{}\"", label, value));

    states.chain(severities).chain(scope).collect()
}

#[async_trait]
impl AlertProvider for AlertmanagerProvider {
    async fn query(&self, query: &AlertQuery) -> Result<Vec<Alert>> {
        let filters = build_filters(query);
        let mut alerts: Vec<Alert> = self
            .fetch(&filters)
            .await?
            .into_iter()
            .map(AlertmanagerAlert::into_alert)
            .collect();

        // Zero or negative means unlimited.
        if let Ok(limit) = usize::try_from(query.limit) {
            if limit > 0 && limit < alerts.len() {
                alerts.truncate(limit);
            }
        }
        Ok(alerts)
    }

    async fn get(&self, id: &str) -> Result<Alert> {
        // No single-alert endpoint upstream; scan the full list.
        self.fetch(&[])
            .await?
            .into_iter()
            .find(|alert| alert.fingerprint == id)
            .map(AlertmanagerAlert::into_alert)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}
