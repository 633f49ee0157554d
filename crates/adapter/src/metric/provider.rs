use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::debug;

use super::promql::build_promql;
use super::response::{into_descriptors, ApiResponse, QueryData};
use super::MetricProvider;
use crate::config::MetricConfig;
use crate::schema::{MetricDescriptor, MetricQuery, MetricSeries, QueryScope};
use crate::{read_body, Error, Result};

/// Metric provider backed by the Prometheus HTTP API.
#[derive(Debug, Clone)]
pub struct PrometheusProvider {
    base_url: String,
    client: Client,
}

impl PrometheusProvider {
    pub fn new(config: MetricConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to create prometheus client: {}", e)))?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Runs a PromQL range query over `[start, end]` with `step` in seconds.
    pub async fn query_range(
        &self,
        promql: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: u64,
    ) -> Result<Vec<MetricSeries>> {
        let url = format!("{}/api/v1/query_range", self.base_url);
        let params = [
            ("query", promql.to_string()),
            ("start", format_time(start)),
            ("end", format_time(end)),
            ("step", step.to_string()),
        ];

        debug!(query = %promql, %start, %end, step, "Executing Prometheus range query");
        let response = self.client.get(&url).query(&params).send().await?;
        let body = read_body(response, "prometheus").await?;

        let envelope: ApiResponse<QueryData> = serde_json::from_str(&body)?;
        let series = envelope.into_data("query_range")?.into_series()?;
        debug!(count = series.len(), "Prometheus returned series");
        Ok(series)
    }

    /// Lists every distinct value of `label` over the unrestricted time range.
    pub async fn label_values(&self, label: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/v1/label/{}/values", self.base_url, label);

        debug!(url = %url, "Listing Prometheus label values");
        let response = self.client.get(&url).send().await?;
        let body = read_body(response, "prometheus").await?;

        let envelope: ApiResponse<Vec<String>> = serde_json::from_str(&body)?;
        envelope.into_data("label values")
    }
}

/// Unix seconds with millisecond precision, as the query API expects.
fn format_time(ts: DateTime<Utc>) -> String {
    let millis = ts.timestamp_millis();
    format!("{}.{:03}", millis.div_euclid(1000), millis.rem_euclid(1000))
}

#[async_trait]
impl MetricProvider for PrometheusProvider {
    async fn query(&self, query: &MetricQuery) -> Result<Vec<MetricSeries>> {
        let promql = build_promql(query)?;
        self.query_range(&promql, query.start, query.end, query.step).await
    }

    async fn describe(&self, _scope: &QueryScope) -> Result<Vec<MetricDescriptor>> {
        let names = self
            .label_values("__name__")
            .await
            .map_err(|e| match e {
                Error::Upstream(msg) => Error::Upstream(format!("failed to list metrics: {}", msg)),
                other => other,
            })?;
        Ok(into_descriptors(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_query_times() {
        let ts = Utc.timestamp_millis_opt(1_696_118_400_250).unwrap();
        assert_eq!(format_time(ts), "1696118400.250");
        let ts = Utc.with_ymd_and_hms(2023, 10, 1, 0, 0, 0).unwrap();
        assert_eq!(format_time(ts), "1696118400.000");
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let provider = PrometheusProvider::new(MetricConfig {
            url: "http://localhost:9090/".into(),
            timeout: None,
        })
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:9090");
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = PrometheusProvider::new(MetricConfig {
            url: "not a url".into(),
            timeout: None,
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = PrometheusProvider::new(MetricConfig {
            url: String::new(),
            timeout: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("missing required config field: url"));

        let err = PrometheusProvider::new(MetricConfig {
            url: "http://localhost:9090".into(),
            timeout: Some(std::time::Duration::ZERO),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
