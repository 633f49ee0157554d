use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::schema::{MetricDescriptor, MetricPoint, MetricSeries};
use crate::{Error, Result};

const METRIC_NAME_LABEL: &str = "__name__";

/// The `{status, data, errorType, error, warnings}` envelope every Prometheus
/// HTTP API response is wrapped in.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    status: String,
    data: Option<T>,
    #[serde(rename = "errorType")]
    error_type: Option<String>,
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QueryData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
struct MatrixSeries {
    metric: HashMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

impl<T> ApiResponse<T> {
    /// Unwraps the payload of a successful response. Warnings are logged, an
    /// error envelope or a missing payload becomes an upstream error.
    pub(crate) fn into_data(self, endpoint: &str) -> Result<T> {
        for warning in &self.warnings {
            tracing::warn!("Prometheus {} warning: {}", endpoint, warning);
        }

        if self.status != "success" {
            return Err(Error::Upstream(format!(
                "prometheus {} failed: {}: {}",
                endpoint,
                self.error_type.as_deref().unwrap_or("unknown"),
                self.error.as_deref().unwrap_or("unknown error")
            )));
        }

        self.data
            .ok_or_else(|| Error::Upstream(format!("prometheus {} returned no data", endpoint)))
    }
}

impl QueryData {
    pub(crate) fn into_series(self) -> Result<Vec<MetricSeries>> {
        if self.result_type != "matrix" {
            return Err(Error::Upstream(format!(
                "expected matrix result, got {}",
                self.result_type
            )));
        }

        let matrix: Vec<MatrixSeries> = serde_json::from_value(self.result)?;
        matrix.into_iter().map(MatrixSeries::into_series).collect()
    }
}

impl MatrixSeries {
    fn into_series(mut self) -> Result<MetricSeries> {
        let name = self.metric.remove(METRIC_NAME_LABEL).unwrap_or_default();

        let points = self
            .values
            .into_iter()
            .map(|(timestamp, value)| -> Result<MetricPoint> {
                Ok(MetricPoint {
                    timestamp: sample_time(timestamp)?,
                    value: value.parse::<f64>().map_err(|e| {
                        Error::Upstream(format!("invalid sample value {:?}: {}", value, e))
                    })?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MetricSeries {
            name,
            labels: self.metric.into_iter().collect(),
            points,
        })
    }
}

/// Prometheus sample timestamps are float Unix seconds with millisecond precision.
fn sample_time(seconds: f64) -> Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis((seconds * 1000.0).round() as i64)
        .ok_or_else(|| Error::Upstream(format!("sample timestamp out of range: {}", seconds)))
}

pub(crate) fn into_descriptors(names: Vec<String>) -> Vec<MetricDescriptor> {
    names
        .into_iter()
        .map(|name| MetricDescriptor {
            name,
            metric_type: "unknown".to_string(),
        })
        .collect()
}
