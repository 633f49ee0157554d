//! Vendor-neutral alert and metric model shared with the dispatch shim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Organizational subset a query is narrowed to. Empty fields are unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryScope {
    pub service: String,
    pub team: String,
    pub environment: String,
}

impl QueryScope {
    pub fn is_empty(&self) -> bool {
        self.service.is_empty() && self.team.is_empty() && self.environment.is_empty()
    }

    /// Label matchers for the non-empty fields, in service, team, env order.
    pub(crate) fn label_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("service", self.service.as_str()),
            ("team", self.team.as_str()),
            ("env", self.environment.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlertQuery {
    pub statuses: Vec<String>,
    pub severities: Vec<String>,
    pub scope: QueryScope,
    /// Maximum number of alerts to return; zero or negative means unlimited.
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertStatus {
    Firing,
    Suppressed,
    Pending,
    Other(String),
}

impl AlertStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Suppressed => "suppressed",
            AlertStatus::Pending => "pending",
            AlertStatus::Other(s) => s,
        }
    }
}

impl From<String> for AlertStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "firing" => AlertStatus::Firing,
            "suppressed" => AlertStatus::Suppressed,
            "pending" => AlertStatus::Pending,
            _ => AlertStatus::Other(s),
        }
    }
}

impl From<AlertStatus> for String {
    fn from(status: AlertStatus) -> Self {
        match status {
            AlertStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: AlertStatus,
    pub severity: String,
    pub service: String,
    pub url: String,
    pub fields: Map<String, Value>,
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricFilter {
    pub label: String,
    pub operator: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricExpression {
    pub metric_name: String,
    pub filters: Vec<MetricFilter>,
    pub aggregation: Option<String>,
    pub group_by: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetricQuery {
    pub expression: Option<MetricExpression>,
    pub scope: QueryScope,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Resolution step in seconds.
    pub step: u64,
    /// Free-form bag; a non-empty string under `query` overrides `expression`.
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub points: Vec<MetricPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub metric_type: String,
}
