use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::schema::{Alert, AlertStatus};
use crate::PROVIDER_NAME;

/// An alert record as returned by `GET /api/v2/alerts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct AlertmanagerAlert {
    pub(crate) fingerprint: String,
    status: AlertmanagerStatus,
    labels: HashMap<String, String>,
    annotations: HashMap<String, String>,
    starts_at: String,
    updated_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct AlertmanagerStatus {
    /// active, suppressed or unprocessed
    state: String,
}

/// Maps a requested alert status onto the Alertmanager state it filters by.
pub fn map_status_to_state(status: &str) -> &str {
    match status {
        "firing" | "open" | "active" => "active",
        "resolved" | "closed" => "suppressed",
        other => other,
    }
}

pub fn map_state_to_status(state: &str) -> AlertStatus {
    match state {
        "active" => AlertStatus::Firing,
        "suppressed" => AlertStatus::Suppressed,
        "unprocessed" => AlertStatus::Pending,
        other => AlertStatus::Other(other.to_string()),
    }
}

impl AlertmanagerAlert {
    pub(crate) fn into_alert(self) -> Alert {
        let label = |key: &str| self.labels.get(key).cloned().unwrap_or_default();

        let mut fields = Map::new();
        fields.insert("labels".to_string(), json!(self.labels));
        fields.insert("annotations".to_string(), json!(self.annotations));

        let mut metadata = Map::new();
        metadata.insert("source".to_string(), Value::from(PROVIDER_NAME));
        metadata.insert("fingerprint".to_string(), Value::from(self.fingerprint.clone()));

        Alert {
            id: self.fingerprint.clone(),
            title: label("alertname"),
            description: self.annotations.get("description").cloned().unwrap_or_default(),
            status: map_state_to_status(&self.status.state),
            severity: label("severity"),
            service: label("service"),
            url: format!("/alerting/alerts#{}", self.fingerprint),
            fields,
            metadata,
            created_at: parse_timestamp(&self.starts_at, "startsAt"),
            updated_at: parse_timestamp(&self.updated_at, "updatedAt"),
        }
    }
}

fn parse_timestamp(raw: &str, field: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            tracing::debug!("unparsable {} {:?}: {}", field, raw, e);
            DateTime::<Utc>::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> AlertmanagerAlert {
        serde_json::from_value(json!({
            "fingerprint": "abc123",
            "status": { "state": "active", "silencedBy": [], "inhibitedBy": [] },
            "labels": { "alertname": "HighCPU", "severity": "critical", "service": "api" },
            "annotations": { "description": "CPU usage above 90%" },
            "startsAt": "2025-12-03T10:00:00Z",
            "endsAt": "2025-12-03T11:00:00Z",
            "updatedAt": "2025-12-03T10:05:00.123Z"
        }))
        .unwrap()
    }

    #[test]
    fn requested_statuses_map_to_alertmanager_states() {
        for status in ["firing", "open", "active"] {
            assert_eq!(map_status_to_state(status), "active");
        }
        for status in ["resolved", "closed"] {
            assert_eq!(map_status_to_state(status), "suppressed");
        }
        assert_eq!(map_status_to_state("unprocessed"), "unprocessed");
        assert_eq!(map_status_to_state(""), "");
    }

    #[test]
    fn alertmanager_states_map_to_statuses() {
        assert_eq!(map_state_to_status("active"), AlertStatus::Firing);
        assert_eq!(map_state_to_status("suppressed"), AlertStatus::Suppressed);
        assert_eq!(map_state_to_status("unprocessed"), AlertStatus::Pending);
        assert_eq!(map_state_to_status("weird"), AlertStatus::Other("weird".to_string()));
    }

    #[test]
    fn converts_record_fields() {
        let alert = sample().into_alert();

        assert_eq!(alert.id, "abc123");
        assert_eq!(alert.title, "HighCPU");
        assert_eq!(alert.description, "CPU usage above 90%");
        assert_eq!(alert.status, AlertStatus::Firing);
        assert_eq!(alert.severity, "critical");
        assert_eq!(alert.service, "api");
        assert_eq!(alert.url, "/alerting/alerts#abc123");
        assert_eq!(alert.fields["labels"]["alertname"], "HighCPU");
        assert_eq!(alert.fields["annotations"]["description"], "CPU usage above 90%");
        assert_eq!(alert.metadata["source"], "prometheus");
        assert_eq!(alert.metadata["fingerprint"], "abc123");
        assert_eq!(alert.created_at, Utc.with_ymd_and_hms(2025, 12, 3, 10, 0, 0).unwrap());
        assert_eq!(alert.updated_at.timestamp_millis(), 1_764_756_300_123);
    }

    #[test]
    fn missing_labels_become_empty_strings() {
        let record: AlertmanagerAlert = serde_json::from_value(json!({
            "fingerprint": "bare",
            "status": { "state": "unprocessed" },
            "labels": {}
        }))
        .unwrap();
        let alert = record.into_alert();

        assert_eq!(alert.title, "");
        assert_eq!(alert.description, "");
        assert_eq!(alert.severity, "");
        assert_eq!(alert.service, "");
        assert_eq!(alert.status, AlertStatus::Pending);
        assert_eq!(alert.fields["annotations"], json!({}));
    }

    #[test]
    fn bad_timestamps_degrade_to_zero_value() {
        let mut record = sample();
        record.starts_at = "yesterday".to_string();
        record.updated_at = String::new();
        let alert = record.into_alert();

        assert_eq!(alert.created_at, DateTime::<Utc>::default());
        assert_eq!(alert.updated_at, DateTime::<Utc>::default());
        assert_eq!(alert.id, "abc123");
    }
}
