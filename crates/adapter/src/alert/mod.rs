//! Alertmanager adapter.
//!
//! Translates [`AlertQuery`] filters into Alertmanager's `filter` matchers and
//! maps the returned alert records onto the uniform [`Alert`] schema.

mod convert;
mod provider;

pub use convert::{map_state_to_status, map_status_to_state};
pub use provider::{build_filters, AlertmanagerProvider};

use async_trait::async_trait;

use crate::schema::{Alert, AlertQuery};
use crate::Result;

#[async_trait]
pub trait AlertProvider: Send + Sync {
    /// Lists alerts matching the query, in upstream order, truncated to `limit`.
    async fn query(&self, query: &AlertQuery) -> Result<Vec<Alert>>;

    /// Looks up a single alert by fingerprint.
    async fn get(&self, id: &str) -> Result<Alert>;
}
