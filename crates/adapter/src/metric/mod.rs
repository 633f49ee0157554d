//! Prometheus adapter.
//!
//! Builds PromQL from a [`MetricQuery`], runs it as a range query and maps
//! the matrix result onto [`MetricSeries`].

mod promql;
mod provider;
mod response;

pub use promql::build_promql;
pub use provider::PrometheusProvider;

use async_trait::async_trait;

use crate::schema::{MetricDescriptor, MetricQuery, MetricSeries, QueryScope};
use crate::Result;

#[async_trait]
pub trait MetricProvider: Send + Sync {
    async fn query(&self, query: &MetricQuery) -> Result<Vec<MetricSeries>>;

    /// Lists known metric names. The catalog is global: `scope` is accepted
    /// for interface parity but not applied.
    async fn describe(&self, scope: &QueryScope) -> Result<Vec<MetricDescriptor>>;
}
