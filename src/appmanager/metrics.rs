//! Metrics queries over deployments, worker groups and workers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{
    ApiStatus, MetricsAggregationLevel, MetricsQueryMode, is_zero, nanos, platform_response,
};
use crate::transport::Transport;

const QUERY: Operation = Operation::read("MetricsQuery");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[QUERY];

/// Selects metrics and how they are summarized.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct QueryRequest {
    /// Deployment to query.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Narrows the query to one worker group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Narrows the query to one worker.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_id: String,
    /// Metric names.
    pub metrics: Vec<String>,
    /// Start of the window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    /// End of the window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Aggregate or latest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_mode: Option<MetricsQueryMode>,
    /// Level the values are aggregated at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_level: Option<MetricsAggregationLevel>,
    /// Bucket width for aggregation.
    #[serde(with = "nanos", skip_serializing_if = "Option::is_none")]
    pub aggregation_interval: Option<Duration>,
}

/// One value or aggregate returned by a query.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct QueryResult {
    /// Deployment the value belongs to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Worker group the value belongs to.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Worker the value belongs to.
    pub worker_id: String,
    /// Metric name.
    pub metric_name: String,
    /// Sample or bucket time.
    #[serde(rename = "timestamp", skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<DateTime<Utc>>,
    /// Latest value.
    pub value: f64,
    /// Minimum over the bucket.
    #[serde(skip_serializing_if = "is_zero")]
    pub min: f64,
    /// Maximum over the bucket.
    #[serde(skip_serializing_if = "is_zero")]
    pub max: f64,
    /// Sum over the bucket.
    #[serde(skip_serializing_if = "is_zero")]
    pub sum: f64,
    /// Mean over the bucket.
    #[serde(skip_serializing_if = "is_zero")]
    pub avg: f64,
    /// Median over the bucket.
    #[serde(skip_serializing_if = "is_zero")]
    pub median: f64,
}

/// Response to [`QueryRequest`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct QueryResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Query results.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub query_results: Vec<QueryResult>,
}

platform_response!(QueryResponse);

impl QueryRequest {
    /// Runs the query.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn query<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<QueryResult>, ApiError> {
        let response: QueryResponse = dispatcher.call(QUERY, self).await?;
        Ok(response.query_results)
    }
}
