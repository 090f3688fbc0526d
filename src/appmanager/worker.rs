//! Individual workers inside a worker group.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{
    Accepted, ApiStatus, AsyncRequest, AsyncStatus, Health, Log, MetricsEndpoint, Port,
    RequestToken, ResourceRequestRange, Status, async_platform_response, platform_response,
};
use crate::transport::Transport;

use super::volumes::Volume;

const DESCRIBE: Operation = Operation::read("WorkerDescribe");
const LAUNCH: Operation = Operation::tokened("WorkerLaunch");
const TERMINATE: Operation = Operation::tokened("WorkerTerminate");
const STOP: Operation = Operation::tokened("WorkerStop");
const START: Operation = Operation::tokened("WorkerStart");
const MARK_HEALTHY: Operation = Operation::tokened("WorkerMarkHealthy");
const MARK_UNHEALTHY: Operation = Operation::tokened("WorkerMarkUnhealthy");
const HEALTH_STATUS: Operation = Operation::read("WorkerHealthStatus");
const UPDATE_RESOURCE_LIMITS: Operation = Operation::tokened("WorkerUpdateResourceLimits");
const UPDATE: Operation = Operation::tokened("WorkerUpdate");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[
    DESCRIBE,
    LAUNCH,
    TERMINATE,
    STOP,
    START,
    MARK_HEALTHY,
    MARK_UNHEALTHY,
    HEALTH_STATUS,
    UPDATE_RESOURCE_LIMITS,
    UPDATE,
];

/// Everything needed to launch workers. Optional fields are inherited from
/// the parent worker group when left empty.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct WorkerLaunchSpec {
    /// Worker name.
    pub name: String,
    /// Number of workers to launch.
    pub num_workers: i32,
    /// Container image.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Volumes to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Exposed container ports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    /// Entrypoint override, not run in a shell. `$(VAR)` references expand
    /// from the container environment.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entrypoint: Vec<String>,
    /// Arguments to the entrypoint.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cmd: Vec<String>,
    /// Where the worker serves metrics.
    #[serde(flatten)]
    pub metrics_endpoint: MetricsEndpoint,
    /// Environment variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env_variables: BTreeMap<String, String>,
    /// Labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Log files exposed by the worker.
    pub logs: Vec<Log>,
    /// CPU and memory ranges.
    pub resource_request: ResourceRequestRange,
}

/// A deployed worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Worker {
    /// Owning deployment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Owning worker group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Worker identifier.
    pub worker_id: String,
    /// Launch spec the worker runs with.
    #[serde(flatten)]
    pub spec: WorkerLaunchSpec,
    /// External IP address.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub external_ip_address: String,
    /// Internal IP address.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub internal_ip_address: String,
    /// External DNS name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub external_dns_name: String,
    /// Internal DNS name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub internal_dns_name: String,
    /// Running or stopped; not the health.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Health of the worker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
}

/// Identifiers addressing one worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct WorkerRequestFields {
    /// Owning deployment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Owning worker group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Worker identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_id: String,
}

impl WorkerRequestFields {
    /// Addresses `worker_id` within a deployment.
    #[must_use]
    pub fn new(deployment_id: impl Into<String>, worker_id: impl Into<String>) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            worker_group_id: String::new(),
            worker_id: worker_id.into(),
        }
    }
}

/// Launches new workers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Owning deployment.
    pub deployment_id: String,
    /// Owning worker group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// What to launch.
    #[serde(flatten)]
    pub spec: WorkerLaunchSpec,
}

/// Acknowledgement of a launch request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchResponse {
    /// Acknowledgement envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Identifiers of the workers being launched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub worker_ids: Vec<String>,
}

/// Callback delivered once workers are launched.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// The launched workers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workers: Vec<Worker>,
}

/// Describes workers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeRequest {
    /// Owning deployment.
    pub deployment_id: String,
    /// Owning worker group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Workers to describe.
    pub worker_ids: Vec<String>,
}

/// Response to [`DescribeRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(from = "WireDescribeResponse")]
pub struct DescribeResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// The described workers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workers: Vec<Worker>,
    /// A single worker answered inline instead of in `workers`; `None` when
    /// the body carries no `worker_id` at the top level.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub worker: Option<Worker>,
}

/// Decoded form of [`DescribeResponse`]. A flattened worker always decodes,
/// so the inline answer is only kept when it names a worker.
#[derive(Default, Deserialize)]
#[serde(default)]
struct WireDescribeResponse {
    #[serde(flatten)]
    status: ApiStatus,
    workers: Vec<Worker>,
    #[serde(flatten)]
    worker: Worker,
}

impl From<WireDescribeResponse> for DescribeResponse {
    fn from(wire: WireDescribeResponse) -> Self {
        let worker = Some(wire.worker).filter(|worker| !worker.worker_id.is_empty());
        Self {
            status: wire.status,
            workers: wire.workers,
            worker,
        }
    }
}

impl DescribeResponse {
    /// Every worker in the response, inline answers included.
    #[must_use]
    pub fn into_workers(self) -> Vec<Worker> {
        let mut workers = self.workers;
        if workers.is_empty() {
            workers.extend(self.worker);
        }
        workers
    }
}

/// Terminates a worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TerminateRequest {
    /// Worker to terminate.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Callback delivered once a worker is gone.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TerminateCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Terminated worker.
    pub worker_id: String,
}

/// Stops a worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StopRequest {
    /// Worker to stop.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Starts a stopped worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StartRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Worker to start.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
}

/// Updates a worker's spec.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UpdateRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Worker to update.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
    /// Container image.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Volumes to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
    /// Exposed container ports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    /// Environment variables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env_variables: BTreeMap<String, String>,
    /// Labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// CPU and memory ranges.
    pub resource_request: ResourceRequestRange,
}

/// Marks a worker healthy.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MarkHealthyRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Worker to mark.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
}

/// Marks a worker unhealthy.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MarkUnhealthyRequest {
    /// Worker to mark.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Reads a worker's health.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct HealthStatusRequest {
    /// Worker to inspect.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
}

/// Response to a health status request, for workers and worker groups.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct HealthStatusResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Reported health. The platform spells the key `Health`.
    #[serde(rename = "Health", alias = "health", skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
}

/// Changes a worker's CPU and memory ranges.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UpdateResourcesRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Worker to update.
    #[serde(flatten)]
    pub worker: WorkerRequestFields,
    /// New ranges.
    #[serde(rename = "ResourceRequestWorker")]
    pub resource_request: ResourceRequestRange,
}

/// Callback carrying a worker's state after stop, start, update, health
/// marking or resource changes.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct WorkerCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// The worker after the change.
    #[serde(flatten)]
    pub worker: Worker,
}

platform_response!(DescribeResponse, HealthStatusResponse);
async_platform_response!(
    LaunchResponse,
    LaunchCallback,
    TerminateCallback,
    WorkerCallback
);

impl DescribeRequest {
    /// Describes the selected workers.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn describe<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<Worker>, ApiError> {
        let response: DescribeResponse = dispatcher.call(DESCRIBE, self).await?;
        Ok(response.into_workers())
    }
}

impl LaunchRequest {
    /// Starts launching workers and returns their identifiers.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn launch<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Accepted<Vec<String>>, ApiError> {
        let response: LaunchResponse = dispatcher.call(LAUNCH, self).await?;
        Ok(Accepted::new(response.worker_ids, response.ack.request_token))
    }
}

impl TerminateRequest {
    /// Starts terminating the worker.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn terminate<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(TERMINATE, self).await
    }
}

impl StopRequest {
    /// Starts stopping the worker.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn stop<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(STOP, self).await
    }
}

impl StartRequest {
    /// Starts the worker.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn start<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(START, self).await
    }
}

impl MarkHealthyRequest {
    /// Marks the worker healthy.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn mark_healthy<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(MARK_HEALTHY, self).await
    }
}

impl MarkUnhealthyRequest {
    /// Marks the worker unhealthy.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn mark_unhealthy<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(MARK_UNHEALTHY, self).await
    }
}

impl HealthStatusRequest {
    /// Reads the worker's health, `None` when the platform reports none.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn health_status<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Option<Health>, ApiError> {
        let response: HealthStatusResponse = dispatcher.call(HEALTH_STATUS, self).await?;
        Ok(response.health)
    }
}

impl UpdateResourcesRequest {
    /// Changes or adds resource limits.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn update_resource_limits<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(UPDATE_RESOURCE_LIMITS, self).await
    }
}

impl UpdateRequest {
    /// Updates the worker's spec.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn update<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(UPDATE, self).await
    }
}
