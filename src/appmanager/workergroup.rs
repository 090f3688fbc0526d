//! Worker groups: sets of identical workers behind shared addresses.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{
    Accepted, ApiStatus, AsyncRequest, AsyncStatus, Health, RequestToken, ResourceRequestRange,
    Status, UpdateStrategy, async_platform_response, platform_response,
};
use crate::transport::Transport;

use super::worker::{HealthStatusResponse, Worker, WorkerLaunchSpec};

const LAUNCH: Operation = Operation::tokened("WorkerGroupLaunch");
const DESCRIBE: Operation = Operation::read("WorkerGroupDescribe");
const UPDATE: Operation = Operation::tokened("WorkerGroupUpdate");
const TERMINATE: Operation = Operation::tokened("WorkerGroupTerminate");
const STOP: Operation = Operation::tokened("WorkerGroupStop");
const START: Operation = Operation::tokened("WorkerGroupStart");
const MARK_HEALTHY: Operation = Operation::tokened("WorkerGroupMarkHealthy");
const MARK_UNHEALTHY: Operation = Operation::tokened("WorkerGroupMarkUnhealthy");
const HEALTH_STATUS: Operation = Operation::read("WorkerGroupHealthStatus");
const CHANGE_STRATEGY: Operation = Operation::tokened("WorkerGroupChangeStrategy");
const UPDATE_RESOURCE_LIMITS: Operation = Operation::tokened("WorkerGroupUpdateResourceLimits");
const SCALE: Operation = Operation::tokened("WorkerGroupScale");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[
    LAUNCH,
    DESCRIBE,
    UPDATE,
    TERMINATE,
    STOP,
    START,
    MARK_HEALTHY,
    MARK_UNHEALTHY,
    HEALTH_STATUS,
    CHANGE_STRATEGY,
    UPDATE_RESOURCE_LIMITS,
    SCALE,
];

/// Spec of a worker group: the worker spec plus group-level settings.
/// `worker.num_workers` is the size of the group.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchSpec {
    /// Spec shared by every worker in the group.
    #[serde(flatten)]
    pub worker: WorkerLaunchSpec,
    /// How workers are replaced on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_strategy: Option<UpdateStrategy>,
}

/// A worker group and its workers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct WorkerGroup {
    /// Owning deployment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Worker group identifier.
    pub worker_group_id: String,
    /// Group spec.
    #[serde(flatten)]
    pub spec: LaunchSpec,
    /// Whether the external IP address is dedicated or shared.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dedicated_external_ip_address: bool,
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
    /// Health of the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<Health>,
    /// Lifecycle state of the group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Workers in the group.
    #[serde(rename = "worker_instances", skip_serializing_if = "Vec::is_empty")]
    pub workers: Vec<Worker>,
}

/// Identifiers addressing one worker group.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct WorkerGroupRequestFields {
    /// Owning deployment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Worker group identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
}

impl WorkerGroupRequestFields {
    /// Addresses `worker_group_id` within a deployment.
    #[must_use]
    pub fn new(deployment_id: impl Into<String>, worker_group_id: impl Into<String>) -> Self {
        Self {
            deployment_id: deployment_id.into(),
            worker_group_id: worker_group_id.into(),
        }
    }
}

/// Launches a worker group.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Owning deployment.
    pub deployment_id: String,
    /// Group spec.
    #[serde(flatten)]
    pub spec: LaunchSpec,
}

/// Acknowledgement of a launch request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchResponse {
    /// Acknowledgement envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Identifier of the group being launched.
    pub worker_group_id: String,
}

/// Callback delivered once groups are launched.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// The launched groups.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub worker_groups: Vec<WorkerGroup>,
}

/// Describes some or all worker groups of a deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeRequest {
    /// Owning deployment.
    pub deployment_id: String,
    /// Groups to describe; empty means all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub worker_group_ids: Vec<String>,
}

/// Response to [`DescribeRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// The described groups.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub worker_groups: Vec<WorkerGroup>,
}

/// Updates a worker group's spec.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UpdateRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Owning deployment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Group to update.
    pub worker_group_id: String,
    /// New group spec.
    #[serde(flatten)]
    pub spec: LaunchSpec,
}

/// A request addressing one worker group with nothing else but callback
/// fields: terminate, stop, start and the health markers.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GroupRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Group addressed.
    #[serde(flatten)]
    pub group: WorkerGroupRequestFields,
}

impl GroupRequest {
    /// Addresses `group` with callbacks going to `callback_url`.
    #[must_use]
    pub fn new(group: WorkerGroupRequestFields, callback_url: impl Into<String>) -> Self {
        Self {
            async_request: AsyncRequest::new(callback_url),
            group,
        }
    }

    /// Terminates the group.
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

    /// Stops the group by removing its workers while keeping its other
    /// resources, such as allocated IP addresses.
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

    /// Starts a stopped group.
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

    /// Marks the group healthy.
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

    /// Marks the group unhealthy.
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

/// Terminates a worker group.
pub type TerminateRequest = GroupRequest;
/// Stops a worker group.
pub type StopRequest = GroupRequest;
/// Starts a worker group.
pub type StartRequest = GroupRequest;
/// Marks a worker group healthy.
pub type MarkHealthyRequest = GroupRequest;
/// Marks a worker group unhealthy.
pub type MarkUnhealthyRequest = GroupRequest;

/// Reads a worker group's health.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct HealthStatusRequest {
    /// Group to inspect.
    #[serde(flatten)]
    pub group: WorkerGroupRequestFields,
}

/// Changes how a worker group replaces its workers. The platform reads
/// these keys in their capitalised form.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ChangeUpdateStrategyRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Owning deployment.
    #[serde(rename = "DeploymentID")]
    pub deployment_id: String,
    /// Group to change.
    #[serde(rename = "WorkerGroupID")]
    pub worker_group_id: String,
    /// New strategy.
    #[serde(rename = "UpdateStrategy", skip_serializing_if = "Option::is_none")]
    pub update_strategy: Option<UpdateStrategy>,
}

/// Changes a worker group's CPU and memory ranges.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UpdateResourcesRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Group to change.
    #[serde(rename = "WorkerGroupID")]
    pub worker_group_id: String,
    /// New ranges.
    #[serde(rename = "ResourceRequestWorker")]
    pub resource_request: ResourceRequestRange,
}

/// Callback delivered once resource limits are applied.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UpdateResourcesCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Group changed.
    #[serde(flatten)]
    pub group: WorkerGroupRequestFields,
}

/// Changes the number of workers in a group.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ScaleRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Group to scale.
    #[serde(flatten)]
    pub group: WorkerGroupRequestFields,
    /// Desired number of workers.
    pub num_workers: i32,
}

/// Callback delivered once a group is terminated.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TerminateCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Terminated group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
}

/// Callback carrying a group's state after stop, start, update, strategy
/// change, scaling or health marking.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct WorkerGroupCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// The group after the change.
    #[serde(flatten)]
    pub worker_group: WorkerGroup,
}

platform_response!(DescribeResponse);
async_platform_response!(
    LaunchResponse,
    LaunchCallback,
    UpdateResourcesCallback,
    TerminateCallback,
    WorkerGroupCallback
);

impl LaunchRequest {
    /// Starts launching the group and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn launch<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Accepted<String>, ApiError> {
        let response: LaunchResponse = dispatcher.call(LAUNCH, self).await?;
        Ok(Accepted::new(
            response.worker_group_id,
            response.ack.request_token,
        ))
    }
}

impl DescribeRequest {
    /// Describes the selected groups, or every group in the deployment.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn describe<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<WorkerGroup>, ApiError> {
        let response: DescribeResponse = dispatcher.call(DESCRIBE, self).await?;
        Ok(response.worker_groups)
    }
}

impl UpdateRequest {
    /// Updates one or more properties of the group.
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

impl HealthStatusRequest {
    /// Reads the group's health, `None` when the platform reports none.
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

impl ChangeUpdateStrategyRequest {
    /// Changes the group's update strategy.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn change_update_strategy<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(CHANGE_STRATEGY, self).await
    }
}

impl UpdateResourcesRequest {
    /// Changes or adds resource limits for every worker in the group.
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

impl ScaleRequest {
    /// Scales the group to `num_workers`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn scale<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(SCALE, self).await
    }
}
