//! Deployments: the top-level unit grouping worker groups.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{
    Accepted, ApiStatus, AsyncRequest, AsyncStatus, RequestToken, Status,
    async_platform_response, platform_response,
};
use crate::transport::Transport;

use super::workergroup::{LaunchSpec, WorkerGroup};

const DESCRIBE: Operation = Operation::read("DeploymentDescribe");
const LAUNCH: Operation = Operation::tokened("DeploymentLaunch");
const TERMINATE: Operation = Operation::tokened("DeploymentTerminate");
const STOP: Operation = Operation::tokened("DeploymentStop");
const START: Operation = Operation::tokened("DeploymentStart");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[DESCRIBE, LAUNCH, TERMINATE, STOP, START];

/// A deployment and its worker groups.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Deployment {
    /// Deployment identifier.
    pub deployment_id: String,
    /// Deployment name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Worker groups of the deployment.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub worker_groups: Vec<WorkerGroup>,
    /// Lifecycle state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// Describes one deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeRequest {
    /// Deployment to describe.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
}

/// Response to [`DescribeRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// The deployment.
    pub deployment: Deployment,
}

/// Launches a new deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchRequest {
    /// Deployment name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Worker groups to launch with the deployment.
    pub worker_groups: Vec<LaunchSpec>,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Acknowledgement of a launch request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LaunchResponse {
    /// Acknowledgement envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Identifier of the new deployment.
    pub deployment_id: String,
}

/// Addresses one deployment for terminate, stop and start.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeploymentRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Deployment addressed.
    pub deployment_id: String,
}

/// Terminates a deployment.
pub type TerminateRequest = DeploymentRequest;
/// Stops a deployment.
pub type StopRequest = DeploymentRequest;
/// Starts a deployment.
pub type StartRequest = DeploymentRequest;

/// Callback carrying a deployment after launch, stop or start.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeploymentCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// The deployment after the change.
    #[serde(flatten)]
    pub deployment: Deployment,
}

/// Callback delivered once a deployment is terminated.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct TerminateCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Terminated deployment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
}

platform_response!(DescribeResponse);
async_platform_response!(LaunchResponse, DeploymentCallback, TerminateCallback);

impl DescribeRequest {
    /// Describes the deployment.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn describe<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Deployment, ApiError> {
        let response: DescribeResponse = dispatcher.call(DESCRIBE, self).await?;
        Ok(response.deployment)
    }
}

impl LaunchRequest {
    /// Starts launching the deployment and returns its identifier.
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
            response.deployment_id,
            response.ack.request_token,
        ))
    }
}

impl DeploymentRequest {
    /// Addresses `deployment_id` with callbacks going to `callback_url`.
    #[must_use]
    pub fn new(deployment_id: impl Into<String>, callback_url: impl Into<String>) -> Self {
        Self {
            async_request: AsyncRequest::new(callback_url),
            deployment_id: deployment_id.into(),
        }
    }

    /// Terminates the deployment.
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

    /// Stops the deployment.
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

    /// Starts the deployment.
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

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatch::RetryPolicy;
    use crate::schema::UpdateStrategy;
    use crate::test_support::{ScriptedTransport, assert_round_trips, failure_body, ok_body};

    fn dispatcher(transport: &ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::with_transport("http://platform.test", transport.clone())
            .with_retry_policy(RetryPolicy::fast())
    }

    #[tokio::test]
    async fn describe_returns_nested_deployment() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({
            "deployment": {
                "deployment_id": "dep",
                "name": "shop",
                "status": "Running",
                "worker_groups": [{ "worker_group_id": "wg", "num_workers": 2 }]
            }
        })));
        let deployment = DescribeRequest {
            deployment_id: String::from("dep"),
        }
        .describe(&dispatcher(&transport))
        .await
        .expect("described");
        assert_eq!(deployment.name, "shop");
        assert_eq!(deployment.status, Some(Status::Running));
        let group = deployment.worker_groups.first().expect("group");
        assert_eq!(group.spec.worker.num_workers, 2);
    }

    #[tokio::test]
    async fn launch_sends_group_specs() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "request_token": "tok", "deployment_id": "dep-1" })));
        let mut spec = LaunchSpec {
            update_strategy: Some(UpdateStrategy::RollingUpdate),
            ..LaunchSpec::default()
        };
        spec.worker.name = String::from("api");
        let request = LaunchRequest {
            name: String::from("shop"),
            worker_groups: vec![spec],
            async_request: AsyncRequest::new("http://manager/cb"),
        };
        let accepted = request.launch(&dispatcher(&transport)).await.expect("accepted");
        assert_eq!(accepted.value, "dep-1");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body["worker_groups"][0]["name"], "api");
        assert_eq!(body["name"], "shop");
    }

    #[tokio::test]
    async fn terminate_surfaces_platform_errors() {
        let transport = ScriptedTransport::new();
        transport.push_json(&failure_body("409", "deployment busy"));
        let err = DeploymentRequest::new("dep", "http://manager/cb")
            .terminate(&dispatcher(&transport))
            .await
            .expect_err("busy");
        assert_eq!(err.code, "409");
        assert_eq!(err.description, "deployment busy");
    }

    #[test]
    fn deployment_shapes_round_trip() {
        let ack = AsyncStatus {
            status: ApiStatus {
                status_code: String::from("200"),
                description: String::from("ok"),
            },
            request_token: RequestToken::new("tok-3"),
        };
        let deployment = Deployment {
            deployment_id: String::from("dep-1"),
            name: String::from("shop"),
            worker_groups: vec![WorkerGroup {
                worker_group_id: String::from("wg-1"),
                status: Some(Status::Running),
                ..WorkerGroup::default()
            }],
            status: Some(Status::Running),
        };
        assert_round_trips(&deployment);
        assert_round_trips(&DescribeResponse {
            status: ack.status.clone(),
            deployment: deployment.clone(),
        });
        assert_round_trips(&DeploymentCallback {
            ack: ack.clone(),
            deployment,
        });
        assert_round_trips(&TerminateCallback {
            ack: ack.clone(),
            deployment_id: String::from("dep-1"),
        });
        assert_round_trips(&LaunchResponse {
            ack,
            deployment_id: String::from("dep-1"),
        });
        let mut group = LaunchSpec {
            update_strategy: Some(UpdateStrategy::Recreate),
            ..LaunchSpec::default()
        };
        group.worker.name = String::from("api");
        group.worker.num_workers = 3;
        assert_round_trips(&LaunchRequest {
            name: String::from("shop"),
            worker_groups: vec![group],
            async_request: AsyncRequest::new("http://manager/cb"),
        });
        assert_round_trips(&DeploymentRequest::new("dep-1", "http://manager/cb"));
        assert_round_trips(&DescribeRequest {
            deployment_id: String::from("dep-1"),
        });
        assert_round_trips(&DescribeResponse::default());
        assert_round_trips(&DeploymentCallback::default());
    }
}
