//! Point-in-time snapshots of volumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{
    Accepted, ApiStatus, AsyncRequest, AsyncStatus, async_platform_response, platform_response,
};
use crate::transport::Transport;

const TAKE: Operation = Operation::tokened("SnapshotsTake");
const DESCRIBE: Operation = Operation::read("SnapshotsDescribe");
const DELETE: Operation = Operation::mutation("SnapshotsDelete");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[TAKE, DESCRIBE, DELETE];

/// Metadata of a snapshot.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Snapshot {
    /// Snapshot identifier.
    pub snapshot_id: String,
    /// Snapshot name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// When the snapshot was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Starts taking a snapshot of a volume.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct InitiateRequest {
    /// Deployment owning the volume.
    pub deployment_id: String,
    /// Volume to snapshot.
    pub volume_id: String,
    /// Name given to the snapshot.
    pub name: String,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Acknowledgement of [`InitiateRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct InitiateResponse {
    /// Acknowledgement envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Identifier of the snapshot being taken.
    pub snapshot_id: String,
}

/// Callback delivered once the snapshot exists.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct InitiateCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// The snapshot taken.
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

/// Describes some or all snapshots of a deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeRequest {
    /// Deployment owning the snapshots.
    pub deployment_id: String,
    /// Snapshots to describe; empty means all of them.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snapshot_ids: Vec<String>,
}

/// Response to [`DescribeRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Matching snapshots.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub snapshots: Vec<Snapshot>,
}

/// Deletes one snapshot.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteRequest {
    /// Deployment owning the snapshot.
    pub deployment_id: String,
    /// Snapshot to delete.
    pub snapshot_id: String,
}

platform_response!(DescribeResponse);
async_platform_response!(InitiateResponse, InitiateCallback);

impl InitiateRequest {
    /// Starts the snapshot and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn initiate<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Accepted<String>, ApiError> {
        let response: InitiateResponse = dispatcher.call(TAKE, self).await?;
        Ok(Accepted::new(response.snapshot_id, response.ack.request_token))
    }
}

impl DescribeRequest {
    /// Lists the matching snapshots.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn describe<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<Snapshot>, ApiError> {
        let response: DescribeResponse = dispatcher.call(DESCRIBE, self).await?;
        Ok(response.snapshots)
    }
}

impl DeleteRequest {
    /// Deletes the snapshot.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DELETE, self).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::dispatch::RetryPolicy;
    use crate::schema::RequestToken;
    use crate::test_support::{ScriptedTransport, assert_round_trips, failure_body, ok_body};

    fn dispatcher(transport: &ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::with_transport("http://platform.test", transport.clone())
            .with_retry_policy(RetryPolicy::fast())
    }

    #[tokio::test]
    async fn describe_parses_creation_time() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({
            "snapshots": [{
                "snapshot_id": "snap-1",
                "name": "nightly",
                "created_at": "2024-03-01T12:00:00Z"
            }]
        })));
        let snapshots = DescribeRequest {
            deployment_id: String::from("dep"),
            snapshot_ids: Vec::new(),
        }
        .describe(&dispatcher(&transport))
        .await
        .expect("described");
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single();
        assert_eq!(snapshots.first().and_then(|s| s.created_at), expected);
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body, json!({ "deployment_id": "dep" }));
    }

    #[tokio::test]
    async fn initiate_propagates_decode_failures() {
        let transport = ScriptedTransport::new();
        transport.push_raw(200, b"<html>".to_vec());
        let err = InitiateRequest {
            deployment_id: String::from("dep"),
            volume_id: String::from("vol"),
            name: String::from("nightly"),
            async_request: AsyncRequest::new("http://manager/cb"),
        }
        .initiate(&dispatcher(&transport))
        .await
        .expect_err("not json");
        assert_eq!(err.code, "500");
    }

    #[tokio::test]
    async fn delete_is_sent_once() {
        let transport = ScriptedTransport::new();
        transport.push_status(503);
        let err = DeleteRequest {
            deployment_id: String::from("dep"),
            snapshot_id: String::from("snap-1"),
        }
        .delete(&dispatcher(&transport))
        .await
        .expect_err("unavailable");
        assert_eq!(err.code, "502");
        assert_eq!(transport.attempt_count(), 1);
    }

    #[tokio::test]
    async fn delete_reports_platform_failure() {
        let transport = ScriptedTransport::new();
        transport.push_json(&failure_body("404", "no such snapshot"));
        let err = DeleteRequest::default()
            .delete(&dispatcher(&transport))
            .await
            .expect_err("missing");
        assert_eq!(err.code, "404");
    }

    #[test]
    fn snapshot_shapes_round_trip() {
        let ack = AsyncStatus {
            status: ApiStatus {
                status_code: String::from("200"),
                description: String::from("ok"),
            },
            request_token: RequestToken::new("tok-5"),
        };
        let snapshot = Snapshot {
            snapshot_id: String::from("snap-1"),
            name: String::from("nightly"),
            created_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single(),
        };
        assert_round_trips(&snapshot);
        assert_round_trips(&InitiateCallback {
            ack: ack.clone(),
            snapshot: snapshot.clone(),
        });
        assert_round_trips(&InitiateResponse {
            ack: ack.clone(),
            snapshot_id: String::from("snap-1"),
        });
        assert_round_trips(&DescribeResponse {
            status: ack.status,
            snapshots: vec![snapshot],
        });
        assert_round_trips(&InitiateRequest {
            deployment_id: String::from("dep"),
            volume_id: String::from("vol-1"),
            name: String::from("nightly"),
            async_request: AsyncRequest::new("http://manager/cb"),
        });
        assert_round_trips(&DescribeRequest {
            deployment_id: String::from("dep"),
            snapshot_ids: vec![String::from("snap-1")],
        });
        assert_round_trips(&DeleteRequest {
            deployment_id: String::from("dep"),
            snapshot_id: String::from("snap-1"),
        });
        assert_round_trips(&InitiateCallback::default());
    }
}
