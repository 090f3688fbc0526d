//! Object store listing and cleanup from the application manager.
//!
//! Workers upload and download through [`crate::worker::objectstore`]; the
//! application manager sees the resulting objects here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, platform_response};
use crate::transport::Transport;

const LIST: Operation = Operation::read("ObjectStoreList");
const DESCRIBE: Operation = Operation::read("ObjectStoreDescribe");
const DELETE: Operation = Operation::mutation("ObjectStoreDelete");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[LIST, DESCRIBE, DELETE];

/// Metadata of a stored object.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Object {
    /// Owning deployment.
    pub deployment_id: String,
    /// Worker group of the uploading worker.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Uploading worker.
    pub worker_id: String,
    /// Object identifier.
    pub object_id: String,
    /// Directory and name within the store.
    pub full_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Upload time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
    /// Whether the object is stored encrypted.
    pub encrypted: bool,
}

/// Lists the objects of a deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListRequest {
    /// Owning deployment.
    pub deployment_id: String,
    /// Glob matched against full names; empty lists everything.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,
}

/// Response to [`ListRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Matching objects.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<Object>,
}

/// Describes one object by identifier or full name.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeRequest {
    /// Owning deployment.
    pub deployment_id: String,
    /// Object identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub object_id: String,
    /// Full name, used when no identifier is given.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub full_name: String,
}

/// Response to [`DescribeRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// The object.
    #[serde(flatten)]
    pub object: Object,
}

/// Deletes one object.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteRequest {
    /// Object to delete.
    pub object_id: String,
}

platform_response!(ListResponse, DescribeResponse);

impl ListRequest {
    /// Lists the matching objects.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Vec<Object>, ApiError> {
        let response: ListResponse = dispatcher.call(LIST, self).await?;
        Ok(response.objects)
    }
}

impl DescribeRequest {
    /// Fetches the object metadata.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn describe<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Object, ApiError> {
        let response: DescribeResponse = dispatcher.call(DESCRIBE, self).await?;
        Ok(response.object)
    }
}

impl DeleteRequest {
    /// Deletes the object.
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
    use serde_json::json;

    use super::*;
    use crate::dispatch::RetryPolicy;
    use chrono::TimeZone;

    use crate::test_support::{ScriptedTransport, assert_round_trips, ok_body};

    fn dispatcher(transport: &ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::with_transport("http://platform.test", transport.clone())
            .with_retry_policy(RetryPolicy::fast())
    }

    #[tokio::test]
    async fn describe_reads_flattened_object() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({
            "object_id": "obj-1",
            "full_name": "/reports/q1.csv",
            "size": 2048,
            "encrypted": true,
            "created_at": "2024-01-02T03:04:05Z"
        })));
        let object = DescribeRequest {
            deployment_id: String::from("dep"),
            full_name: String::from("/reports/q1.csv"),
            ..DescribeRequest::default()
        }
        .describe(&dispatcher(&transport))
        .await
        .expect("described");
        assert_eq!(object.size, 2048);
        assert!(object.encrypted);
        assert!(object.created_at.is_some());
        assert!(object.modified_at.is_none());
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body, json!({ "deployment_id": "dep", "full_name": "/reports/q1.csv" }));
    }

    #[tokio::test]
    async fn list_without_objects_is_empty() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({})));
        let objects = ListRequest {
            deployment_id: String::from("dep"),
            pattern: String::from("*.csv"),
        }
        .list(&dispatcher(&transport))
        .await
        .expect("listed");
        assert!(objects.is_empty());
    }

    #[test]
    fn object_shapes_round_trip() {
        let object = Object {
            deployment_id: String::from("dep"),
            worker_group_id: String::from("wg"),
            worker_id: String::from("w-1"),
            object_id: String::from("obj-1"),
            full_name: String::from("reports/2026.csv"),
            size: 2048,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).single(),
            modified_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).single(),
            encrypted: true,
        };
        let ok = ApiStatus {
            status_code: String::from("200"),
            description: String::new(),
        };
        assert_round_trips(&ListRequest {
            deployment_id: String::from("dep"),
            pattern: String::from("reports/*"),
        });
        assert_round_trips(&ListResponse {
            status: ok.clone(),
            objects: vec![object.clone()],
        });
        assert_round_trips(&DescribeRequest {
            deployment_id: String::from("dep"),
            object_id: String::from("obj-1"),
            full_name: String::new(),
        });
        assert_round_trips(&DescribeResponse { status: ok, object });
        assert_round_trips(&DeleteRequest {
            object_id: String::from("obj-1"),
        });
    }
}
