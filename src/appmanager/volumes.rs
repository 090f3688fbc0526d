//! Block and file-system volumes attached to workers.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{
    Accepted, ApiStatus, AsyncRequest, AsyncStatus, RequestToken, VolumeType,
    async_platform_response, platform_response,
};
use crate::transport::Transport;

const DESCRIBE: Operation = Operation::read("VolumesDescribe");
const CREATE: Operation = Operation::tokened("VolumesCreate");
const ATTACH: Operation = Operation::tokened("VolumesAttach");
const CREATE_ATTACH: Operation = Operation::tokened("VolumesCreateAttach");
const DETACH: Operation = Operation::tokened("VolumesDetach");
const DELETE: Operation = Operation::tokened("VolumesDelete");
const COPY: Operation = Operation::tokened("VolumesCopy");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[
    DESCRIBE,
    CREATE,
    ATTACH,
    CREATE_ATTACH,
    DETACH,
    DELETE,
    COPY,
];

/// Shape of a volume.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct VolumeSpec {
    /// Name of the volume on the cluster.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Block or file-system volume.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<VolumeType>,
    /// Dedicated to one worker when `true`, shared otherwise. Block volumes
    /// are always dedicated.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dedicated: bool,
    /// Absolute mount path inside the container.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mount_path: String,
}

/// An existing volume, or the spec of one to create.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Volume {
    /// Identifier of an existing volume.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_id: String,
    /// Spec of the volume.
    #[serde(flatten)]
    pub spec: VolumeSpec,
}

/// Per-volume outcome reported in delete and copy callbacks.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct IdResult {
    /// Volume identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Outcome for this volume.
    #[serde(flatten)]
    pub status: ApiStatus,
}

/// Describes one volume.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeRequest {
    /// Owning deployment.
    pub deployment_id: String,
    /// Volume to describe.
    pub volume_id: String,
}

/// Response to [`DescribeRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// The volume.
    #[serde(flatten)]
    pub volume: Volume,
}

/// Creates an unattached volume, optionally from a snapshot.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CreateRequest {
    /// Owning deployment.
    pub deployment_id: String,
    /// Snapshot to restore from.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snapshot_id: String,
    /// Shape of the new volume.
    pub volume_spec: VolumeSpec,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Acknowledgement of a create or create-and-attach request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CreateResponse {
    /// Acknowledgement envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Identifier of the volume being created.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub volume_id: String,
}

/// Callback delivered once a volume exists.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CreateCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// The created volume.
    #[serde(flatten)]
    pub volume: Volume,
}

/// Attaches an available volume to a running or stopped worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AttachRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Owning deployment.
    pub deployment_id: String,
    /// Worker receiving the volume.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_id: String,
    /// Volume to attach.
    pub volume_id: String,
    /// Mount path inside the worker.
    pub mount_path: String,
}

/// Creates a volume and attaches it to a worker in one step.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CreateAttachRequest {
    /// Owning deployment.
    pub deployment_id: String,
    /// Worker receiving the volume.
    pub worker_id: String,
    /// Snapshot to restore from.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub snapshot_id: String,
    /// Shape of the new volume.
    pub volume_spec: VolumeSpec,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Detaches a volume from its worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DetachRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Owning deployment.
    pub deployment_id: String,
    /// Volume to detach. The platform reads this from `volumes_id`.
    #[serde(rename = "volumes_id")]
    pub volume_id: String,
}

/// Permanently deletes volumes.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Owning deployment.
    pub deployment_id: String,
    /// Volumes to delete.
    #[serde(rename = "volume_id")]
    pub volume_ids: Vec<String>,
    /// Delete even when attached.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub force: bool,
}

/// Callback delivered once deletion completes.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Per-volume outcome.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_ids: Vec<IdResult>,
}

/// Copies a volume into the same or another deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CopyRequest {
    /// Source deployment.
    pub deployment_id: String,
    /// Volume to copy.
    pub volume_id: String,
    /// Deployment receiving the copies.
    pub target_deployment_id: String,
    /// Number of copies.
    #[serde(skip_serializing_if = "crate::schema::is_zero")]
    pub num_copies: i32,
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
}

/// Acknowledgement of a copy request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CopyResponse {
    /// Acknowledgement envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Identifiers of the copies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_ids: Vec<String>,
}

/// Callback delivered once copies exist.
pub type CopyCallback = DeleteCallback;

/// Callback for attach and detach requests.
pub type AttachCallback = AsyncStatus;

platform_response!(DescribeResponse);
async_platform_response!(CreateResponse, CreateCallback, DeleteCallback, CopyResponse);

impl DescribeRequest {
    /// Fetches the volume.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn describe<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Volume, ApiError> {
        let response: DescribeResponse = dispatcher.call(DESCRIBE, self).await?;
        Ok(response.volume)
    }
}

impl CreateRequest {
    /// Starts creating an empty, unattached volume and returns its
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn create<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Accepted<String>, ApiError> {
        let response: CreateResponse = dispatcher.call(CREATE, self).await?;
        Ok(Accepted::new(response.volume_id, response.ack.request_token))
    }
}

impl AttachRequest {
    /// Starts attaching the volume.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn attach<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(ATTACH, self).await
    }
}

impl CreateAttachRequest {
    /// Starts creating and attaching a volume and returns the identifier the
    /// platform assigned to it.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn create_attach<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Accepted<String>, ApiError> {
        let response: CreateResponse = dispatcher.call(CREATE_ATTACH, self).await?;
        Ok(Accepted::new(response.volume_id, response.ack.request_token))
    }
}

impl DetachRequest {
    /// Starts detaching the volume.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn detach<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(DETACH, self).await
    }
}

impl DeleteRequest {
    /// Starts deleting the volumes. Deletion is not reversible.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        dispatcher.submit(DELETE, self).await
    }
}

impl CopyRequest {
    /// Starts copying the volume and returns the identifiers of the copies.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn copy<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Accepted<Vec<String>>, ApiError> {
        let response: CopyResponse = dispatcher.call(COPY, self).await?;
        Ok(Accepted::new(response.volume_ids, response.ack.request_token))
    }
}
