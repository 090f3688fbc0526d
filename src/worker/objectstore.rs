//! Uploading and downloading object store files from inside a worker.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, platform_response};
use crate::transport::Transport;

pub use crate::appmanager::objectstore::DeleteRequest;

const POST: Operation = Operation::mutation("ObjectStorePost");
const FETCH: Operation = Operation::read("ObjectStoreFetch");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[POST, FETCH];

/// Source and destination of a transfer between the worker's file system and
/// the object store.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ObjectRequest {
    /// Directory the file is read from.
    pub source_dir: String,
    /// File name at the source.
    pub source_name: String,
    /// Directory the file is written to.
    pub destination_dir: String,
    /// File name at the destination.
    pub destination_name: String,
    /// Whether the object is encrypted at rest.
    pub encrypted: bool,
}

/// Uploads a local file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PostRequest {
    /// Transfer.
    #[serde(flatten)]
    pub object: ObjectRequest,
}

/// Response to [`PostRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PostResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Identifier of the stored object.
    pub object_id: String,
}

/// Downloads an object to the local file system.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct FetchRequest {
    /// Transfer.
    #[serde(flatten)]
    pub object: ObjectRequest,
}

platform_response!(PostResponse);

impl PostRequest {
    /// Uploads the file and returns the object identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn post<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<String, ApiError> {
        let response: PostResponse = dispatcher.call(POST, self).await?;
        Ok(response.object_id)
    }
}

impl FetchRequest {
    /// Downloads the object.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn fetch<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(FETCH, self).await?;
        Ok(())
    }
}
