//! Container images imported into the platform repository.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, is_zero, platform_response};
use crate::transport::Transport;

const NEW: Operation = Operation::mutation("ImagesNew");
const GET: Operation = Operation::read("ImagesGet");
const DELETE: Operation = Operation::mutation("ImagesDelete");
const LIST: Operation = Operation::read("ImagesList");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[NEW, GET, DELETE, LIST];

/// Where an image is pulled from.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ImageSpec {
    /// Registry host; empty means Docker Hub.
    #[serde(rename = "registry", skip_serializing_if = "String::is_empty")]
    pub registry_host: String,
    /// Registry port; the platform assumes 443 when unset.
    #[serde(skip_serializing_if = "is_zero")]
    pub registry_port: i32,
    /// Image name.
    pub name: String,
    /// Image tag; the platform assumes `latest` when unset.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
}

/// An imported image.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Image {
    /// Identifier assigned on import.
    pub image_uri: String,
    /// Source of the image.
    #[serde(flatten)]
    pub spec: ImageSpec,
}

/// Imports an image.
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NewImageRequest {
    /// Source of the image.
    #[serde(flatten)]
    pub spec: ImageSpec,
    /// Base64 `username:token` for private registries.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth: String,
}

impl std::fmt::Debug for NewImageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewImageRequest")
            .field("spec", &self.spec)
            .field("auth", &if self.auth.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Response to [`NewImageRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NewImageResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Identifier of the imported image.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_uri: String,
}

/// Addresses one image by identifier.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ImageRequest {
    /// Image identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image_uri: String,
}

/// Describes an image.
pub type DescribeRequest = ImageRequest;
/// Deletes an image.
pub type DeleteRequest = ImageRequest;

/// Response to [`DescribeRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DescribeResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// The image.
    #[serde(flatten)]
    pub image: Image,
}

/// Lists every imported image.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListRequest {}

/// Response to [`ListRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Imported images.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<Image>,
}

platform_response!(NewImageResponse, DescribeResponse, ListResponse);

impl NewImageRequest {
    /// Imports the image and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn create<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<String, ApiError> {
        let response: NewImageResponse = dispatcher.call(NEW, self).await?;
        Ok(response.image_uri)
    }
}

impl ImageRequest {
    /// Addresses the image `image_uri`.
    #[must_use]
    pub fn new(image_uri: impl Into<String>) -> Self {
        Self {
            image_uri: image_uri.into(),
        }
    }

    /// Fetches the image details.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn describe<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Image, ApiError> {
        let response: DescribeResponse = dispatcher.call(GET, self).await?;
        Ok(response.image)
    }

    /// Deletes the image.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DELETE, self).await?;
        Ok(())
    }
}

impl ListRequest {
    /// Lists every imported image.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Vec<Image>, ApiError> {
        let response: ListResponse = dispatcher.call(LIST, self).await?;
        Ok(response.images)
    }
}
