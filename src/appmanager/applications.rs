//! Invoking other applications on the platform.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, AsyncRequest, AsyncStatus, RequestToken, async_platform_response};
use crate::transport::Transport;

const INVOKE: Operation = Operation::tokened("ApplicationInvoke");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[INVOKE];

/// Calls a path on another application; the reply arrives as an
/// [`InvokeCallback`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct InvokeRequest {
    /// Callback fields.
    #[serde(flatten)]
    pub async_request: AsyncRequest,
    /// Application to invoke.
    pub application_id: String,
    /// Path within the application.
    pub path: String,
    /// Arbitrary JSON forwarded to the application.
    pub payload: Value,
}

/// Reply of the invoked application.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct InvokeCallback {
    /// Outcome envelope.
    #[serde(flatten)]
    pub ack: AsyncStatus,
    /// Base64 encoded response body.
    pub response: String,
}

async_platform_response!(InvokeCallback);

impl InvokeRequest {
    /// Sends `payload` to `path` on `application_id`.
    #[must_use]
    pub fn new(
        application_id: impl Into<String>,
        path: impl Into<String>,
        payload: Value,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            async_request: AsyncRequest::new(callback_url),
            application_id: application_id.into(),
            path: path.into(),
            payload,
        }
    }

    /// Invokes the application and returns the token the reply will carry.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn invoke<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<RequestToken, ApiError> {
        let ack: AsyncStatus = dispatcher.call(INVOKE, self).await?;
        if ack.request_token.is_empty() {
            return Ok(self.async_request.request_token.clone());
        }
        Ok(ack.request_token)
    }
}

impl InvokeCallback {
    /// The outcome of the invocation.
    #[must_use]
    pub const fn status(&self) -> &ApiStatus {
        &self.ack.status
    }
}
