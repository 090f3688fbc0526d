//! Wire shapes shared by every resource module.
//!
//! Every response body carries an [`ApiStatus`]; async operations add the
//! echoed [`RequestToken`] through [`AsyncStatus`]. Requests for async
//! operations embed an [`AsyncRequest`]. All of these are flattened into the
//! surrounding JSON object, matching the platform's wire format.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, StatusCode};

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A value this client does not know about, kept verbatim.
            Other(String),
        }

        impl $name {
            /// Returns the wire representation.
            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $wire,)+
                    Self::Other(value) => value.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

macro_rules! platform_response {
    ($($name:ty),+ $(,)?) => {
        $(
            impl $crate::schema::PlatformResponse for $name {
                fn api_status(&self) -> &$crate::schema::ApiStatus {
                    &self.status
                }
            }
        )+
    };
}

macro_rules! async_platform_response {
    ($($name:ty),+ $(,)?) => {
        $(
            impl $crate::schema::PlatformResponse for $name {
                fn api_status(&self) -> &$crate::schema::ApiStatus {
                    &self.ack.status
                }
            }
        )+
    };
}

pub(crate) use async_platform_response;
pub(crate) use platform_response;

mod common;
mod types;

pub use common::{
    CredentialType, EventType, Health, Log, MetricsAggregationLevel, MetricsEndpoint,
    MetricsQueryMode, Port, Protocol, ResourceRequestLimit, ResourceRequestRange, Status,
    UpdateStrategy, VolumeType,
};
pub use types::{ApiVersion, RequestToken};

/// Status envelope present in every platform response.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ApiStatus {
    /// Platform status code; `"200"` means success.
    pub status_code: String,
    /// Human readable description supplied by the platform.
    pub description: String,
}

impl ApiStatus {
    /// Returns the normalized status code.
    #[must_use]
    pub fn code(&self) -> StatusCode {
        StatusCode::parse(&self.status_code)
    }

    /// Converts a non-success status into an [`ApiError`] carrying the
    /// platform's code and description verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] whenever the status code is not `"200"`.
    pub fn check(&self) -> Result<(), ApiError> {
        if self.code().is_ok() {
            return Ok(());
        }
        Err(ApiError::new(&self.status_code, &self.description))
    }
}

/// Acknowledgement envelope returned by async operations.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AsyncStatus {
    /// Status of the acknowledgement itself.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Token echoed from the request, used to correlate the later callback.
    pub request_token: RequestToken,
}

/// Fields carried by every async request.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AsyncRequest {
    /// URL the platform calls back once the operation completes.
    pub callback_url: String,
    /// Token identifying this request in the callback.
    pub request_token: RequestToken,
}

impl AsyncRequest {
    /// Builds async request fields with a freshly generated token.
    #[must_use]
    pub fn new(callback_url: impl Into<String>) -> Self {
        Self {
            callback_url: callback_url.into(),
            request_token: RequestToken::generate(),
        }
    }
}

/// Implemented by every decoded response so the dispatcher can inspect the
/// embedded status code.
pub trait PlatformResponse {
    /// Returns the status envelope of the response.
    fn api_status(&self) -> &ApiStatus;
}

impl PlatformResponse for ApiStatus {
    fn api_status(&self) -> &ApiStatus {
        self
    }
}

impl PlatformResponse for AsyncStatus {
    fn api_status(&self) -> &ApiStatus {
        &self.status
    }
}

/// Result of an async operation whose acknowledgement also carries a value
/// (for example the identifier of the resource being created).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Accepted<T> {
    /// Value returned with the acknowledgement.
    pub value: T,
    /// Token correlating the later callback.
    pub request_token: RequestToken,
}

impl<T> Accepted<T> {
    /// Pairs `value` with the acknowledgement's token.
    #[must_use]
    pub const fn new(value: T, request_token: RequestToken) -> Self {
        Self {
            value,
            request_token,
        }
    }
}

pub(crate) fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Serde adapter encoding durations as integer nanoseconds.
pub(crate) mod nanos {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                let nanos =
                    u64::try_from(duration.as_nanos()).map_err(serde::ser::Error::custom)?;
                serializer.serialize_u64(nanos)
            }
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let raw = Option::<u64>::deserialize(deserializer)?;
        Ok(raw.filter(|nanos| *nanos != 0).map(Duration::from_nanos))
    }
}
