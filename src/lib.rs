//! Client library for the Semut platform management API.
//!
//! Application managers and workers running on the platform drive it through
//! a local API server. Every operation is a JSON `POST` to a versioned path;
//! the [`Dispatcher`] resolves the path, sends the request with retry and
//! decodes the reply, and the resource modules under [`appmanager`] and
//! [`worker`] wrap each operation in a typed request.

pub mod appmanager;
pub mod config;
pub mod dispatch;
pub mod endpoints;
pub mod error;
pub mod relational;
pub mod schema;
pub mod test_support;
pub mod transport;
pub mod worker;

pub use config::{ConfigError, PlatformConfig};
pub use dispatch::{
    CallOptions, DEFAULT_PLATFORM_URL, Dispatcher, Idempotency, Operation, RetryPolicy,
};
pub use endpoints::{DEFAULT_API_VERSION, VersionSelector, supported_versions};
pub use error::{ApiError, RegistryError, StatusCode};
pub use relational::DatabaseDetails;
pub use schema::{Accepted, ApiStatus, ApiVersion, AsyncRequest, AsyncStatus, RequestToken};
pub use transport::{HttpTransport, RawResponse, Transport, TransportError};
