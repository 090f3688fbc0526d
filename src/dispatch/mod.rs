//! The single chokepoint through which every operation reaches the platform.
//!
//! [`Dispatcher::execute`] resolves an operation name to a path, serializes
//! the request, POSTs it with retry and decodes the body. It only ever
//! produces transport-level errors; [`Dispatcher::call`] additionally turns a
//! non-"200" status in the decoded body into an [`ApiError`].

mod retry;

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{ConfigError, PlatformConfig};
use crate::endpoints::VersionSelector;
use crate::error::ApiError;
use crate::schema::{ApiVersion, AsyncStatus, PlatformResponse, RequestToken};
use crate::transport::{HttpTransport, RawResponse, Transport, TransportError};

pub use retry::{DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, DEFAULT_MAX_RETRIES, RetryPolicy};

/// Base URL used when nothing else is configured.
pub const DEFAULT_PLATFORM_URL: &str = "http://localhost:53377";

/// Whether an operation may be re-sent after a transient failure.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Idempotency {
    /// Reads with no side effects.
    Safe,
    /// Async mutations carrying a request token the platform deduplicates on.
    Tokened,
    /// Synchronous mutations; never re-sent automatically.
    Unsafe,
}

impl Idempotency {
    /// Returns `true` when transient failures may be retried.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Safe | Self::Tokened)
    }
}

/// An operation name paired with its retry classification.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Operation {
    /// Key into the endpoint table, e.g. `WorkerLaunch`.
    pub name: &'static str,
    /// Retry classification.
    pub idempotency: Idempotency,
}

impl Operation {
    /// A read-only operation.
    #[must_use]
    pub const fn read(name: &'static str) -> Self {
        Self {
            name,
            idempotency: Idempotency::Safe,
        }
    }

    /// An async mutation correlated by request token.
    #[must_use]
    pub const fn tokened(name: &'static str) -> Self {
        Self {
            name,
            idempotency: Idempotency::Tokened,
        }
    }

    /// A synchronous mutation.
    #[must_use]
    pub const fn mutation(name: &'static str) -> Self {
        Self {
            name,
            idempotency: Idempotency::Unsafe,
        }
    }

    /// An operation of unknown effect, treated as a mutation.
    #[must_use]
    pub const fn named(name: &'static str) -> Self {
        Self::mutation(name)
    }
}

/// Per-call overrides.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CallOptions {
    /// Upper bound on the whole call, retries and backoff included.
    pub deadline: Option<Duration>,
}

impl CallOptions {
    /// Bounds the call by `deadline`.
    #[must_use]
    pub const fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }
}

/// Sends operations to one platform API server.
///
/// The dispatcher is `Send + Sync` and is meant to be shared; its only mutable
/// state is the active API version.
#[derive(Debug)]
pub struct Dispatcher<T: Transport = HttpTransport> {
    base_url: String,
    versions: VersionSelector,
    retry: RetryPolicy,
    deadline: Option<Duration>,
    transport: T,
}

impl Dispatcher<HttpTransport> {
    /// Creates a dispatcher for `base_url` with default retry settings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_transport(base_url, HttpTransport::default())
    }

    /// Creates a dispatcher from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation or the
    /// HTTP client cannot be built with the configured timeout.
    pub fn from_config(config: &PlatformConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport =
            HttpTransport::with_timeout(config.request_timeout()).map_err(|err| {
                ConfigError::Invalid {
                    field: "request_timeout_secs",
                    message: format!("failed to build HTTP client: {err}"),
                }
            })?;
        let mut dispatcher = Self::with_transport(&config.platform_url, transport)
            .with_retry_policy(config.retry_policy());
        dispatcher.deadline = config.call_deadline();
        dispatcher
            .versions
            .set_active(&config.api_version)
            .map_err(|err| ConfigError::Invalid {
                field: "api_version",
                message: err.to_string(),
            })?;
        Ok(dispatcher)
    }
}

impl Default for Dispatcher<HttpTransport> {
    fn default() -> Self {
        Self::new(DEFAULT_PLATFORM_URL)
    }
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher posting through `transport`.
    #[must_use]
    pub fn with_transport(base_url: impl Into<String>, transport: T) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            versions: VersionSelector::default(),
            retry: RetryPolicy::default(),
            deadline: None,
            transport,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Bounds every call by `deadline` unless [`CallOptions`] override it.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The retry policy in force.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The active-version selector.
    #[must_use]
    pub const fn versions(&self) -> &VersionSelector {
        &self.versions
    }

    /// The API version later calls resolve against.
    #[must_use]
    pub fn api_version(&self) -> ApiVersion {
        self.versions.active()
    }

    /// Switches the API version for every later call on this dispatcher.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] with code `"100"` when `version` is not
    /// supported; the previous version stays active.
    pub fn set_api_version(&self, version: &str) -> Result<(), ApiError> {
        Ok(self.versions.set_active(version)?)
    }

    /// Executes `operation` and decodes the body into `Resp` without looking
    /// at its status code.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for local, transport and decode failures; see
    /// [`crate::error`] for the codes.
    pub async fn execute<Req, Resp>(
        &self,
        operation: Operation,
        request: &Req,
    ) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        self.execute_with(operation, request, CallOptions::default())
            .await
    }

    /// As [`Self::execute`], honouring `options`.
    ///
    /// # Errors
    ///
    /// As [`Self::execute`], plus code `"504"` when the deadline expires.
    pub async fn execute_with<Req, Resp>(
        &self,
        operation: Operation,
        request: &Req,
        options: CallOptions,
    ) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let Some(deadline) = options.deadline.or(self.deadline) else {
            return self.dispatch(operation, request).await;
        };
        if let Ok(outcome) = tokio::time::timeout(deadline, self.dispatch(operation, request)).await
        {
            outcome
        } else {
            warn!(
                operation = operation.name,
                deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                "platform API call exceeded its deadline"
            );
            Err(ApiError::deadline_exceeded())
        }
    }

    /// Executes `operation` and converts a non-"200" status in the decoded
    /// body into an [`ApiError`] carrying the platform's code and description.
    ///
    /// # Errors
    ///
    /// As [`Self::execute`], plus application-level failures reported by the
    /// platform.
    pub async fn call<Req, Resp>(&self, operation: Operation, request: &Req) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned + PlatformResponse,
    {
        self.call_with(operation, request, CallOptions::default())
            .await
    }

    /// As [`Self::call`], honouring `options`.
    ///
    /// # Errors
    ///
    /// As [`Self::call`], plus code `"504"` when the deadline expires.
    pub async fn call_with<Req, Resp>(
        &self,
        operation: Operation,
        request: &Req,
        options: CallOptions,
    ) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned + PlatformResponse,
    {
        let response: Resp = self.execute_with(operation, request, options).await?;
        if let Err(err) = response.api_status().check() {
            debug!(operation = operation.name, code = %err.code, "platform reported failure");
            return Err(err);
        }
        Ok(response)
    }

    /// Submits an async operation whose acknowledgement carries nothing but
    /// the request token, and returns that token.
    ///
    /// # Errors
    ///
    /// As [`Self::call`].
    pub async fn submit<Req>(&self, operation: Operation, request: &Req) -> Result<RequestToken, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
    {
        let ack: AsyncStatus = self.call(operation, request).await?;
        Ok(ack.request_token)
    }

    async fn dispatch<Req, Resp>(&self, operation: Operation, request: &Req) -> Result<Resp, ApiError>
    where
        Req: Serialize + ?Sized + Sync,
        Resp: DeserializeOwned,
    {
        let path = self.versions.resolve_path(operation.name)?;
        let body = serde_json::to_vec(request).map_err(|err| {
            debug!(operation = operation.name, error = %err, "request serialization failed");
            ApiError::invalid_input()
        })?;
        let url = format!("{}{path}", self.base_url);
        let response = self.post_with_retry(operation, &url, &body).await?;
        serde_json::from_slice(&response.body).map_err(|err| {
            debug!(
                operation = operation.name,
                status = response.status,
                error = %err,
                "response decoding failed"
            );
            ApiError::invalid_response()
        })
    }

    async fn post_with_retry(
        &self,
        operation: Operation,
        url: &str,
        body: &[u8],
    ) -> Result<RawResponse, ApiError> {
        let retries = if operation.idempotency.is_retryable() {
            self.retry.max_retries
        } else {
            0
        };
        let mut retry = 0;
        loop {
            debug!(operation = operation.name, url, attempt = retry + 1, "dispatching");
            let outcome = self.transport.post(url, body).await;
            let failure = match outcome {
                Ok(response) if !response.is_transient() => return Ok(response),
                Ok(response) => format!("HTTP {}", response.status),
                Err(TransportError::Body(reason)) => {
                    warn!(operation = operation.name, %reason, "unreadable platform response");
                    return Err(ApiError::unreadable_response());
                }
                Err(TransportError::Connect(reason)) => reason,
            };
            if retry >= retries {
                warn!(
                    operation = operation.name,
                    attempts = retry + 1,
                    %failure,
                    "platform API server unavailable"
                );
                return Err(ApiError::unavailable());
            }
            let delay = self.retry.backoff(retry);
            warn!(
                operation = operation.name,
                %failure,
                backoff_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "retrying platform API call"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}
