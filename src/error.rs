//! Error model shared by every platform operation.
//!
//! Callers only ever see [`ApiError`]: a `(code, description)` pair that
//! either carries the platform's own status code verbatim or one of the
//! reserved local codes below.

use std::fmt;

use thiserror::Error;

/// Code used for failures detected before any network I/O.
pub const LOCAL_FAILURE_CODE: &str = "100";
/// Code returned when the request cannot be serialized.
pub const INVALID_INPUT_CODE: &str = "400";
/// Code returned when the response body does not decode.
pub const INVALID_RESPONSE_CODE: &str = "500";
/// Code returned when the platform cannot be reached.
pub const UNAVAILABLE_CODE: &str = "502";
/// Code returned when the response body cannot be read.
pub const UNREADABLE_RESPONSE_CODE: &str = "503";
/// Code returned when a call exceeds its deadline.
pub const DEADLINE_EXCEEDED_CODE: &str = "504";

/// Structured error returned by every operation.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{code}: {description}")]
pub struct ApiError {
    /// Platform status code, or one of the reserved local codes.
    pub code: String,
    /// Human readable description of the failure.
    pub description: String,
}

impl ApiError {
    /// Builds an error from an arbitrary code and description.
    #[must_use]
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Wraps a pre-flight failure under the reserved local code.
    #[must_use]
    pub fn local(cause: impl fmt::Display) -> Self {
        Self::new(LOCAL_FAILURE_CODE, cause.to_string())
    }

    /// The request value could not be serialized.
    #[must_use]
    pub fn invalid_input() -> Self {
        Self::new(INVALID_INPUT_CODE, "invalid JSON input")
    }

    /// The response body did not decode into the expected shape.
    #[must_use]
    pub fn invalid_response() -> Self {
        Self::new(
            INVALID_RESPONSE_CODE,
            "invalid JSON response from platform API server",
        )
    }

    /// The POST failed after retries were exhausted.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(UNAVAILABLE_CODE, "platform API server unavailable")
    }

    /// The response body could not be read.
    #[must_use]
    pub fn unreadable_response() -> Self {
        Self::new(
            UNREADABLE_RESPONSE_CODE,
            "error reading response from platform API server",
        )
    }

    /// The call did not complete before its deadline.
    #[must_use]
    pub fn deadline_exceeded() -> Self {
        Self::new(
            DEADLINE_EXCEEDED_CODE,
            "platform API call exceeded its deadline",
        )
    }

    /// Returns the normalized form of [`ApiError::code`].
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::parse(&self.code)
    }
}

impl From<RegistryError> for ApiError {
    fn from(value: RegistryError) -> Self {
        Self::local(value)
    }
}

/// Errors raised by the endpoint registry.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum RegistryError {
    /// The requested API version is not supported by this client.
    #[error("invalid version")]
    VersionNotAvailable,
    /// The operation is not part of the active version's endpoint table.
    #[error("invalid endpoint, please verify if the endpoint exists in the specified version")]
    EndpointNotAvailable,
}

/// Normalized form of the wire `status_code` string.
///
/// The platform reports success as the string `"200"`; anything else,
/// including an empty or non-numeric value, is a failure.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum StatusCode {
    /// The platform accepted the request.
    Ok,
    /// The platform rejected the request with the given raw code.
    Failed(String),
}

impl StatusCode {
    const SUCCESS: u16 = 200;

    /// Normalizes a raw wire status code.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<u16>() {
            Ok(Self::SUCCESS) => Self::Ok,
            _ => Self::Failed(raw.to_owned()),
        }
    }

    /// Returns `true` for the success sentinel.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("200", true)]
    #[case(" 200 ", true)]
    #[case("404", false)]
    #[case("", false)]
    #[case("OK", false)]
    #[case("2000", false)]
    fn status_code_recognises_only_the_success_sentinel(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(StatusCode::parse(raw).is_ok(), ok);
    }

    #[test]
    fn failed_status_keeps_the_raw_code() {
        assert_eq!(
            StatusCode::parse("409"),
            StatusCode::Failed(String::from("409"))
        );
    }

    #[test]
    fn api_error_displays_code_and_description() {
        let err = ApiError::new("404", "not found");
        assert_eq!(err.to_string(), "404: not found");
    }

    #[test]
    fn registry_errors_become_local_failures() {
        let err = ApiError::from(RegistryError::EndpointNotAvailable);
        assert_eq!(err.code, LOCAL_FAILURE_CODE);
        assert!(err.description.starts_with("invalid endpoint"));
    }

    #[rstest]
    #[case(ApiError::invalid_input(), "400")]
    #[case(ApiError::invalid_response(), "500")]
    #[case(ApiError::unavailable(), "502")]
    #[case(ApiError::unreadable_response(), "503")]
    #[case(ApiError::deadline_exceeded(), "504")]
    fn reserved_errors_use_fixed_codes(#[case] err: ApiError, #[case] code: &str) {
        assert_eq!(err.code, code);
        assert!(!err.description.is_empty());
    }
}
