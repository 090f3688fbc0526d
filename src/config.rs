//! Configuration loading via `ortho-config`.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::dispatch::{
    DEFAULT_MAX_RETRIES, DEFAULT_PLATFORM_URL, RetryPolicy,
};
use crate::endpoints::{DEFAULT_API_VERSION, is_supported, supported_versions};

/// Platform connection settings derived from environment variables,
/// configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "SEMUT",
    discovery(
        app_name = "semut",
        env_var = "SEMUT_CONFIG_PATH",
        config_file_name = "semut.toml",
        dotfile_name = ".semut.toml",
        project_file_name = "semut.toml"
    )
)]
pub struct PlatformConfig {
    /// Base URL of the platform API server, without the version path.
    #[ortho_config(default = DEFAULT_PLATFORM_URL.to_owned())]
    pub platform_url: String,
    /// Endpoint table to resolve operations against.
    #[ortho_config(default = DEFAULT_API_VERSION.to_owned())]
    pub api_version: String,
    /// Retries after the first attempt for retryable operations.
    #[ortho_config(default = 5)]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    #[ortho_config(default = 1000)]
    pub retry_initial_backoff_ms: u64,
    /// Cap on the delay between retries, in milliseconds.
    #[ortho_config(default = 30000)]
    pub retry_max_backoff_ms: u64,
    /// Whether to randomise retry delays.
    #[ortho_config(default = true)]
    pub retry_jitter: bool,
    /// Timeout of a single HTTP attempt, in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Optional bound on a whole call including retries, in seconds.
    pub call_deadline_secs: Option<u64>,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn hint(&self) -> String {
        format!(
            "set {} or add {} to semut.toml",
            self.env_var, self.toml_key
        )
    }
}

const PLATFORM_URL: FieldMetadata =
    FieldMetadata::new("platform API URL", "SEMUT_PLATFORM_URL", "platform_url");
const API_VERSION: FieldMetadata =
    FieldMetadata::new("platform API version", "SEMUT_API_VERSION", "api_version");
const REQUEST_TIMEOUT: FieldMetadata = FieldMetadata::new(
    "request timeout",
    "SEMUT_REQUEST_TIMEOUT_SECS",
    "request_timeout_secs",
);
const CALL_DEADLINE: FieldMetadata = FieldMetadata::new(
    "call deadline",
    "SEMUT_CALL_DEADLINE_SECS",
    "call_deadline_secs",
);

impl PlatformConfig {
    /// Builds a configuration pointing at `platform_url` with every other
    /// field at its default.
    #[must_use]
    pub fn new(platform_url: impl Into<String>) -> Self {
        Self {
            platform_url: platform_url.into(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_initial_backoff_ms: 1000,
            retry_max_backoff_ms: 30_000,
            retry_jitter: true,
            request_timeout_secs: 30,
            call_deadline_secs: None,
        }
    }

    /// Loads configuration using the `ortho-config` derive. Values merge
    /// defaults, configuration files, environment variables, and CLI flags in
    /// that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("semut")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages include guidance on how
    /// to provide a better value via environment variables or the
    /// configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the URL is empty and
    /// [`ConfigError::Invalid`] for malformed or out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.platform_url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: {}",
                PLATFORM_URL.description,
                PLATFORM_URL.hint()
            )));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: PLATFORM_URL.toml_key,
                message: format!(
                    "{} `{url}` must start with http:// or https://; {}",
                    PLATFORM_URL.description,
                    PLATFORM_URL.hint()
                ),
            });
        }
        if !is_supported(&self.api_version) {
            return Err(ConfigError::Invalid {
                field: API_VERSION.toml_key,
                message: format!(
                    "{} `{}` is not one of {}; {}",
                    API_VERSION.description,
                    self.api_version,
                    supported_versions().join(", "),
                    API_VERSION.hint()
                ),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: REQUEST_TIMEOUT.toml_key,
                message: format!(
                    "{} must be greater than zero; {}",
                    REQUEST_TIMEOUT.description,
                    REQUEST_TIMEOUT.hint()
                ),
            });
        }
        if self.call_deadline_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: CALL_DEADLINE.toml_key,
                message: format!(
                    "{} must be greater than zero when set; {}",
                    CALL_DEADLINE.description,
                    CALL_DEADLINE.hint()
                ),
            });
        }
        Ok(())
    }

    /// Retry policy described by the `max_retries` and `retry_*` fields.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.retry_initial_backoff_ms),
            max_backoff: Duration::from_millis(self.retry_max_backoff_ms),
            jitter: self.retry_jitter,
        }
    }

    /// Timeout applied to each HTTP attempt.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Bound on a whole call, when configured.
    #[must_use]
    pub fn call_deadline(&self) -> Option<Duration> {
        self.call_deadline_secs.map(Duration::from_secs)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// A field holds a value that cannot be used.
    #[error("invalid configuration field {field}: {message}")]
    Invalid {
        /// TOML key of the offending field.
        field: &'static str,
        /// Actionable description of the problem.
        message: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_describe_a_local_platform() {
        let config = PlatformConfig::new(DEFAULT_PLATFORM_URL);
        assert!(config.validate().is_ok());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.call_deadline(), None);
    }

    #[test]
    fn empty_url_names_env_var_and_key() {
        let config = PlatformConfig::new("  ");
        let Err(ConfigError::MissingField(message)) = config.validate() else {
            panic!("expected missing field");
        };
        assert!(message.contains("SEMUT_PLATFORM_URL"));
        assert!(message.contains("platform_url"));
    }

    #[rstest]
    #[case("localhost:53377")]
    #[case("ftp://platform")]
    fn url_scheme_is_required(#[case] url: &str) {
        let err = PlatformConfig::new(url).validate().expect_err("bad scheme");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "platform_url",
                ..
            }
        ));
    }

    #[test]
    fn unsupported_version_lists_supported_ones() {
        let config = PlatformConfig {
            api_version: String::from("v7"),
            ..PlatformConfig::new(DEFAULT_PLATFORM_URL)
        };
        let err = config.validate().expect_err("unsupported version");
        let message = err.to_string();
        assert!(message.contains("v7"));
        assert!(message.contains("v1"));
        assert!(message.contains("SEMUT_API_VERSION"));
    }

    #[rstest]
    #[case(0, None, "request_timeout_secs")]
    #[case(5, Some(0), "call_deadline_secs")]
    fn zero_durations_are_rejected(
        #[case] timeout: u64,
        #[case] deadline: Option<u64>,
        #[case] field: &str,
    ) {
        let config = PlatformConfig {
            request_timeout_secs: timeout,
            call_deadline_secs: deadline,
            ..PlatformConfig::new(DEFAULT_PLATFORM_URL)
        };
        let Err(ConfigError::Invalid { field: actual, .. }) = config.validate() else {
            panic!("expected invalid field");
        };
        assert_eq!(actual, field);
    }
}
