//! Exporting worker log files to the object store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, is_zero, nanos, platform_response};
use crate::transport::Transport;

const ENABLE: Operation = Operation::mutation("LogExportEnable");
const DISABLE: Operation = Operation::mutation("LogExportDisable");
const LIST: Operation = Operation::read("LogExportList");
const UPDATE: Operation = Operation::mutation("LogExportUpdate");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[ENABLE, DISABLE, LIST, UPDATE];

/// Scope of a log export: a deployment, optionally narrowed.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LogExportScope {
    /// Deployment.
    pub deployment_id: String,
    /// Narrows the scope to one worker group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Narrows the scope to one worker.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_id: String,
}

/// Which file is exported and how it is rotated.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LogExportSpec {
    /// Scope.
    #[serde(flatten)]
    pub scope: LogExportScope,
    /// Log file path inside the workers.
    pub filepath: String,
    /// Rotate once the file reaches this many bytes.
    #[serde(skip_serializing_if = "is_zero")]
    pub max_file_size: i64,
    /// Rotate files older than this.
    #[serde(with = "nanos", skip_serializing_if = "Option::is_none")]
    pub max_created_before: Option<Duration>,
    /// Name format of rotated files.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rotation_format: String,
    /// Rotated files kept.
    #[serde(skip_serializing_if = "is_zero")]
    pub file_count: i32,
    /// Upload rotated files to the object store.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub upload: bool,
}

/// A configured log export.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct LogExport {
    /// Export identifier.
    pub log_export_id: String,
    /// Configuration.
    #[serde(flatten)]
    pub spec: LogExportSpec,
}

/// Enables exporting a log file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EnableRequest {
    /// Configuration.
    #[serde(flatten)]
    pub spec: LogExportSpec,
}

/// Replaces the configuration of an export.
pub type UpdateRequest = EnableRequest;

/// Stops exporting a log file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DisableRequest {
    /// Scope.
    #[serde(flatten)]
    pub scope: LogExportScope,
    /// Log file path inside the workers.
    pub filepath: String,
}

/// Lists exports within a scope.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListRequest {
    /// Scope.
    #[serde(flatten)]
    pub scope: LogExportScope,
}

/// Response to [`ListRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Configured exports.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub log_exports: Vec<LogExport>,
}

platform_response!(ListResponse);

impl EnableRequest {
    /// Enables the export.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn enable<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(ENABLE, self).await?;
        Ok(())
    }

    /// Replaces the configuration of the export with the same scope and path.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn update<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(UPDATE, self).await?;
        Ok(())
    }
}

impl DisableRequest {
    /// Disables the export.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn disable<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DISABLE, self).await?;
        Ok(())
    }
}

impl ListRequest {
    /// Lists the exports.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Vec<LogExport>, ApiError> {
        let response: ListResponse = dispatcher.call(LIST, self).await?;
        Ok(response.log_exports)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatch::RetryPolicy;
    use crate::test_support::{ScriptedTransport, assert_round_trips, failure_body, ok_body};

    fn dispatcher(transport: &ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::with_transport("http://platform.test", transport.clone())
            .with_retry_policy(RetryPolicy::fast())
    }

    fn scope() -> LogExportScope {
        LogExportScope {
            deployment_id: String::from("dep"),
            ..LogExportScope::default()
        }
    }

    #[tokio::test]
    async fn enable_encodes_rotation_settings() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({})));
        EnableRequest {
            spec: LogExportSpec {
                scope: scope(),
                filepath: String::from("/var/log/app.log"),
                max_created_before: Some(Duration::from_secs(3600)),
                file_count: 3,
                upload: true,
                ..LogExportSpec::default()
            },
        }
        .enable(&dispatcher(&transport))
        .await
        .expect("enabled");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(
            body,
            json!({
                "deployment_id": "dep",
                "filepath": "/var/log/app.log",
                "max_created_before": 3_600_000_000_000_u64,
                "file_count": 3,
                "upload": true
            })
        );
    }

    #[tokio::test]
    async fn disable_propagates_decode_failures() {
        let transport = ScriptedTransport::new();
        transport.push_raw(200, b"oops".to_vec());
        let err = DisableRequest {
            scope: scope(),
            filepath: String::from("/var/log/app.log"),
        }
        .disable(&dispatcher(&transport))
        .await
        .expect_err("not json");
        assert_eq!(err.code, "500");
    }

    #[tokio::test]
    async fn list_reports_platform_failure() {
        let transport = ScriptedTransport::new();
        transport.push_json(&failure_body("404", "deployment not found"));
        let err = ListRequest { scope: scope() }
            .list(&dispatcher(&transport))
            .await
            .expect_err("missing");
        assert_eq!(err.description, "deployment not found");
    }

    #[test]
    fn log_export_shapes_round_trip() {
        let full_scope = LogExportScope {
            deployment_id: String::from("dep"),
            worker_group_id: String::from("wg"),
            worker_id: String::from("w-1"),
        };
        let spec = LogExportSpec {
            scope: full_scope.clone(),
            filepath: String::from("/var/log/app.log"),
            max_file_size: 10_485_760,
            max_created_before: Some(Duration::from_secs(3600)),
            rotation_format: String::from("2006-01-02"),
            file_count: 7,
            upload: true,
        };
        assert_round_trips(&EnableRequest { spec: spec.clone() });
        assert_round_trips(&DisableRequest {
            scope: full_scope,
            filepath: String::from("/var/log/app.log"),
        });
        assert_round_trips(&ListRequest { scope: scope() });
        assert_round_trips(&ListResponse {
            status: ApiStatus {
                status_code: String::from("200"),
                description: String::new(),
            },
            log_exports: vec![LogExport {
                log_export_id: String::from("le-1"),
                spec,
            }],
        });
    }
}
