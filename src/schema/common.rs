//! Value types reused across resource families.

use serde::{Deserialize, Serialize};

use super::is_zero;

/// Minimum and maximum resource limits.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ResourceRequestRange {
    /// Lower CPU limit as a fraction of a vCPU, e.g. `1.5`.
    pub cpu_lower_limit: String,
    /// Upper CPU limit as a fraction of a vCPU, e.g. `2.5`.
    pub cpu_upper_limit: String,
    /// Lower memory limit, e.g. `0.5GB`.
    pub memory_lower_limit: String,
    /// Upper memory limit, e.g. `1.4GB`.
    pub memory_upper_limit: String,
}

/// Upper resource limits only.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ResourceRequestLimit {
    /// Upper CPU limit as a fraction of a vCPU.
    pub cpu_upper_limit: String,
    /// Upper memory limit.
    pub memory_upper_limit: String,
}

string_enum!(
    /// Layer-4 protocol of an exposed port.
    Protocol {
        /// TCP.
        Tcp => "TCP",
        /// UDP.
        Udp => "UDP",
        /// SCTP.
        Sctp => "SCTP",
    }
);

/// A container port exposed by a worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Port {
    /// Name unique within the worker group.
    pub name: String,
    /// Container port number.
    #[serde(rename = "portnumber")]
    pub port_number: i32,
    /// Protocol used on the port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
}

/// A log file exposed by a worker.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Log {
    /// Path to the log file.
    pub path: String,
    /// Display name.
    pub name: String,
}

string_enum!(
    /// How workers in a group are replaced on update.
    UpdateStrategy {
        /// Replace workers gradually.
        RollingUpdate => "RollingUpdate",
        /// Recreate every worker.
        Recreate => "Recreate",
    }
);

string_enum!(
    /// Health reported for a worker or worker group.
    Health {
        /// Healthy.
        Healthy => "Healthy",
        /// Unhealthy.
        Unhealthy => "Unhealthy",
    }
);

string_enum!(
    /// Lifecycle state of a platform entity.
    Status {
        /// Being launched.
        Launching => "Launching",
        /// Launch failed.
        LaunchFailed => "LaunchFailed",
        /// Running.
        Running => "Running",
        /// Being started.
        Starting => "Starting",
        /// Being updated.
        Updating => "Updating",
        /// Being stopped.
        Stopping => "Stopping",
        /// Stopped.
        Stopped => "Stopped",
        /// Being terminated.
        Terminating => "Terminating",
        /// Terminated.
        Terminated => "Terminated",
    }
);

/// Where a worker exposes its metrics.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct MetricsEndpoint {
    /// HTTP path of the metrics endpoint.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub metrics_path: String,
    /// Port on the main container serving metrics.
    #[serde(skip_serializing_if = "is_zero")]
    pub metrics_port: i32,
}

string_enum!(
    /// Kind of platform event.
    EventType {
        /// Emitted when a metrics expression becomes true.
        Metric => "Metric",
        /// Emitted when a log regex matches.
        Logging => "Logging",
    }
);

string_enum!(
    /// Kind of volume.
    VolumeType {
        /// Block volume.
        Block => "Block",
        /// File-system volume.
        FileSystem => "FileSystem",
    }
);

string_enum!(
    /// Whether metrics are aggregated or the latest sample is returned.
    MetricsQueryMode {
        /// Summarize values over the interval.
        FetchAggregate => "FetchAggregate",
        /// Return the latest collected value.
        FetchLatest => "FetchLatest",
    }
);

string_enum!(
    /// Level at which metrics are aggregated.
    MetricsAggregationLevel {
        /// Per deployment.
        Deployment => "Deployment",
        /// Per worker group.
        WorkerGroup => "WorkerGroup",
        /// Per worker.
        Worker => "Worker",
    }
);

string_enum!(
    /// Format of generated credentials.
    CredentialType {
        /// Alphanumeric characters.
        AlphaNumeric => "AlphaNumeric",
        /// SHA-256 digest.
        Sha256 => "SHA256",
        /// Hexadecimal characters.
        Hexadecimal => "Hexadecimal",
        /// Caller-supplied regex format.
        Regex => "Regex",
    }
);
