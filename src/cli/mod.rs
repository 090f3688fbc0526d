//! Command-line interface definitions for the `semut` binary.
//!
//! The parser lives on its own so the build script can reuse it when
//! generating the manual page.

use clap::{Args, Parser};

/// Top-level CLI for the `semut` binary.
#[derive(Debug, Parser)]
#[command(
    name = "semut",
    about = "Inspect and call the Semut platform management API",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Print the operations of an API version with their paths.
    #[command(name = "endpoints")]
    Endpoints(EndpointsCommand),
    /// Send a raw JSON request to one operation and print the reply.
    #[command(name = "call")]
    Call(CallCommand),
}

/// Arguments for `semut endpoints`.
#[derive(Debug, Args)]
pub(crate) struct EndpointsCommand {
    /// API version to list.
    #[arg(long, value_name = "VERSION", default_value = "v1")]
    pub(crate) api_version: String,
}

/// Arguments for `semut call`.
#[derive(Debug, Args)]
pub(crate) struct CallCommand {
    /// Operation name, e.g. `WorkerDescribe`.
    #[arg(value_name = "OPERATION")]
    pub(crate) operation: String,
    /// Request body as inline JSON; `{}` when neither body flag is given.
    #[arg(long, value_name = "JSON", conflicts_with = "body_file")]
    pub(crate) body: Option<String>,
    /// Read the request body from a JSON file.
    #[arg(long, value_name = "PATH", conflicts_with = "body")]
    pub(crate) body_file: Option<String>,
}
