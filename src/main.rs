//! Binary entry point for the Semut diagnostic CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use clap::Parser;
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use semut_sdk::endpoints::endpoint_table;
use semut_sdk::{
    ApiError, ApiStatus, ConfigError, Dispatcher, Operation, PlatformConfig, RegistryError,
    Transport,
};

mod cli;

use cli::{CallCommand, Cli, EndpointsCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid request body: {0}")]
    Body(String),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli, &mut io::stdout()).await {
        Ok(()) => 0,
        Err(err) => {
            write_error(io::stderr(), &err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    match cli {
        Cli::Endpoints(command) => write_endpoints(&command, out),
        Cli::Call(command) => {
            let config = PlatformConfig::load_without_cli_args()?;
            let dispatcher = Dispatcher::from_config(&config)?;
            call_operation(&dispatcher, &command, out).await
        }
    }
}

fn write_endpoints(command: &EndpointsCommand, out: &mut impl Write) -> Result<(), CliError> {
    let table = endpoint_table(&command.api_version).map_err(ApiError::from)?;
    for (operation, path) in table.iter() {
        writeln!(out, "{operation} {path}")?;
    }
    Ok(())
}

async fn call_operation<T: Transport>(
    dispatcher: &Dispatcher<T>,
    command: &CallCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let version = dispatcher.api_version();
    let name = endpoint_table(version.as_str())
        .map_err(ApiError::from)?
        .operation_name(&command.operation)
        .ok_or_else(|| ApiError::from(RegistryError::EndpointNotAvailable))?;
    let body = read_body(command)?;
    let response: Value = dispatcher.execute(Operation::named(name), &body).await?;
    let status: ApiStatus =
        serde_json::from_value(response.clone()).map_err(|_| ApiError::invalid_response())?;
    status.check()?;
    let rendered =
        serde_json::to_string_pretty(&response).map_err(|_| ApiError::invalid_response())?;
    writeln!(out, "{rendered}")?;
    Ok(())
}

fn read_body(command: &CallCommand) -> Result<Value, CliError> {
    let raw = match (&command.body, &command.body_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => read_to_string_ambient(path).map_err(CliError::Body)?,
        (None, None) => return Ok(Value::Object(serde_json::Map::new())),
    };
    serde_json::from_str(&raw).map_err(|err| CliError::Body(err.to_string()))
}

fn read_to_string_ambient(path: &str) -> Result<String, String> {
    let file = Utf8Path::new(path);
    let (dir_path, file_path) = if file.is_absolute() {
        let parent = file
            .parent()
            .ok_or_else(|| format!("path has no parent directory: {file}"))?;
        let name = file
            .file_name()
            .ok_or_else(|| format!("path has no file name: {file}"))?;
        (parent, Utf8Path::new(name))
    } else {
        (Utf8Path::new("."), file)
    };

    let dir = Dir::open_ambient_dir(dir_path, ambient_authority())
        .map_err(|err| format!("{dir_path}: {err}"))?;
    dir.read_to_string(file_path)
        .map_err(|err| format!("{file}: {err}"))
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
