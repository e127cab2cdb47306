//! Binary entry point for the `ganeti-rapi` CLI.

use std::io::{self, Write};
use std::process;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use ganeti_rapi::{InstanceBackend, InstanceInfo, InstanceSpec, RapiClient, RapiConfig};

mod cli;

use cli::{Cli, CreateCommand, InstanceCommand, JobArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid instance specification: {0}")]
    Spec(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
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

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config =
        RapiConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let Cli::Instance(command) = cli;
    let base_client =
        RapiClient::from_config(&config).map_err(|err| CliError::Config(err.to_string()))?;
    let client = match &command {
        InstanceCommand::Show(_) => base_client,
        InstanceCommand::Create(args) => apply_job_args(base_client, &args.job),
        InstanceCommand::Delete(args) => apply_job_args(base_client, &args.job),
    };
    run_instance_command(&client, command, io::stdout()).await
}

fn apply_job_args(client: RapiClient, args: &JobArgs) -> RapiClient {
    let polled = client.with_poll_interval(Duration::from_secs(args.poll_interval));
    match args.job_timeout {
        Some(secs) => polled.with_job_deadline(Duration::from_secs(secs)),
        None => polled,
    }
}

async fn run_instance_command<B: InstanceBackend>(
    backend: &B,
    command: InstanceCommand,
    mut out: impl Write,
) -> Result<(), CliError> {
    match command {
        InstanceCommand::Show(args) => {
            let info = backend
                .read(&args.name)
                .await
                .map_err(|err| CliError::Backend(err.to_string()))?;
            write_instance(&mut out, &info)?;
        }
        InstanceCommand::Create(args) => {
            let spec = build_spec(args)?;
            let created = backend
                .create(spec)
                .await
                .map_err(|err| CliError::Backend(err.to_string()))?;
            writeln!(out, "created instance {}", created.name)?;
        }
        InstanceCommand::Delete(args) => {
            backend
                .delete(&args.name)
                .await
                .map_err(|err| CliError::Backend(err.to_string()))?;
            writeln!(out, "deleted instance {}", args.name)?;
        }
    }
    Ok(())
}

fn build_spec(args: CreateCommand) -> Result<InstanceSpec, CliError> {
    let builder = args.disks.into_iter().fold(
        InstanceSpec::builder()
            .name(args.name)
            .memory(args.memory)
            .vcpus(args.vcpus),
        |builder, size| builder.disk(size),
    );
    args.nics
        .into_iter()
        .fold(builder, |builder, link| builder.nic(link))
        .disk_template(args.disk_template)
        .hypervisor(args.hypervisor)
        .group_name(args.group_name)
        .node(args.node)
        .os_type(args.os_type)
        .build()
        .map_err(|err| CliError::Spec(err.to_string()))
}

fn write_instance(out: &mut impl Write, info: &InstanceInfo) -> io::Result<()> {
    writeln!(out, "name:          {}", info.name)?;
    writeln!(out, "uuid:          {}", info.uuid)?;
    writeln!(out, "status:        {}", info.status)?;
    writeln!(out, "admin state:   {}", info.admin_state)?;
    writeln!(out, "node:          {}", info.node)?;
    writeln!(out, "os:            {}", info.os_type)?;
    writeln!(out, "disk template: {}", info.disk_template)?;
    writeln!(out, "vcpus:         {}", info.backend_params.vcpus)?;
    writeln!(
        out,
        "memory:        {} ({})",
        info.memory_label(),
        info.backend_params.memory
    )?;
    Ok(())
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
