//! Command-line interface definitions for the `ganeti-rapi` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand};

/// Top-level CLI for the `ganeti-rapi` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ganeti-rapi",
    about = "Create, inspect, and remove Ganeti instances through the remote API",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Manage a single instance.
    #[command(subcommand)]
    Instance(InstanceCommand),
}

/// Instance subcommands.
#[derive(Debug, Subcommand)]
pub(crate) enum InstanceCommand {
    /// Print the cluster's view of an instance.
    #[command(name = "show")]
    Show(ShowCommand),
    /// Create an instance and wait for the job to finish.
    #[command(name = "create")]
    Create(CreateCommand),
    /// Remove an instance and wait for the job to finish.
    #[command(name = "delete")]
    Delete(DeleteCommand),
}

/// Arguments for `ganeti-rapi instance show`.
#[derive(Debug, Args)]
pub(crate) struct ShowCommand {
    /// Instance name.
    pub(crate) name: String,
}

/// Arguments for `ganeti-rapi instance create`.
#[derive(Debug, Args)]
pub(crate) struct CreateCommand {
    /// Instance name.
    #[arg(long)]
    pub(crate) name: String,
    /// Memory with a unit suffix, for example `2G`.
    #[arg(long, value_name = "SIZE")]
    pub(crate) memory: String,
    /// Number of virtual CPUs.
    #[arg(long)]
    pub(crate) vcpus: u32,
    /// Disk size with a unit suffix; repeat for additional disks.
    #[arg(long = "disk", value_name = "SIZE", required = true)]
    pub(crate) disks: Vec<String>,
    /// Network link for an interface; repeat for additional interfaces.
    #[arg(long = "nic", value_name = "LINK", required = true)]
    pub(crate) nics: Vec<String>,
    /// Storage backend template (defaults to `plain`).
    #[arg(long)]
    pub(crate) disk_template: Option<String>,
    /// Hypervisor to spawn the instance on.
    #[arg(long)]
    pub(crate) hypervisor: Option<String>,
    /// Node group to place the instance in.
    #[arg(long = "group")]
    pub(crate) group_name: Option<String>,
    /// Primary node to spawn the instance on.
    #[arg(long)]
    pub(crate) node: Option<String>,
    /// OS definition used to bootstrap the instance.
    #[arg(long)]
    pub(crate) os_type: Option<String>,
    #[command(flatten)]
    pub(crate) job: JobArgs,
}

/// Arguments for `ganeti-rapi instance delete`.
#[derive(Debug, Args)]
pub(crate) struct DeleteCommand {
    /// Instance name.
    pub(crate) name: String,
    #[command(flatten)]
    pub(crate) job: JobArgs,
}

/// Job polling overrides shared by mutating subcommands.
#[derive(Debug, Args)]
pub(crate) struct JobArgs {
    /// Seconds between job status checks.
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub(crate) poll_interval: u64,
    /// Give up waiting for the job after this many seconds (waits
    /// indefinitely when omitted).
    #[arg(long, value_name = "SECS")]
    pub(crate) job_timeout: Option<u64>,
}
