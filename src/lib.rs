//! Client library for the Ganeti remote API.
//!
//! The crate provisions and removes virtual machine instances on a Ganeti
//! cluster. Mutations are asynchronous on the wire: the API answers with a
//! job id, and the client polls that job until it succeeds or fails so that
//! callers see one definitive result per operation.

pub mod backend;
pub mod config;
pub mod instance;
pub mod rapi;

pub use backend::{BackendFuture, InstanceBackend};
pub use config::{ClientSettings, ConfigError, RapiConfig};
pub use instance::{
    BackendParams, BackendParamsRead, Disk, InstanceInfo, InstanceMode, InstanceSpec,
    InstanceSpecBuilder, Nic, format_memory,
};
pub use rapi::{JobId, JobPolicy, JobStatus, Operation, RapiClient, RapiError};
