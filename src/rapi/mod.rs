//! Client for the Ganeti remote API.
//!
//! [`RapiClient`] carries the immutable connection settings and a pooled
//! HTTP client. It is cheap to clone and safe to share between tasks; every
//! operation runs as a plain sequence of requests on the calling task.

mod error;
mod job;
mod lifecycle;
mod transport;

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{BackendFuture, InstanceBackend};
use crate::config::{ClientSettings, RapiConfig};
use crate::instance::{InstanceInfo, InstanceSpec};

pub use error::RapiError;
pub use job::{DEFAULT_POLL_INTERVAL, JobId, JobPolicy, JobStatus, Operation};

/// Overall timeout applied to each HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client that drives instance lifecycles through the remote API.
#[derive(Clone, Debug)]
pub struct RapiClient {
    settings: Arc<ClientSettings>,
    http: reqwest::Client,
    job_policy: JobPolicy,
}

impl RapiClient {
    /// Constructs a client from already validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`RapiError::Transport`] when the HTTP client cannot be
    /// initialised.
    pub fn new(settings: ClientSettings) -> Result<Self, RapiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(!settings.verify_tls)
            .build()
            .map_err(|source| RapiError::Transport {
                context: String::from("building HTTP client"),
                source,
            })?;
        Ok(Self {
            settings: Arc::new(settings),
            http,
            job_policy: JobPolicy::default(),
        })
    }

    /// Validates the configuration and constructs a client from it.
    ///
    /// # Errors
    ///
    /// Returns [`RapiError::Config`] when the configuration is incomplete,
    /// or [`RapiError::Transport`] when the HTTP client cannot be built.
    pub fn from_config(config: &RapiConfig) -> Result<Self, RapiError> {
        Self::new(config.client_settings()?)
    }

    /// Overrides the pause between job status fetches.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.job_policy.poll_interval = interval;
        self
    }

    /// Bounds the total time spent waiting for a single job. Without this the
    /// client waits for as long as the job stays pending.
    #[must_use]
    pub const fn with_job_deadline(mut self, deadline: Duration) -> Self {
        self.job_policy.deadline = Some(deadline);
        self
    }

    /// Returns the active job polling policy.
    #[must_use]
    pub const fn job_policy(&self) -> JobPolicy {
        self.job_policy
    }
}

impl InstanceBackend for RapiClient {
    type Error = RapiError;

    fn read<'a>(&'a self, name: &'a str) -> BackendFuture<'a, InstanceInfo, Self::Error> {
        Box::pin(async move { self.read_instance(name).await })
    }

    fn create(&self, spec: InstanceSpec) -> BackendFuture<'_, InstanceSpec, Self::Error> {
        Box::pin(async move { self.create_instance(spec).await })
    }

    fn delete<'a>(&'a self, name: &'a str) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move { self.delete_instance(name).await })
    }
}
