//! Job polling: turns an asynchronous cluster job into a definitive result.
//!
//! Mutations answer with a job id. The job is assumed pending straight away
//! and its status is fetched until it reports `success` or `error`, sleeping
//! for the poll interval between fetches. Any failure while fetching aborts
//! the loop immediately.

use std::fmt;
use std::str::{self, Utf8Error};
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use super::transport::resource_path;
use super::{RapiClient, RapiError};

/// Interval between job status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Status values the API reports for jobs that are still in flight.
const IN_FLIGHT_STATUSES: [&str; 5] = ["pending", "queued", "waiting", "running", "canceling"];

/// Opaque identifier of a cluster job.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Extracts a job id from the body of a mutating request. A single
    /// trailing newline is stripped; everything else is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns the UTF-8 error when the body is not valid text.
    pub fn from_response_body(body: &[u8]) -> Result<Self, Utf8Error> {
        let text = str::from_utf8(body)?;
        let trimmed = text.strip_suffix('\n').unwrap_or(text);
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mutation a job was submitted for. Used to label job failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
    /// Instance creation.
    CreateInstance,
    /// Instance removal.
    DeleteInstance,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateInstance => f.write_str("create instance"),
            Self::DeleteInstance => f.write_str("delete instance"),
        }
    }
}

/// Client-side view of a job's progress.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JobStatus {
    /// Not finished yet. Also covers any status this client does not know.
    Pending,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Error,
}

impl JobStatus {
    /// Maps a wire status onto the three recognised states. Unknown values
    /// are treated as pending and logged.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "success" => Self::Success,
            "error" => Self::Error,
            known if IN_FLIGHT_STATUSES.contains(&known) => Self::Pending,
            unknown => {
                warn!(status = unknown, "unrecognised job status; treating as pending");
                Self::Pending
            }
        }
    }
}

#[derive(Deserialize)]
struct JobStatusBody {
    status: String,
}

/// How a client waits for jobs to finish.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JobPolicy {
    /// Pause between status fetches while the job is pending.
    pub poll_interval: Duration,
    /// Optional upper bound on the total wait. `None` waits indefinitely.
    pub deadline: Option<Duration>,
}

impl Default for JobPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            deadline: None,
        }
    }
}

impl RapiClient {
    /// Fetches the current status of a job.
    ///
    /// # Errors
    ///
    /// Returns the transport or decoding error of the status request.
    pub async fn job_status(&self, job_id: &JobId) -> Result<JobStatus, RapiError> {
        let path = resource_path("jobs", "job id", job_id.as_str())?;
        let body = self.get(&path).await?;
        let parsed: JobStatusBody =
            serde_json::from_slice(&body).map_err(|source| RapiError::Decode {
                context: format!("status of job {job_id}"),
                source,
            })?;
        Ok(JobStatus::from_wire(&parsed.status))
    }

    /// Polls a job until it reaches a terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`RapiError::JobFailed`] when the job ends in `error`,
    /// [`RapiError::JobTimeout`] when an opt-in deadline elapses, or the
    /// first transport or decoding error raised while fetching status.
    pub async fn wait_for_job(
        &self,
        job_id: &JobId,
        operation: Operation,
    ) -> Result<(), RapiError> {
        let started = Instant::now();
        let mut state = JobStatus::Pending;
        let mut fetches: u32 = 0;

        loop {
            match state {
                JobStatus::Success => {
                    info!(job = %job_id, %operation, fetches, "job succeeded");
                    return Ok(());
                }
                JobStatus::Error => {
                    warn!(job = %job_id, %operation, fetches, "job failed");
                    return Err(RapiError::JobFailed {
                        job_id: job_id.clone(),
                        operation,
                    });
                }
                JobStatus::Pending => {}
            }

            if fetches > 0 {
                let waited = started.elapsed();
                let pause = match self.job_policy.deadline {
                    Some(limit) if waited >= limit => {
                        return Err(RapiError::JobTimeout {
                            job_id: job_id.clone(),
                            operation,
                            waited,
                        });
                    }
                    // Never nap past the deadline; one last fetch follows.
                    Some(limit) => self.job_policy.poll_interval.min(limit.saturating_sub(waited)),
                    None => self.job_policy.poll_interval,
                };
                sleep(pause).await;
            }

            state = self.job_status(job_id).await?;
            fetches = fetches.saturating_add(1);
            debug!(job = %job_id, ?state, fetches, "fetched job status");
        }
    }
}
