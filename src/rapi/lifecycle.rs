//! Instance read, create, and delete operations.
//!
//! Reads are a single request. Creates and deletes answer with a job id and
//! only return once that job reaches a terminal state.

use tracing::info;

use crate::instance::{InstanceInfo, InstanceSpec};

use super::transport::resource_path;
use super::{JobId, Operation, RapiClient, RapiError};

impl RapiClient {
    /// Fetches the cluster's view of an instance.
    ///
    /// Memory is returned exactly as reported; use
    /// [`InstanceInfo::memory_label`] to render it in write-side units.
    ///
    /// # Errors
    ///
    /// Returns the transport or API error of the request (an unknown
    /// instance surfaces as the API's own error), or [`RapiError::Decode`]
    /// when the body is not a valid instance.
    pub async fn read_instance(&self, name: &str) -> Result<InstanceInfo, RapiError> {
        let path = resource_path("instances", "instance name", name)?;
        let body = self.get(&path).await?;
        serde_json::from_slice(&body).map_err(|source| RapiError::Decode {
            context: format!("instance {name}"),
            source,
        })
    }

    /// Submits an instance for creation and waits for the backing job.
    ///
    /// On success the submitted specification is handed back unchanged;
    /// server-assigned fields have to be read separately.
    ///
    /// # Errors
    ///
    /// Returns [`RapiError::Validation`] for an incomplete specification,
    /// [`RapiError::JobFailed`] when the job ends in `error`, or any error
    /// raised while submitting or polling.
    pub async fn create_instance(&self, spec: InstanceSpec) -> Result<InstanceSpec, RapiError> {
        spec.validate()?;
        let body = self.post_json("instances", &spec).await?;
        let job_id = Self::job_id(&body, Operation::CreateInstance)?;
        info!(instance = %spec.name, job = %job_id, "instance creation submitted");
        self.wait_for_job(&job_id, Operation::CreateInstance).await?;
        Ok(spec)
    }

    /// Removes an instance and waits for the backing job.
    ///
    /// # Errors
    ///
    /// Returns [`RapiError::JobFailed`] when the job ends in `error`, or any
    /// error raised while submitting or polling.
    pub async fn delete_instance(&self, name: &str) -> Result<(), RapiError> {
        let path = resource_path("instances", "instance name", name)?;
        let body = self.delete(&path).await?;
        let job_id = Self::job_id(&body, Operation::DeleteInstance)?;
        info!(instance = name, job = %job_id, "instance removal submitted");
        self.wait_for_job(&job_id, Operation::DeleteInstance).await
    }

    fn job_id(body: &[u8], operation: Operation) -> Result<JobId, RapiError> {
        let job_id = JobId::from_response_body(body)
            .map_err(|source| RapiError::InvalidJobId { operation, source })?;
        if job_id.as_str().trim().is_empty() {
            return Err(RapiError::MissingJobId { operation });
        }
        Ok(job_id)
    }
}
