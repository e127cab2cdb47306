//! Error types for the remote API client.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::ConfigError;

use super::job::{JobId, Operation};

/// Errors raised by the remote API client.
///
/// Every failure reaches the caller of the top-level operation unchanged;
/// nothing is retried or swallowed along the way.
#[derive(Debug, Error)]
pub enum RapiError {
    /// Raised when the client configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when an instance specification is missing a required field.
    #[error("invalid instance specification: {0}")]
    Validation(String),
    /// Connection, TLS, or timeout failure while talking to the API.
    #[error("request {context} failed: {source}")]
    Transport {
        /// Method and path of the failed request.
        context: String,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with a non-200 status and a structured error body.
    #[error("remote API returned {status}: [{code}] {message} - {explain}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Error code reported in the body.
        code: i64,
        /// Short error message.
        message: String,
        /// Longer explanation of the failure.
        explain: String,
    },
    /// A response body could not be decoded into the expected shape.
    #[error("failed to decode {context}: {source}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A request body could not be encoded as JSON.
    #[error("failed to encode {context}: {source}")]
    Encode {
        /// What was being encoded.
        context: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A mutating request returned a job identifier that is not UTF-8.
    #[error("remote API returned a job id for {operation} that is not UTF-8: {source}")]
    InvalidJobId {
        /// Operation that was submitted.
        operation: Operation,
        /// Underlying decoding error.
        #[source]
        source: std::str::Utf8Error,
    },
    /// An instance name or job id cannot be used as a single path segment.
    #[error("{kind} '{value}' cannot be used as a resource path segment")]
    InvalidIdentifier {
        /// What the identifier names, for example `instance name`.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A mutating request succeeded but returned no job identifier.
    #[error("remote API returned an empty job id for {operation}")]
    MissingJobId {
        /// Operation that was submitted.
        operation: Operation,
    },
    /// The job backing a mutation finished in the `error` state.
    #[error("job {job_id} failed to {operation}")]
    JobFailed {
        /// Identifier of the failed job.
        job_id: JobId,
        /// Operation the job was carrying out.
        operation: Operation,
    },
    /// The job did not finish within the caller's opt-in deadline.
    #[error("job {job_id} did not finish {operation} within {waited:?}")]
    JobTimeout {
        /// Identifier of the unfinished job.
        job_id: JobId,
        /// Operation the job was carrying out.
        operation: Operation,
        /// Time spent polling before giving up.
        waited: Duration,
    },
}

impl From<ConfigError> for RapiError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
