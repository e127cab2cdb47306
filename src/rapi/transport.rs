//! Authenticated request execution and uniform response decoding.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RapiClient, RapiError};

/// Structured body the API sends alongside a failing status.
#[derive(Deserialize)]
struct ApiErrorBody {
    code: i64,
    message: String,
    #[serde(default)]
    explain: Option<String>,
}

/// Builds `collection/id` with `id` percent-encoded as one path segment.
///
/// Dot segments are rejected outright since URL normalisation would
/// otherwise resolve them against the collection.
pub(crate) fn resource_path(
    collection: &str,
    kind: &'static str,
    id: &str,
) -> Result<String, RapiError> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(RapiError::InvalidIdentifier {
            kind,
            value: id.to_owned(),
        });
    }
    Ok(format!("{collection}/{}", urlencoding::encode(id)))
}

impl RapiClient {
    /// Joins a resource path onto the versioned base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .basic_auth(&self.settings.username, Some(&self.settings.password))
            .header(CONTENT_TYPE, "application/json")
    }

    pub(super) async fn get(&self, path: &str) -> Result<Vec<u8>, RapiError> {
        self.execute(Method::GET, path, None).await
    }

    pub(super) async fn delete(&self, path: &str) -> Result<Vec<u8>, RapiError> {
        self.execute(Method::DELETE, path, None).await
    }

    pub(super) async fn post_json<B>(&self, path: &str, body: &B) -> Result<Vec<u8>, RapiError>
    where
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body).map_err(|source| RapiError::Encode {
            context: format!("POST {path} body"),
            source,
        })?;
        self.execute(Method::POST, path, Some(payload)).await
    }

    /// Sends one request and returns the raw body of a `200 OK` response.
    ///
    /// Any other status is decoded as the API's structured error body; a
    /// body that does not match that shape yields [`RapiError::Decode`].
    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, RapiError> {
        let context = format!("{method} {path}");
        debug!(request = %context, "sending remote API request");

        let mut request = self.request(method, path);
        if let Some(bytes) = payload {
            request = request.body(bytes);
        }

        let response = request
            .send()
            .await
            .map_err(|source| RapiError::Transport {
                context: context.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| RapiError::Transport {
                context: context.clone(),
                source,
            })?;

        if status == StatusCode::OK {
            return Ok(body.to_vec());
        }

        debug!(request = %context, %status, "remote API rejected request");
        let error: ApiErrorBody =
            serde_json::from_slice(&body).map_err(|source| RapiError::Decode {
                context: format!("error response ({status}) to {context}"),
                source,
            })?;

        Err(RapiError::Api {
            status,
            code: error.code,
            message: error.message,
            explain: error.explain.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("web-1", "instances/web-1")]
    #[case::fqdn("web.example.com", "instances/web.example.com")]
    #[case::slash("../jobs/7", "instances/..%2Fjobs%2F7")]
    #[case::query("web?dry-run=1", "instances/web%3Fdry-run%3D1")]
    #[case::space("web 1", "instances/web%201")]
    fn resource_path_keeps_id_in_one_segment(#[case] id: &str, #[case] expected: &str) {
        let path = resource_path("instances", "instance name", id)
            .unwrap_or_else(|err| panic!("path for {id}: {err}"));
        assert_eq!(path, expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::dot(".")]
    #[case::dot_dot("..")]
    fn resource_path_rejects_dot_segments(#[case] id: &str) {
        let err = resource_path("instances", "instance name", id)
            .expect_err("dot segment must be rejected");
        assert!(
            matches!(
                err,
                RapiError::InvalidIdentifier { kind: "instance name", ref value } if value == id
            ),
            "unexpected error: {err:?}"
        );
    }
}
