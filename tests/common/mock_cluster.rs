//! Shared helpers for tests that talk to a mocked remote API.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared helpers under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/mock_cluster.rs"]
//! mod mock_cluster;
//! ```

use std::time::Duration;

use ganeti_rapi::{ClientSettings, InstanceSpec, RapiClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `Authorization` header expected for `admin:hunter2`.
pub const AUTH_HEADER: &str = "Basic YWRtaW46aHVudGVyMg==";

/// API version segment used by the mock cluster.
pub const API_PREFIX: &str = "/2";

/// Builds a client against the mock server with a near-zero poll interval.
pub fn client_for(server: &MockServer) -> RapiClient {
    RapiClient::new(ClientSettings {
        base_url: format!("{}{API_PREFIX}", server.uri()),
        username: String::from("admin"),
        password: String::from("hunter2"),
        verify_tls: false,
    })
    .unwrap_or_else(|err| panic!("client: {err}"))
    .with_poll_interval(Duration::from_millis(1))
}

/// A valid creation request.
pub fn web_spec() -> InstanceSpec {
    InstanceSpec::builder()
        .name("web-01")
        .memory("2G")
        .vcpus(2)
        .disk("20G")
        .nic("br0")
        .os_type(Some(String::from("debootstrap+default")))
        .build()
        .unwrap_or_else(|err| panic!("spec: {err}"))
}

/// Response carrying a job status body.
pub fn job_status(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "id": 42, "status": status }))
}

/// Queues job status answers for job `42`, served in order; the last one
/// answers exactly once.
pub async fn mount_job_statuses(server: &MockServer, statuses: &[&str]) {
    for status in statuses {
        Mock::given(method("GET"))
            .and(path(format!("{API_PREFIX}/jobs/42")))
            .respond_with(job_status(status))
            .up_to_n_times(1)
            .expect(1)
            .mount(server)
            .await;
    }
}

/// Counts requests the server received for the given path.
pub async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}
