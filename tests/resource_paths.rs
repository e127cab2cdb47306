//! Instance names are sent as a single escaped path segment.

#[path = "common/mock_cluster.rs"]
mod mock_cluster;

use ganeti_rapi::RapiError;
use rstest::rstest;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mock_cluster::{API_PREFIX, client_for, requests_to};

#[tokio::test]
async fn delete_cannot_escape_the_instances_collection() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API_PREFIX}/jobs/7")))
        .respond_with(ResponseTemplate::new(200).set_body_string("7\n"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API_PREFIX}/instances/..%2Fjobs%2F7")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "message": "Not Found",
            "explain": "Instance '../jobs/7' not known"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .delete_instance("../jobs/7")
        .await
        .expect_err("unknown instance must fail");

    assert!(matches!(err, RapiError::Api { code: 404, .. }), "unexpected: {err:?}");
    assert_eq!(requests_to(&server, "/2/jobs/7").await, 0);
}

#[tokio::test]
async fn read_escapes_reserved_characters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/instances/web%3Fbulk%3D1")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": 404,
            "message": "Not Found",
            "explain": "Instance 'web?bulk=1' not known"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .read_instance("web?bulk=1")
        .await
        .expect_err("unknown instance must fail");

    assert!(matches!(err, RapiError::Api { code: 404, .. }), "unexpected: {err:?}");
}

#[rstest]
#[case::empty("")]
#[case::dot(".")]
#[case::dot_dot("..")]
#[tokio::test]
async fn dot_segment_names_are_rejected_before_any_request(#[case] name: &str) {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let read = client.read_instance(name).await;
    assert!(
        matches!(read, Err(RapiError::InvalidIdentifier { kind: "instance name", .. })),
        "unexpected: {read:?}"
    );
    let delete = client.delete_instance(name).await;
    assert!(
        matches!(delete, Err(RapiError::InvalidIdentifier { kind: "instance name", .. })),
        "unexpected: {delete:?}"
    );
    assert_eq!(
        server.received_requests().await.unwrap_or_default().len(),
        0
    );
}
