// HTTP connector and site processor against a mocked SharePoint REST endpoint.

mod helpers;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

use helpers::{policy, site, test_session};
use library_versioning::error_handling::ErrorType;
use library_versioning::{
    ActivityLog, HttpSiteConnector, Method, ProcessingStats, SiteConnector, SiteProcessor,
    VersioningSiteProcessor,
};

const TOKEN: &str = "token-123";

fn connector(retries: usize) -> Arc<HttpSiteConnector> {
    Arc::new(HttpSiteConnector::new(Arc::new(reqwest::Client::new())).with_retry_attempts(retries))
}

fn processor(connector: Arc<HttpSiteConnector>) -> (VersioningSiteProcessor, Arc<ProcessingStats>) {
    let stats = Arc::new(ProcessingStats::new());
    (
        VersioningSiteProcessor::new(connector, Arc::new(ActivityLog::default()), stats.clone()),
        stats,
    )
}

async fn mount_discovery(server: &MockServer, libraries: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/sites/a/_api/web"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Title": "Team A", "Url": "https://contoso"})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/a/_api/web/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(libraries))
        .mount(server)
        .await;
}

fn library_patch(id: &str) -> MockBuilder {
    Mock::given(method("PATCH")).and(path_regex(format!(
        r"^/sites/a/_api/web/lists\(guid('|%27){id}('|%27)\)$"
    )))
}

#[tokio::test]
async fn test_all_libraries_configured() {
    let server = MockServer::start().await;
    mount_discovery(
        &server,
        json!({"value": [{"Id": "lib-1", "Title": "Documents"}, {"Id": "lib-2", "Title": "Archive"}]}),
    )
    .await;
    for id in ["lib-1", "lib-2"] {
        library_patch(id)
            .and(header("if-match", "*"))
            .and(header("accept", "application/json;odata=nometadata"))
            .and(body_json(json!({
                "enableVersioning": true,
                "majorVersionLimit": 50,
                "majorWithMinorVersionsLimit": 5,
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
    }

    let (processor, stats) = processor(connector(0));
    let target = site(&format!("{}/sites/a", server.uri()));
    let result = processor
        .process_site(&target, &test_session(TOKEN), &policy())
        .await;

    assert!(result.succeeded());
    assert_eq!(result.libraries_configured(), 2);
    assert_eq!(result.libraries_failed(), 0);
    assert_eq!(result.libraries_total(), 2);
    assert_eq!(result.error(), None);
    assert_eq!(stats.total_errors(), 0);
}

#[tokio::test]
async fn test_rejected_library_is_counted_as_failed() {
    let server = MockServer::start().await;
    mount_discovery(
        &server,
        json!({"value": [{"Id": "lib-1", "Title": "Documents"}, {"Id": "lib-2", "Title": "Locked"}]}),
    )
    .await;
    library_patch("lib-1")
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    library_patch("lib-2")
        .respond_with(ResponseTemplate::new(403).set_body_json(
            json!({"odata.error": {"message": {"value": "Access denied."}}}),
        ))
        .mount(&server)
        .await;

    let (processor, stats) = processor(connector(0));
    let target = site(&format!("{}/sites/a", server.uri()));
    let result = processor
        .process_site(&target, &test_session(TOKEN), &policy())
        .await;

    assert!(result.succeeded());
    assert_eq!(result.libraries_configured(), 1);
    assert_eq!(result.libraries_failed(), 1);
    assert_eq!(stats.get_error_count(ErrorType::LibraryUpdateFailed), 1);
}

#[tokio::test]
async fn test_every_library_rejected_marks_site_failed() {
    let server = MockServer::start().await;
    mount_discovery(&server, json!({"value": [{"Id": "lib-1", "Title": "Documents"}]})).await;
    library_patch("lib-1")
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let (processor, stats) = processor(connector(0));
    let target = site(&format!("{}/sites/a", server.uri()));
    let result = processor
        .process_site(&target, &test_session(TOKEN), &policy())
        .await;

    assert!(!result.succeeded());
    assert_eq!(result.libraries_total(), 1);
    assert_eq!(result.error(), Some("no libraries processed"));
    assert_eq!(stats.get_error_count(ErrorType::NoLibraries), 1);
}

#[tokio::test]
async fn test_site_without_libraries_is_not_successful() {
    let server = MockServer::start().await;
    mount_discovery(&server, json!({"value": []})).await;

    let (processor, _stats) = processor(connector(0));
    let target = site(&format!("{}/sites/a", server.uri()));
    let result = processor
        .process_site(&target, &test_session(TOKEN), &policy())
        .await;

    assert!(!result.succeeded());
    assert_eq!(result.libraries_total(), 0);
    assert_eq!(result.error(), Some("no libraries processed"));
}

#[tokio::test]
async fn test_missing_site_is_recorded_without_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a/_api/web"))
        .respond_with(ResponseTemplate::new(404).set_body_json(
            json!({"error": {"message": {"value": "File Not Found."}}}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let (processor, stats) = processor(connector(0));
    let target = site(&format!("{}/sites/a", server.uri()));
    let result = processor
        .process_site(&target, &test_session(TOKEN), &policy())
        .await;

    assert!(!result.succeeded());
    assert_eq!(result.libraries_total(), 0);
    assert_eq!(
        result.error(),
        Some("site not found (HTTP 404): File Not Found.")
    );
    assert_eq!(stats.get_error_count(ErrorType::SiteNotFound), 1);
}

#[tokio::test]
async fn test_unparseable_listing_is_malformed_response() {
    let server = MockServer::start().await;
    mount_discovery(&server, json!({"unexpected": true})).await;

    let (processor, stats) = processor(connector(0));
    let target = site(&format!("{}/sites/a", server.uri()));
    let result = processor
        .process_site(&target, &test_session(TOKEN), &policy())
        .await;

    assert!(!result.succeeded());
    assert!(result
        .error()
        .is_some_and(|e| e.starts_with("malformed response")));
    assert_eq!(stats.get_error_count(ErrorType::MalformedResponse), 1);
}

#[tokio::test]
async fn test_unreachable_host_is_site_unreachable() {
    // Nothing listens on port 1.
    let (processor, stats) = processor(connector(0));
    let target = site("http://127.0.0.1:1/sites/a");
    let result = processor
        .process_site(&target, &test_session(TOKEN), &policy())
        .await;

    assert!(!result.succeeded());
    assert!(result
        .error()
        .is_some_and(|e| e.starts_with("site unreachable")));
    assert_eq!(stats.get_error_count(ErrorType::SiteUnreachable), 1);
}

#[tokio::test]
async fn test_get_is_retried_after_throttling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sites/a/_api/web"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sites/a/_api/web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Title": "Team A"})))
        .expect(1)
        .mount(&server)
        .await;

    let target = site(&format!("{}/sites/a", server.uri()));
    let response = connector(1)
        .call(&target, TOKEN, "_api/web", Method::Get, None)
        .await
        .expect("transport ok");

    assert!(response.status_ok);
    assert_eq!(response.body, Some(json!({"Title": "Team A"})));
}

#[tokio::test]
async fn test_transient_status_is_returned_when_retries_are_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let target = site(&format!("{}/sites/a", server.uri()));
    let response = connector(0)
        .call(&target, TOKEN, "_api/web", Method::Get, None)
        .await
        .expect("transport ok");

    assert!(!response.status_ok);
    assert_eq!(response.status_code, 503);
    assert_eq!(response.body, None);
}

#[tokio::test]
async fn test_patch_is_sent_once_even_on_server_error() {
    let server = MockServer::start().await;
    library_patch("lib-1")
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let target = site(&format!("{}/sites/a", server.uri()));
    let response = connector(3)
        .call(
            &target,
            TOKEN,
            "_api/web/lists(guid'lib-1')",
            Method::Patch,
            Some(&json!({"enableVersioning": true})),
        )
        .await
        .expect("transport ok");

    assert!(!response.status_ok);
    assert_eq!(response.status_code, 500);
}
