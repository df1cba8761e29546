/*!
 * Integration tests for the HTTP lookup client against a local canned server
 */

use std::time::Duration;

use platecheck::errors::LookupError;
use platecheck::lookup::{LookupClient, ViolationLookup};
use platecheck::vehicle_utils::VehicleType;

use crate::common;
use crate::common::canned_server::{CannedResponse, CannedServer, refused_base_url};

const VIOLATIONS_BODY: &str = r#"{
    "licensePlate": "30A12345",
    "violations": [{
        "violationTime": "08:30, 15/01/2024",
        "violationLocation": "Le Loi, District 1",
        "violationBehavior": "Running a red light",
        "detectionUnit": "Traffic police team 3",
        "resolutionPlaces": [{"name": "Team 3", "address": "12 Le Loi"}],
        "status": "Chưa xử phạt"
    }]
}"#;

fn client_for(base_url: &str) -> LookupClient {
    LookupClient::new(base_url, "/violations/search", "/test")
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
}

#[tokio::test]
async fn test_lookupViolations_withSuccessfulResponse_shouldParseViolations() {
    common::init_test_logging();
    let server = CannedServer::start(CannedResponse::Json(200, VIOLATIONS_BODY.to_string()))
        .await
        .unwrap();

    let result = client_for(&server.base_url())
        .lookup_violations("30a12345", None)
        .await
        .unwrap();

    assert_eq!(result.license_plate, "30A12345");
    assert_eq!(result.violations.len(), 1);
    assert_eq!(result.violations[0].violation_behavior, "Running a red light");
    assert_eq!(result.unpaid_count(), 1);
}

#[tokio::test]
async fn test_lookupViolations_shouldSendPlateAndFilterInQuery() {
    let server = CannedServer::start(CannedResponse::Json(200, r#"{"violations": []}"#.to_string()))
        .await
        .unwrap();
    let client = client_for(&server.base_url());

    client.lookup_violations(" 30a12345 ", None).await.unwrap();
    client
        .lookup_violations("59x123456", Some(VehicleType::Motorcycle))
        .await
        .unwrap();

    let lines = server.request_lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "GET /api/violations/search?licensePlate=30A12345 HTTP/1.1"
    );
    assert_eq!(
        lines[1],
        "GET /api/violations/search?licensePlate=59X123456&vehicleType=motorcycle HTTP/1.1"
    );
}

#[tokio::test]
async fn test_lookupViolations_withEmptyList_shouldReturnCleanResult() {
    let server = CannedServer::start(CannedResponse::Json(
        200,
        r#"{"licensePlate": "51F99999", "violations": []}"#.to_string(),
    ))
    .await
    .unwrap();

    let result = client_for(&server.base_url())
        .lookup_violations("51F99999", None)
        .await
        .unwrap();

    assert!(result.is_clean());
}

#[tokio::test]
async fn test_lookupViolations_withRefusedConnection_shouldReturnUnreachable() {
    let base_url = refused_base_url().await.unwrap();

    let result = client_for(&base_url).lookup_violations("30A12345", None).await;

    assert!(matches!(result, Err(LookupError::Unreachable(_))));
}

#[tokio::test]
async fn test_lookupViolations_withServerError_shouldReturnHttpWithMessage() {
    let server = CannedServer::start(CannedResponse::Json(
        500,
        r#"{"message": "Database unavailable"}"#.to_string(),
    ))
    .await
    .unwrap();

    let result = client_for(&server.base_url())
        .lookup_violations("30A12345", None)
        .await;

    match result {
        Err(LookupError::Http {
            status_code,
            message,
        }) => {
            assert_eq!(status_code, 500);
            assert_eq!(message, "Database unavailable");
        }
        other => panic!("Expected Http error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lookupViolations_withNotFoundText_shouldCarryBodyText() {
    let server = CannedServer::start(CannedResponse::Text(404, "no such route".to_string()))
        .await
        .unwrap();

    let result = client_for(&server.base_url())
        .lookup_violations("30A12345", None)
        .await;

    assert!(matches!(
        result,
        Err(LookupError::Http { status_code: 404, ref message }) if message == "no such route"
    ));
}

#[tokio::test]
async fn test_lookupViolations_withSilentServer_shouldReturnTimeout() {
    let server = CannedServer::start(CannedResponse::Silent).await.unwrap();
    let client = LookupClient::new(server.base_url(), "/violations/search", "/test")
        .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));

    let result = client.lookup_violations("30A12345", None).await;

    assert!(matches!(result, Err(LookupError::Timeout(200))));
}

#[tokio::test]
async fn test_lookupViolations_withNonJsonBody_shouldReturnMalformedResponse() {
    let server = CannedServer::start(CannedResponse::Text(200, "<html>oops</html>".to_string()))
        .await
        .unwrap();

    let result = client_for(&server.base_url())
        .lookup_violations("30A12345", None)
        .await;

    assert!(matches!(result, Err(LookupError::MalformedResponse(_))));
}

#[tokio::test]
async fn test_checkLiveness_withExpectedMessage_shouldReturnTrue() {
    let server = CannedServer::start(CannedResponse::Json(
        200,
        r#"{"message": "API is working"}"#.to_string(),
    ))
    .await
    .unwrap();

    assert!(client_for(&server.base_url()).check_liveness().await);
    assert_eq!(server.request_lines(), vec!["GET /api/test HTTP/1.1".to_string()]);
}

#[tokio::test]
async fn test_checkLiveness_withOtherMessage_shouldReturnFalse() {
    let server = CannedServer::start(CannedResponse::Json(
        200,
        r#"{"message": "Maintenance"}"#.to_string(),
    ))
    .await
    .unwrap();

    assert!(!client_for(&server.base_url()).check_liveness().await);
}

#[tokio::test]
async fn test_checkLiveness_withServerError_shouldReturnFalse() {
    let server = CannedServer::start(CannedResponse::Json(
        503,
        r#"{"message": "API is working"}"#.to_string(),
    ))
    .await
    .unwrap();

    assert!(!client_for(&server.base_url()).check_liveness().await);
}

#[tokio::test]
async fn test_checkLiveness_withRefusedConnection_shouldReturnFalse() {
    let base_url = refused_base_url().await.unwrap();

    assert!(!client_for(&base_url).check_liveness().await);
}
