//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn internal_error() -> Error {
    Error::internal("disk on fire")
        .with_trace_id(TRACE_ID)
        .with_details(json!({"path": "/var/lib/secret"}))
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::validation_failed(vec!["Title is required".to_owned()]), StatusCode::BAD_REQUEST)]
#[case(Error::conflict("Email already registered"), StatusCode::BAD_REQUEST)]
#[case(Error::unsupported_media_type("gif"), StatusCode::BAD_REQUEST)]
#[case(Error::payload_too_large("huge"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no token"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("owners only"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

async fn body_of(error: &Error) -> (StatusCode, Option<String>, Value) {
    let response = ResponseError::error_response(error);
    let status = response.status();
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let body = serde_json::from_slice(&bytes).expect("error body is JSON");
    (status, header, body)
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_the_trace_id(internal_error: Error) {
    let (status, header, body) = body_of(&internal_error).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(header.as_deref(), Some(TRACE_ID));
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["code"], "internal_error");
    assert_eq!(body["traceId"], TRACE_ID);
    assert!(body.get("details").is_none());
}

#[rstest]
#[actix_web::test]
async fn validation_errors_list_every_violation() {
    let error = Error::validation_failed(vec![
        "Title is required".to_owned(),
        "End date must be after start date".to_owned(),
    ]);

    let (status, header, body) = body_of(&error).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(header.is_none());
    assert_eq!(
        body["message"],
        "Validation failed: Title is required, End date must be after start date"
    );
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(
        body["details"]["errors"],
        json!(["Title is required", "End date must be after start date"])
    );
}

#[rstest]
#[actix_web::test]
async fn framework_errors_become_redacted_internal_errors() {
    let framework = actix_web::error::ErrorBadGateway("upstream detail");
    let error = Error::from(framework);

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.message(), "Internal server error");
}
