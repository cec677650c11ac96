//! Regression coverage for the error-to-HTTP mapping.

use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::rstest;

use crate::domain::{Error, ErrorCode};

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("no"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::invalid_state("too late"), StatusCode::BAD_REQUEST)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn maps_codes_to_statuses(#[case] error: Error, #[case] expected: StatusCode) {
    assert_eq!(error.status_code(), expected);
}

#[rstest]
#[tokio::test]
async fn internal_errors_are_redacted() {
    let response = Error::internal("secret connection string").error_response();
    let body = to_bytes(response.into_body()).await.expect("body bytes");
    let decoded: Error = serde_json::from_slice(&body).expect("error payload");

    assert_eq!(decoded.code(), ErrorCode::InternalError);
    assert_eq!(decoded.message(), "Internal server error");
}

#[rstest]
#[tokio::test]
async fn client_errors_keep_their_message() {
    let response = Error::conflict("book 42 is not available for exchange").error_response();
    let body = to_bytes(response.into_body()).await.expect("body bytes");
    let decoded: Error = serde_json::from_slice(&body).expect("error payload");

    assert_eq!(decoded.code(), ErrorCode::Conflict);
    assert_eq!(decoded.message(), "book 42 is not available for exchange");
}

#[rstest]
#[tokio::test]
async fn trace_id_is_echoed_as_a_header() {
    let error = Error::not_found("missing").with_trace_id("0f8a6e2e-1111-2222-3333-444455556666");
    let response = error.error_response();

    let header = response
        .headers()
        .get("Trace-Id")
        .expect("trace header present");
    assert_eq!(header, "0f8a6e2e-1111-2222-3333-444455556666");
}
