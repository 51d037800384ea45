use wirehttp::http::response::{Response, ResponseBuilder, StatusCode, default_headers};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::OK.as_u16(), 200);
    assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), 500);
    assert_eq!(StatusCode::from(418).as_u16(), 418);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::OK.reason_phrase(), Some("OK"));
    assert_eq!(StatusCode::BAD_REQUEST.reason_phrase(), Some("Bad Request"));
    assert_eq!(
        StatusCode::INTERNAL_SERVER_ERROR.reason_phrase(),
        Some("Internal Server Error")
    );
    assert_eq!(StatusCode(299).reason_phrase(), None);
}

#[test]
fn test_status_line_table() {
    assert_eq!(StatusCode::OK.status_line(), Some("HTTP/1.1 200 OK\r\n"));
    assert_eq!(
        StatusCode::BAD_REQUEST.status_line(),
        Some("HTTP/1.1 400 Bad Request\r\n")
    );
    assert_eq!(
        StatusCode::INTERNAL_SERVER_ERROR.status_line(),
        Some("HTTP/1.1 500 Internal Server Error\r\n")
    );
    assert_eq!(StatusCode(999).status_line(), None);
}

#[test]
fn test_default_headers() {
    let headers = default_headers(42);

    assert_eq!(headers.len(), 3);
    assert_eq!(headers.get("Content-Length"), Some("42"));
    assert_eq!(headers.get("Connection"), Some("close"));
    assert_eq!(headers.get("Content-Type"), Some("text/plain"));
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::OK).body(body.clone()).build();

    let content_length = response.headers.get("Content-Length").unwrap();
    assert_eq!(content_length, body.len().to_string());
}

#[test]
fn test_response_builder_overrides_defaults() {
    let response = ResponseBuilder::new(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("X-Custom", "value")
        .body(b"{}".to_vec())
        .build();

    assert_eq!(response.headers.len(), 4);
    assert_eq!(
        response.headers.get("content-type"),
        Some("application/json")
    );
    assert_eq!(response.headers.get("x-custom"), Some("value"));
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::OK)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.headers.get("Content-Length"), Some("999"));
}

#[test]
fn test_response_builder_empty_body() {
    let response = ResponseBuilder::new(StatusCode::NO_CONTENT).build();

    assert!(response.body.is_empty());
    assert_eq!(response.headers.get("Content-Length"), Some("0"));
}

#[test]
fn test_response_ok_helper() {
    let response = Response::ok(b"test content".to_vec());

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"test content".to_vec());
    assert_eq!(response.headers.get("Content-Type"), Some("text/plain"));
}

#[test]
fn test_response_html_helper() {
    let response = Response::html(StatusCode::BAD_REQUEST, "<p>no</p>");

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.headers.get("Content-Type"), Some("text/html"));
    assert_eq!(response.headers.get("Content-Length"), Some("9"));
}

#[test]
fn test_response_error_helper() {
    let response = Response::error(StatusCode::INTERNAL_SERVER_ERROR, "boom");

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body, b"boom".to_vec());
}
