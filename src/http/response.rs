//! HTTP response building module
//!
//! Builders for every status the relay answers with. Bodies are JSON except
//! for the preflight (empty) and health probes (plain text).

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderMap, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const MSG_MISSING_FIELDS: &str = "Missing required fields";
pub const MSG_SEND_FAILED: &str = "Email sending failed";
pub const MSG_NOT_FOUND: &str = "Not Found";
pub const MSG_PAYLOAD_TOO_LARGE: &str = "Payload Too Large";

const ALLOW_METHODS: &str = "POST, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type";

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Serialize)]
struct SuccessBody {
    success: bool,
}

/// Grant cross-origin access to exactly one origin
pub fn apply_cors(headers: &mut HeaderMap, allowed_origin: &str) {
    match HeaderValue::from_str(allowed_origin) {
        Ok(origin) => {
            headers.insert("Access-Control-Allow-Origin", origin);
        }
        Err(e) => log_header_error("Access-Control-Allow-Origin", &e),
    }
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_string(body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return bare_response(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            bare_response(status)
        })
}

fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &ErrorBody { error: message })
}

/// Build 200 preflight response with an empty body
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    bare_response(StatusCode::OK)
}

/// Build 200 `{"success":true}` response
pub fn build_success_response() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &SuccessBody { success: true })
}

/// Build 400 response for a submission lacking required fields
pub fn build_400_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::BAD_REQUEST, MSG_MISSING_FIELDS)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, MSG_NOT_FOUND)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = error_response(StatusCode::METHOD_NOT_ALLOWED, MSG_METHOD_NOT_ALLOWED);
    resp.headers_mut()
        .insert("Allow", HeaderValue::from_static(ALLOW_METHODS));
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::PAYLOAD_TOO_LARGE, MSG_PAYLOAD_TOO_LARGE)
}

/// Build the uniform 500 response; never carries failure detail
pub fn build_500_response() -> Response<Full<Bytes>> {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_SEND_FAILED)
}

/// Build health check response
pub fn build_health_response(status: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .body(Full::new(Bytes::from_static(status.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::OK, &e);
            bare_response(StatusCode::OK)
        })
}

fn bare_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

fn log_header_error(name: &str, error: &hyper::header::InvalidHeaderValue) {
    crate::logger::log_error(&format!("Invalid value for {name}: {error}"));
}
