//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: health probes, path and method
//! dispatch, body size precheck, CORS headers and access logging.

use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, CONTENT_LENGTH, ORIGIN, SERVER, USER_AGENT};
use hyper::{Method, Request, Response};

use crate::config::AppState;
use crate::handler::relay;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
///
/// Every response leaving here carries the CORS headers, whatever path or
/// status produced it.
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body + Send + 'static,
    B::Data: Into<Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
{
    let started = Instant::now();
    let logging = &state.config.logging;
    let mut entry = logging
        .access_log
        .then(|| access_entry(&req, peer_addr));

    let mut response = route_request(req, &state).await;

    http::apply_cors(response.headers_mut(), &state.config.http.allowed_origin);
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().lower()).unwrap_or(0);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.origin = header(ORIGIN);
    entry.user_agent = header(USER_AGENT);
    entry
}

/// Route request based on path, then dispatch on method
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body + Send + 'static,
    B::Data: Into<Bytes> + Send + 'static,
    B::Error: Into<Box<dyn StdError + Send + Sync>> + Send + 'static,
{
    let health = &state.config.health;
    let path = req.uri().path();

    // Health check endpoints (highest priority, always fast)
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return http::build_health_response("ok");
    }

    if path != state.config.http.route_path {
        return http::build_404_response();
    }

    let method = req.method().clone();
    match method {
        Method::OPTIONS => http::build_preflight_response(),
        Method::POST => {
            if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
                return resp;
            }
            relay::handle_submission(req, state).await
        }
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::contact::ingest::tests::{content_type, multipart_body, Part};
    use crate::error::MailError;
    use crate::mail::{EmailSender, OutboundEmail, SendReceipt};
    use async_trait::async_trait;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use std::sync::Mutex;

    /// Records every email it is asked to send; optionally fails each one
    #[derive(Default)]
    struct FakeMailer {
        sent: Mutex<Vec<OutboundEmail>>,
        fail: bool,
    }

    impl FakeMailer {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn sent(&self) -> Vec<OutboundEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for FakeMailer {
        async fn send(&self, email: &OutboundEmail) -> Result<SendReceipt, MailError> {
            self.sent.lock().unwrap().push(email.clone());
            if self.fail {
                return Err(MailError::Rejected {
                    status: 401,
                    body: r#"{"message":"API key is invalid"}"#.to_string(),
                });
            }
            Ok(SendReceipt {
                id: Some("fake-receipt".to_string()),
            })
        }
    }

    fn state_with(mailer: Arc<FakeMailer>) -> Arc<AppState> {
        Arc::new(AppState::new(test_config(), mailer))
    }

    fn peer() -> SocketAddr {
        "203.0.113.7:51234".parse().unwrap()
    }

    fn request(method: Method, path: &str, body: Vec<u8>) -> Request<Full<Bytes>> {
        Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type())
            .body(Full::new(Bytes::from(body)))
            .unwrap()
    }

    async fn call(
        state: &Arc<AppState>,
        req: Request<Full<Bytes>>,
    ) -> (StatusCode, hyper::HeaderMap, String) {
        let resp = handle_request(req, peer(), Arc::clone(state)).await.unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn assert_cors(headers: &hyper::HeaderMap) {
        assert_eq!(headers["Access-Control-Allow-Origin"], "https://cinedot.in");
        assert_eq!(headers["Access-Control-Allow-Methods"], "POST, OPTIONS");
        assert_eq!(headers["Access-Control-Allow-Headers"], "Content-Type");
    }

    fn jane(message: &str) -> Vec<u8> {
        multipart_body(&[
            Part::Text("name", "Jane"),
            Part::Text("email", "jane@x.com"),
            Part::Text("message", message),
        ])
    }

    #[tokio::test]
    async fn test_options_preflight() {
        let mailer = Arc::new(FakeMailer::default());
        let state = state_with(Arc::clone(&mailer));

        let (status, headers, body) =
            call(&state, request(Method::OPTIONS, "/api/send", Vec::new())).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_cors(&headers);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let mailer = Arc::new(FakeMailer::default());
        let state = state_with(Arc::clone(&mailer));

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::HEAD] {
            let (status, headers, body) =
                call(&state, request(method.clone(), "/api/send", jane("Hi"))).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(body, r#"{"error":"Method Not Allowed"}"#);
            assert_cors(&headers);
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_required_fields() {
        let mailer = Arc::new(FakeMailer::default());
        let state = state_with(Arc::clone(&mailer));

        let cases: [&[Part<'_>]; 4] = [
            &[Part::Text("email", "jane@x.com"), Part::Text("message", "Hi")],
            &[Part::Text("name", "Jane"), Part::Text("message", "Hi")],
            &[Part::Text("name", "Jane"), Part::Text("email", "jane@x.com")],
            &[Part::Text("phone", "555-0100")],
        ];
        for parts in cases {
            let (status, headers, body) =
                call(&state, request(Method::POST, "/api/send", multipart_body(parts))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body, r#"{"error":"Missing required fields"}"#);
            assert_cors(&headers);
        }
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_successful_relay() {
        let mailer = Arc::new(FakeMailer::default());
        let state = state_with(Arc::clone(&mailer));

        let (status, headers, body) =
            call(&state, request(Method::POST, "/api/send", jane("Hello\nWorld"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"success":true}"#);
        assert_cors(&headers);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        let email = &sent[0];
        assert_eq!(email.reply_to, "jane@x.com");
        assert_eq!(email.to, vec!["info@cinedot.in".to_string()]);
        assert_eq!(email.from, "Cinedot Contact <onboarding@resend.dev>");
        assert!(email.html.contains("Hello<br/>World"));
        assert!(email.html.contains("<br/>N/A</p>"));
        assert!(email.attachments.is_empty());
    }

    #[tokio::test]
    async fn test_attachments_relayed() {
        let mailer = Arc::new(FakeMailer::default());
        let state = state_with(Arc::clone(&mailer));
        let pdf: Vec<u8> = b"%PDF-1.7\n\x00\x01\x02binary".to_vec();

        let body = multipart_body(&[
            Part::Text("name", "Jane"),
            Part::Text("email", "jane@x.com"),
            Part::Text("phone", "555-0100"),
            Part::Text("message", "See attached"),
            Part::File("files", "brief.pdf", &pdf),
            Part::File("files", "", b""),
        ]);
        let (status, _, _) = call(&state, request(Method::POST, "/api/send", body)).await;
        assert_eq!(status, StatusCode::OK);

        let email = mailer.sent().remove(0);
        assert!(email.html.contains("<br/>555-0100</p>"));
        assert_eq!(email.attachments.len(), 1);

        let wire = serde_json::to_value(&email).unwrap();
        assert_eq!(wire["attachments"][0]["filename"], "brief.pdf");
        let content = wire["attachments"][0]["content"].as_str().unwrap();
        assert_eq!(STANDARD.decode(content).unwrap(), pdf);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_generic_500() {
        let mailer = Arc::new(FakeMailer::failing());
        let state = state_with(Arc::clone(&mailer));

        let (status, headers, body) =
            call(&state, request(Method::POST, "/api/send", jane("Hi"))).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"Email sending failed"}"#);
        assert!(!body.contains("API key"));
        assert_cors(&headers);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_generic_500() {
        let mailer = Arc::new(FakeMailer::default());
        let state = state_with(Arc::clone(&mailer));

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/send")
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from_static(b"name=Jane")))
            .unwrap();
        let (status, _, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"Email sending failed"}"#);

        let mut truncated = jane("Hi");
        truncated.truncate(truncated.len() / 2);
        let (status, _, _) =
            call(&state, request(Method::POST, "/api/send", truncated)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_content_length() {
        let mailer = Arc::new(FakeMailer::default());
        let state = state_with(Arc::clone(&mailer));

        let mut req = request(Method::POST, "/api/send", jane("Hi"));
        req.headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from_static("999999999"));
        let (status, headers, body) = call(&state, req).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, r#"{"error":"Payload Too Large"}"#);
        assert_cors(&headers);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit_is_generic_500() {
        let mailer = Arc::new(FakeMailer::default());
        let mut config = test_config();
        config.http.max_body_size = 1024;
        let state = Arc::new(AppState::new(config, Arc::clone(&mailer) as Arc<dyn EmailSender>));

        let big = vec![b'x'; 4096];
        let body = multipart_body(&[
            Part::Text("name", "Jane"),
            Part::Text("email", "jane@x.com"),
            Part::Text("message", "Hi"),
            Part::File("upload", "big.bin", &big),
        ]);
        let req = request(Method::POST, "/api/send", body);
        assert!(req.headers().get(CONTENT_LENGTH).is_none());

        let (status, headers, body) = call(&state, req).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, r#"{"error":"Email sending failed"}"#);
        assert_cors(&headers);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_path_and_health() {
        let state = state_with(Arc::new(FakeMailer::default()));

        let (status, headers, body) =
            call(&state, request(Method::POST, "/elsewhere", jane("Hi"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, r#"{"error":"Not Found"}"#);
        assert_cors(&headers);

        let (status, _, body) = call(&state, request(Method::GET, "/healthz", Vec::new())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
