//! Tests for the guard decisions and the pipeline runner.
//!
//! Guards are pure decisions over the request, so most assertions inspect
//! the returned `Verdict` directly; pipeline tests check the response the
//! runner builds. No running server or database is needed.
//! Run with: `cargo test --test guards_test`

use std::sync::Arc;
use std::time::Duration;

use actix_web::body::to_bytes;
use actix_web::http::header::{self, HeaderName};
use actix_web::http::{Method, StatusCode};
use actix_web::test::TestRequest;
use actix_web::HttpResponse;

use portfolio_backend::guards::rate_limit::RateLimiter;
use portfolio_backend::guards::{run_guards, Guard, Outcome, Verdict};

const GET_POST: &[Method] = &[Method::GET, Method::POST];
const GET_ONLY: &[Method] = &[Method::GET];

fn origins(list: &[&str]) -> Arc<Vec<String>> {
    Arc::new(list.iter().map(|s| s.to_string()).collect())
}

fn header_value<'a>(headers: &'a [(HeaderName, String)], name: &HeaderName) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

async fn body_json(response: HttpResponse) -> serde_json::Value {
    let bytes = to_bytes(response.into_body()).await.expect("body bytes");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[test]
fn method_guard_rejects_with_allow_header() {
    let req = TestRequest::default()
        .method(Method::DELETE)
        .to_http_request();

    match Guard::Method(GET_POST).check(&req) {
        Verdict::Reject {
            status, headers, ..
        } => {
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(header_value(&headers, &header::ALLOW), Some("GET, POST"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn method_guard_passes_allowed_method() {
    let req = TestRequest::default().method(Method::GET).to_http_request();
    assert!(matches!(
        Guard::Method(GET_POST).check(&req),
        Verdict::Pass(_)
    ));
}

#[test]
fn auth_guard_requires_some_credential() {
    let bare = TestRequest::default().to_http_request();
    match Guard::Auth.check(&bare) {
        Verdict::Reject { status, .. } => assert_eq!(status, StatusCode::UNAUTHORIZED),
        other => panic!("expected rejection, got {other:?}"),
    }

    let with_key = TestRequest::default()
        .insert_header(("x-api-key", "anything"))
        .to_http_request();
    assert!(matches!(Guard::Auth.check(&with_key), Verdict::Pass(_)));

    let with_auth = TestRequest::default()
        .insert_header(("authorization", "Bearer whatever"))
        .to_http_request();
    assert!(matches!(Guard::Auth.check(&with_auth), Verdict::Pass(_)));
}

#[test]
fn rate_limiter_enforces_quota_and_resets() {
    let limiter = RateLimiter::new(3, Duration::from_millis(50));

    for _ in 0..3 {
        assert!(limiter.try_acquire("1.2.3.4"));
    }
    assert!(!limiter.try_acquire("1.2.3.4"));

    // Other clients have their own bucket.
    assert!(limiter.try_acquire("5.6.7.8"));

    // After the window elapses the counter resets to 1.
    std::thread::sleep(Duration::from_millis(60));
    assert!(limiter.try_acquire("1.2.3.4"));
}

#[test]
fn rate_limit_guard_buckets_by_forwarded_for() {
    let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)));
    let guard = Guard::RateLimit(limiter);

    let first = TestRequest::default()
        .insert_header(("x-forwarded-for", "10.0.0.1"))
        .to_http_request();
    assert!(matches!(guard.check(&first), Verdict::Pass(_)));

    let second = TestRequest::default()
        .insert_header(("x-forwarded-for", "10.0.0.1"))
        .to_http_request();
    match guard.check(&second) {
        Verdict::Reject { status, code, .. } => {
            assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
            assert_eq!(code, "RATE_LIMIT_EXCEEDED");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    // A different forwarded-for value is a different bucket.
    let other_client = TestRequest::default()
        .insert_header(("x-forwarded-for", "10.0.0.2"))
        .to_http_request();
    assert!(matches!(guard.check(&other_client), Verdict::Pass(_)));
}

#[test]
fn cors_wildcard_echoes_origin() {
    let req = TestRequest::default()
        .insert_header((header::ORIGIN, "https://a.com"))
        .to_http_request();

    match Guard::Cors(origins(&["*"])).check(&req) {
        Verdict::Pass(headers) => {
            assert_eq!(
                header_value(&headers, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
                Some("https://a.com")
            );
            assert_eq!(
                header_value(&headers, &header::ACCESS_CONTROL_ALLOW_METHODS),
                Some("GET, POST, PUT, DELETE, OPTIONS")
            );
        }
        other => panic!("expected pass, got {other:?}"),
    }
}

#[test]
fn cors_rejects_unlisted_origin() {
    let req = TestRequest::default()
        .insert_header((header::ORIGIN, "https://b.com"))
        .to_http_request();

    match Guard::Cors(origins(&["https://a.com"])).check(&req) {
        Verdict::Reject { status, code, .. } => {
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(code, "CORS_ERROR");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[actix_web::test]
async fn cors_preflight_terminates_with_empty_200() {
    let req = TestRequest::default()
        .method(Method::OPTIONS)
        .insert_header((header::ORIGIN, "https://a.com"))
        .to_http_request();

    let guards = [Guard::Cors(origins(&["https://a.com"]))];
    match run_guards(&req, &guards) {
        Outcome::Halt(response) => {
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response
                    .headers()
                    .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                    .and_then(|v| v.to_str().ok()),
                Some("https://a.com")
            );
            let bytes = to_bytes(response.into_body()).await.expect("body bytes");
            assert!(bytes.is_empty());
        }
        Outcome::Proceed(_) => panic!("preflight must not reach the handler"),
    }
}

#[test]
fn content_type_guard_skips_get_and_delete() {
    let get = TestRequest::default().method(Method::GET).to_http_request();
    let delete = TestRequest::default()
        .method(Method::DELETE)
        .to_http_request();
    let guard = Guard::ContentType(&["application/json"]);
    assert!(matches!(guard.check(&get), Verdict::Pass(_)));
    assert!(matches!(guard.check(&delete), Verdict::Pass(_)));
}

#[test]
fn content_type_guard_checks_mutating_methods() {
    let guard = Guard::ContentType(&["application/json"]);

    let missing = TestRequest::default()
        .method(Method::POST)
        .to_http_request();
    match guard.check(&missing) {
        Verdict::Reject { status, code, .. } => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(code, "INVALID_CONTENT_TYPE");
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    // A media type with parameters still contains the allowed type.
    let with_charset = TestRequest::default()
        .method(Method::POST)
        .insert_header((header::CONTENT_TYPE, "application/json; charset=utf-8"))
        .to_http_request();
    assert!(matches!(guard.check(&with_charset), Verdict::Pass(_)));
}

#[test]
fn payload_size_guard_uses_declared_length() {
    let guard = Guard::PayloadSize(1024);

    let small = TestRequest::default()
        .method(Method::POST)
        .insert_header((header::CONTENT_LENGTH, "1024"))
        .to_http_request();
    assert!(matches!(guard.check(&small), Verdict::Pass(_)));

    let large = TestRequest::default()
        .method(Method::POST)
        .insert_header((header::CONTENT_LENGTH, "1025"))
        .to_http_request();
    match guard.check(&large) {
        Verdict::Reject { status, code, .. } => {
            assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
            assert_eq!(code, "PAYLOAD_TOO_LARGE");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[actix_web::test]
async fn pipeline_stops_at_first_failing_guard() {
    // Both the content-type and payload guards would fail; only the first
    // must produce the response.
    let req = TestRequest::default()
        .method(Method::POST)
        .insert_header((header::CONTENT_LENGTH, "99999"))
        .to_http_request();

    let guards = [
        Guard::ContentType(&["application/json"]),
        Guard::PayloadSize(1024),
    ];
    match run_guards(&req, &guards) {
        Outcome::Halt(response) => {
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], "INVALID_CONTENT_TYPE");
            assert!(body["timestamp"].is_string());
        }
        Outcome::Proceed(_) => panic!("pipeline should have halted"),
    }
}

#[actix_web::test]
async fn pipeline_rejection_uses_error_envelope() {
    let req = TestRequest::default().method(Method::PUT).to_http_request();

    let guards = [Guard::Method(GET_ONLY)];
    match run_guards(&req, &guards) {
        Outcome::Halt(response) => {
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(
                response
                    .headers()
                    .get(header::ALLOW)
                    .and_then(|v| v.to_str().ok()),
                Some("GET")
            );
            let body = body_json(response).await;
            assert_eq!(body["success"], false);
            assert_eq!(body["error"], "METHOD_NOT_ALLOWED");
            assert!(body["message"].as_str().is_some_and(|m| m.contains("PUT")));
        }
        Outcome::Proceed(_) => panic!("pipeline should have halted"),
    }
}

#[test]
fn pipeline_collects_pass_headers_for_the_handler() {
    let req = TestRequest::default()
        .method(Method::GET)
        .insert_header((header::ORIGIN, "https://a.com"))
        .to_http_request();

    let guards = [
        Guard::Method(GET_ONLY),
        Guard::Cors(origins(&["*"])),
        Guard::ContentType(&["application/json"]),
        Guard::PayloadSize(1024 * 1024),
    ];
    match run_guards(&req, &guards) {
        Outcome::Proceed(headers) => {
            assert_eq!(
                header_value(&headers, &header::ACCESS_CONTROL_ALLOW_ORIGIN),
                Some("https://a.com")
            );
        }
        Outcome::Halt(_) => panic!("all guards should pass"),
    }
}
