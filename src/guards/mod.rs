//! Pre-handler request guards.
//!
//! Each guard is a pure decision over the request: it returns a [`Verdict`]
//! and never touches the response itself. [`run_guards`] walks an ordered
//! set, stops at the first non-pass verdict and builds the actual HTTP
//! response, so guards stay unit-testable without a response object.

pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header::{self, HeaderName};
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse};

use crate::models::envelope::{codes, ApiError};
use rate_limit::RateLimiter;

/// Headers a guard wants on the response, whether it passes or terminates.
pub type GuardHeaders = Vec<(HeaderName, String)>;

const READ_METHODS: &[Method] = &[Method::GET];
const WRITE_METHODS: &[Method] = &[Method::POST, Method::PUT, Method::DELETE];
const ADMIN_METHODS: &[Method] = &[Method::GET, Method::POST, Method::PUT, Method::DELETE];
const ALLOWED_CONTENT_TYPES: &[&str] = &["application/json"];

/// Outcome of a single guard decision.
#[derive(Debug)]
pub enum Verdict {
    /// Check passed; carry these headers onto the final response.
    Pass(GuardHeaders),
    /// Terminal success without running the handler (CORS preflight).
    Done {
        status: StatusCode,
        headers: GuardHeaders,
    },
    /// Terminal failure reported with the uniform error envelope.
    Reject {
        status: StatusCode,
        code: &'static str,
        message: String,
        headers: GuardHeaders,
    },
}

pub enum Guard {
    /// Allow-list of HTTP methods; rejects 405 with an `Allow` header.
    Method(&'static [Method]),
    /// Presence check on `x-api-key`/`authorization`; any non-empty value
    /// passes. Not real authentication.
    Auth,
    /// Origin allow-list; sets CORS headers on pass and answers preflight.
    Cors(Arc<Vec<String>>),
    /// Media-type allow-list for mutating methods.
    ContentType(&'static [&'static str]),
    /// Upper bound on the declared `content-length`, in bytes.
    PayloadSize(usize),
    /// Per-client fixed-window quota.
    RateLimit(Arc<RateLimiter>),
}

impl Guard {
    pub fn check(&self, req: &HttpRequest) -> Verdict {
        match self {
            Guard::Method(allowed) => check_method(req, allowed),
            Guard::Auth => check_auth(req),
            Guard::Cors(origins) => check_cors(req, origins),
            Guard::ContentType(types) => check_content_type(req, types),
            Guard::PayloadSize(max) => check_payload_size(req, *max),
            Guard::RateLimit(limiter) => check_rate_limit(req, limiter),
        }
    }
}

fn check_method(req: &HttpRequest, allowed: &[Method]) -> Verdict {
    if allowed.contains(req.method()) {
        return Verdict::Pass(Vec::new());
    }
    let allow = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    Verdict::Reject {
        status: StatusCode::METHOD_NOT_ALLOWED,
        code: codes::METHOD_NOT_ALLOWED,
        message: format!(
            "Método {} não permitido. Métodos permitidos: {}",
            req.method(),
            allow
        ),
        headers: vec![(header::ALLOW, allow)],
    }
}

fn check_auth(req: &HttpRequest) -> Verdict {
    let has_credentials = ["x-api-key", "authorization"]
        .iter()
        .any(|name| req.headers().get(*name).is_some_and(|v| !v.is_empty()));

    if has_credentials {
        Verdict::Pass(Vec::new())
    } else {
        Verdict::Reject {
            status: StatusCode::UNAUTHORIZED,
            code: codes::UNAUTHORIZED,
            message: "Autenticação necessária".to_string(),
            headers: Vec::new(),
        }
    }
}

fn check_cors(req: &HttpRequest, origins: &[String]) -> Verdict {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());

    let allowed = origins.iter().any(|o| o == "*")
        || origin.is_some_and(|o| origins.iter().any(|a| a == o));

    if !allowed {
        return Verdict::Reject {
            status: StatusCode::FORBIDDEN,
            code: codes::CORS_ERROR,
            message: "Origem não permitida".to_string(),
            headers: Vec::new(),
        };
    }

    let headers = vec![
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            origin.unwrap_or("*").to_string(),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            "GET, POST, PUT, DELETE, OPTIONS".to_string(),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            "Content-Type, Authorization, X-API-Key".to_string(),
        ),
    ];

    // Preflight terminates the pipeline with an empty 200.
    if req.method() == Method::OPTIONS {
        Verdict::Done {
            status: StatusCode::OK,
            headers,
        }
    } else {
        Verdict::Pass(headers)
    }
}

fn check_content_type(req: &HttpRequest, allowed: &[&str]) -> Verdict {
    // Only mutating methods carry a body worth checking.
    if req.method() == Method::GET || req.method() == Method::DELETE {
        return Verdict::Pass(Vec::new());
    }

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    match content_type {
        Some(ct) if allowed.iter().any(|t| ct.contains(t)) => Verdict::Pass(Vec::new()),
        _ => Verdict::Reject {
            status: StatusCode::BAD_REQUEST,
            code: codes::INVALID_CONTENT_TYPE,
            message: format!("Content-Type deve ser: {}", allowed.join(", ")),
            headers: Vec::new(),
        },
    }
}

fn check_payload_size(req: &HttpRequest, max: usize) -> Verdict {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);

    if declared > max {
        Verdict::Reject {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            code: codes::PAYLOAD_TOO_LARGE,
            message: format!("Payload muito grande. Tamanho máximo: {}KB", max / 1024),
            headers: Vec::new(),
        }
    } else {
        Verdict::Pass(Vec::new())
    }
}

fn check_rate_limit(req: &HttpRequest, limiter: &RateLimiter) -> Verdict {
    if limiter.try_acquire(&client_id(req)) {
        Verdict::Pass(Vec::new())
    } else {
        Verdict::Reject {
            status: StatusCode::TOO_MANY_REQUESTS,
            code: codes::RATE_LIMIT_EXCEEDED,
            message: format!(
                "Limite de {} requisições por minuto excedido",
                limiter.max_requests()
            ),
            headers: Vec::new(),
        }
    }
}

/// Client identifier for rate limiting: forwarded-for header, then peer
/// address, then a shared literal bucket. All clients without either end up
/// sharing the "unknown" quota.
fn client_id(req: &HttpRequest) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Result of running a guard set against a request.
pub enum Outcome {
    /// Every guard passed; attach these headers to the handler's response.
    Proceed(GuardHeaders),
    /// A guard terminated the request with this response.
    Halt(HttpResponse),
}

/// Run guards strictly in order, stopping at the first non-pass verdict.
pub fn run_guards(req: &HttpRequest, guards: &[Guard]) -> Outcome {
    let mut collected = GuardHeaders::new();

    for guard in guards {
        match guard.check(req) {
            Verdict::Pass(mut headers) => collected.append(&mut headers),
            Verdict::Done { status, headers } => {
                let mut builder = HttpResponse::build(status);
                for (name, value) in collected.iter().chain(headers.iter()) {
                    builder.insert_header((name.clone(), value.as_str()));
                }
                return Outcome::Halt(builder.finish());
            }
            Verdict::Reject {
                status,
                code,
                message,
                headers,
            } => {
                let mut builder = HttpResponse::build(status);
                for (name, value) in collected.iter().chain(headers.iter()) {
                    builder.insert_header((name.clone(), value.as_str()));
                }
                return Outcome::Halt(builder.json(ApiError::new(code, message)));
            }
        }
    }

    Outcome::Proceed(collected)
}

/// Guard policy knobs, read once at startup.
pub struct GuardConfig {
    pub max_requests: u32,
    pub window: Duration,
    pub allowed_origins: Vec<String>,
    pub max_payload_bytes: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            allowed_origins: vec!["*".to_string()],
            max_payload_bytes: 1024 * 1024,
        }
    }
}

impl GuardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_requests: parse_env("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests),
            window: Duration::from_secs(parse_env("RATE_LIMIT_WINDOW_SECS", 60)),
            allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            max_payload_bytes: parse_env("MAX_PAYLOAD_BYTES", defaults.max_payload_bytes),
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Shared guard state, constructed once in `main` and injected as app data.
pub struct GuardContext {
    rate_limiter: Arc<RateLimiter>,
    allowed_origins: Arc<Vec<String>>,
    max_payload_bytes: usize,
}

impl GuardContext {
    pub fn new(config: GuardConfig) -> Self {
        Self {
            rate_limiter: Arc::new(RateLimiter::new(config.max_requests, config.window)),
            allowed_origins: Arc::new(config.allowed_origins),
            max_payload_bytes: config.max_payload_bytes,
        }
    }

    fn default_guards(&self) -> Vec<Guard> {
        vec![
            Guard::Cors(self.allowed_origins.clone()),
            Guard::ContentType(ALLOWED_CONTENT_TYPES),
            Guard::PayloadSize(self.max_payload_bytes),
            Guard::RateLimit(self.rate_limiter.clone()),
        ]
    }

    /// Guard set for read-only routes: GET only, then the shared defaults.
    pub fn read_guards(&self) -> Vec<Guard> {
        let mut guards = vec![Guard::Method(READ_METHODS)];
        guards.extend(self.default_guards());
        guards
    }

    /// Guard set for mutating routes.
    pub fn write_guards(&self) -> Vec<Guard> {
        let mut guards = vec![Guard::Method(WRITE_METHODS)];
        guards.extend(self.default_guards());
        guards
    }

    /// Guard set for privileged routes: adds the credential presence check.
    pub fn admin_guards(&self) -> Vec<Guard> {
        let mut guards = vec![Guard::Method(ADMIN_METHODS), Guard::Auth];
        guards.extend(self.default_guards());
        guards
    }
}
