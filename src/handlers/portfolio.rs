use actix_web::http::{header, Method};
use actix_web::{web, HttpRequest, HttpResponse, HttpResponseBuilder};
use serde::Serialize;

use crate::error::ServiceError;
use crate::guards::{self, GuardContext, GuardHeaders, Outcome};
use crate::models::envelope::{codes, ApiError, ApiResponse};
use crate::models::portfolio::{PortfolioFilters, RawPortfolio};
use crate::service::PortfolioService;
use crate::validation;

/// `/api/portfolios` — GET lists with filters, POST creates.
pub async fn collection(
    req: HttpRequest,
    service: web::Data<PortfolioService>,
    guard_ctx: web::Data<GuardContext>,
    body: web::Bytes,
) -> HttpResponse {
    let set = if req.method() == Method::GET {
        guard_ctx.read_guards()
    } else {
        guard_ctx.write_guards()
    };
    let headers = match guards::run_guards(&req, &set) {
        Outcome::Halt(response) => return response,
        Outcome::Proceed(headers) => headers,
    };

    if req.method() == Method::GET {
        let filters = match web::Query::<PortfolioFilters>::from_query(req.query_string()) {
            Ok(query) => query.into_inner(),
            Err(err) => {
                return bad_request(
                    codes::VALIDATION_ERROR,
                    format!("Parâmetros de consulta inválidos: {err}"),
                    &headers,
                );
            }
        };
        respond(service.list(filters).await, &headers)
    } else if req.method() == Method::POST {
        let raw: RawPortfolio = match serde_json::from_slice(&body) {
            Ok(raw) => raw,
            Err(err) => {
                return bad_request(
                    codes::VALIDATION_ERROR,
                    format!("Corpo da requisição inválido: {err}"),
                    &headers,
                );
            }
        };
        let data = validation::sanitize_portfolio_data(&raw);
        match service.create(data).await {
            Ok(envelope) => with_headers(HttpResponse::Created(), &headers).json(envelope),
            Err(err) => error_response(&err, &headers),
        }
    } else {
        // The write guard set also admits DELETE, which this resource has no
        // handler for.
        method_not_allowed(&req, "GET, POST", &headers)
    }
}

/// `/api/portfolios/{id}` — GET fetches, PUT partially updates, DELETE removes.
pub async fn item(
    req: HttpRequest,
    service: web::Data<PortfolioService>,
    guard_ctx: web::Data<GuardContext>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let set = if req.method() == Method::GET {
        guard_ctx.read_guards()
    } else {
        guard_ctx.write_guards()
    };
    let headers = match guards::run_guards(&req, &set) {
        Outcome::Halt(response) => return response,
        Outcome::Proceed(headers) => headers,
    };

    let id = match validation::parse_id(&path) {
        Some(id) => id,
        None => return error_response(&ServiceError::InvalidId, &headers),
    };

    if req.method() == Method::GET {
        respond(service.get(id).await, &headers)
    } else if req.method() == Method::PUT {
        let raw: RawPortfolio = match serde_json::from_slice(&body) {
            Ok(raw) => raw,
            Err(err) => {
                return bad_request(
                    codes::VALIDATION_ERROR,
                    format!("Corpo da requisição inválido: {err}"),
                    &headers,
                );
            }
        };
        let data = validation::sanitize_update_portfolio(id, &raw);
        respond(service.update(data).await, &headers)
    } else if req.method() == Method::DELETE {
        respond(service.delete(id).await, &headers)
    } else {
        method_not_allowed(&req, "GET, PUT, DELETE", &headers)
    }
}

/// `/api/portfolios/stats` — GET aggregate statistics. Runs the admin guard
/// set, so a credential header must be present.
pub async fn stats(
    req: HttpRequest,
    service: web::Data<PortfolioService>,
    guard_ctx: web::Data<GuardContext>,
) -> HttpResponse {
    let headers = match guards::run_guards(&req, &guard_ctx.admin_guards()) {
        Outcome::Halt(response) => return response,
        Outcome::Proceed(headers) => headers,
    };

    if req.method() != Method::GET {
        return method_not_allowed(&req, "GET", &headers);
    }

    respond(service.stats().await, &headers)
}

fn with_headers(mut builder: HttpResponseBuilder, headers: &GuardHeaders) -> HttpResponseBuilder {
    for (name, value) in headers {
        builder.insert_header((name.clone(), value.as_str()));
    }
    builder
}

fn respond<T: Serialize>(
    result: Result<ApiResponse<T>, ServiceError>,
    headers: &GuardHeaders,
) -> HttpResponse {
    match result {
        Ok(envelope) => with_headers(HttpResponse::Ok(), headers).json(envelope),
        Err(err) => error_response(&err, headers),
    }
}

fn error_response(err: &ServiceError, headers: &GuardHeaders) -> HttpResponse {
    // Store failures are logged in full but reported generically.
    let envelope = match err {
        ServiceError::Validation(errors) => {
            ApiError::with_validation(err.code(), err.to_string(), errors.clone())
        }
        ServiceError::Database(db_err) => {
            tracing::error!(error = %db_err, "store operation failed");
            ApiError::new(err.code(), "Erro interno do servidor")
        }
        _ => ApiError::new(err.code(), err.to_string()),
    };

    with_headers(HttpResponse::build(err.status()), headers).json(envelope)
}

fn bad_request(code: &'static str, message: String, headers: &GuardHeaders) -> HttpResponse {
    with_headers(HttpResponse::BadRequest(), headers).json(ApiError::new(code, message))
}

fn method_not_allowed(req: &HttpRequest, allow: &'static str, headers: &GuardHeaders) -> HttpResponse {
    with_headers(HttpResponse::MethodNotAllowed(), headers)
        .insert_header((header::ALLOW, allow))
        .json(ApiError::new(
            codes::METHOD_NOT_ALLOWED,
            format!("Método {} não permitido", req.method()),
        ))
}
