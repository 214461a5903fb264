use actix_web::http::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

use crate::models::envelope::{codes, ValidationError};

/// Typed service failure. Handlers map the variant to a status code and
/// envelope code instead of inspecting message text.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Portfólio não encontrado")]
    NotFound,
    #[error("Dados inválidos")]
    Validation(Vec<ValidationError>),
    #[error("ID inválido")]
    InvalidId,
    #[error("Erro no banco de dados: {0}")]
    Database(#[from] DbErr),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::InvalidId => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => codes::NOT_FOUND,
            Self::Validation(_) => codes::VALIDATION_ERROR,
            Self::InvalidId => codes::INVALID_ID,
            Self::Database(_) => codes::INTERNAL_ERROR,
        }
    }
}
