use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::session::visits::VisitError;

pub type Result<T> = std::result::Result<T, RangoError>;

#[derive(Debug, Error)]
pub enum RangoError {
    #[error("Database Error: {0}")]
    Database(#[from] duckdb::Error),
    #[error("Visit Tracking Error: {0}")]
    Visit(#[from] VisitError),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database lock poisoned")]
    LockPoisoned,
    #[error("Not Found: {0}")]
    NotFound(String),
}

impl ResponseError for RangoError {
    fn status_code(&self) -> StatusCode {
        match self {
            RangoError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
