use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("This action require payment")]
    PaymentRequired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cannot booking this room")]
    CannotBooking,

    #[error("Cannot booking this activity! Overcapacity!")]
    CannotBookActivity,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// 对外暴露的错误码
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::PaymentRequired => "PAYMENT_REQUIRED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::CannotBooking => "CANNOT_BOOKING",
            AppError::CannotBookActivity => "CANNOT_BOOK_ACTIVITY",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::InvalidCredentials | AppError::JwtError(_) => {
                StatusCode::UNAUTHORIZED
            }
            AppError::PaymentRequired => StatusCode::PAYMENT_REQUIRED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::CannotBooking | AppError::CannotBookActivity => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let message = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                msg.clone()
            }
            AppError::Unauthorized(msg) => {
                log::warn!("Unauthorized: {msg}");
                msg.clone()
            }
            AppError::JwtError(err) => {
                log::warn!("Invalid token: {err}");
                "Invalid access token".to_string()
            }
            AppError::NotFound(msg) => msg.clone(),
            AppError::InvalidCredentials
            | AppError::PaymentRequired
            | AppError::CannotBooking
            | AppError::CannotBookActivity => self.to_string(),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                "Database error".to_string()
            }
            _ => {
                log::error!("Internal error: {self}");
                "Internal server error".to_string()
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message
            }
        }))
    }
}
