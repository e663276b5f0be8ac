use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug)]
pub enum AppError {
    Conflict(String),
    InvalidCredentials,
    NotFound(String),
    Validation(String),
    DatabaseError(String),
    HashError(String),
}

impl AppError {
    /// Message sent back to the client. Server-side faults stay opaque.
    pub fn detail(&self) -> &str {
        match self {
            AppError::Conflict(msg) | AppError::NotFound(msg) | AppError::Validation(msg) => msg,
            AppError::InvalidCredentials => INVALID_CREDENTIALS,
            AppError::DatabaseError(_) | AppError::HashError(_) => "Internal server error",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::HashError(msg) => write!(f, "Password hashing error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(e: mongodb::error::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::HashError(e.to_string())
    }
}

impl ResponseError for AppError {
    // Client-class failures all share 400, matching the public contract.
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Conflict(_) | AppError::InvalidCredentials | AppError::NotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_) | AppError::HashError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "detail": self.detail()
        }))
    }
}
