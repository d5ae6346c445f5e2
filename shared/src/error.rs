use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    EntityNotFound(String),
    #[error("seat count must be 1 or 2, got {0}")]
    InvalidSeatCount(i32),
    #[error("event is full or not enough seats left")]
    CapacityExceeded,
    #[error("you can book up to {limit} seats only; you have already booked {booked} seat(s)")]
    SeatLimitExceeded { limit: i32, booked: i32 },
    #[error("cannot cancel past or ongoing events")]
    EventAlreadyStarted,
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("transaction failed")]
    TransactionError(#[source] sqlx::Error),
    #[error("database operation failed")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("no rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("login failed")]
    UnauthenticatedError,
    #[error("authentication is required")]
    UnauthorizedError,
    #[error("not authorized to perform this operation")]
    ForbiddenOperation,
    #[error("{0}")]
    ExternalServiceError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            AppError::InvalidSeatCount(_)
            | AppError::EventAlreadyStarted
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError | AppError::UnauthorizedError => {
                StatusCode::UNAUTHORIZED
            }
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            // 容量超過・一人あたり上限・一意制約違反はすべて競合として返すが
            // メッセージで区別できるようにしている
            AppError::CapacityExceeded
            | AppError::SeatLimitExceeded { .. }
            | AppError::ConflictError(_) => StatusCode::CONFLICT,
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::BcryptError(_)
            | AppError::ConvertToUuidError(_)
            | AppError::ExternalServiceError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status_code, self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
