use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Not enough stock for product {product_id}. Available: {available}")]
    InsufficientStock { product_id: Uuid, available: i32 },

    #[error("Authentication required. Please log in.")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Authorization,

    // Nothing partial was committed when this surfaces; the whole request is
    // safe to retry.
    #[error("Database transaction failed: {0}")]
    Transaction(#[from] sqlx::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Authorization => StatusCode::FORBIDDEN,
            AppError::Transaction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Transaction(e) = self {
            log::error!("transaction aborted: {:?}", e);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "status": "error",
            "message": self.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::Validation("Missing required order information".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = AppError::NotFound("Order not found".into());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Order not found");
    }

    #[test]
    fn insufficient_stock_is_bad_request_and_names_availability() {
        let id = Uuid::new_v4();
        let err = AppError::InsufficientStock {
            product_id: id,
            available: 2,
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains(&id.to_string()));
        assert!(err.to_string().contains("Available: 2"));
    }

    #[test]
    fn transaction_errors_are_retryable_500s() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn role_failure_is_forbidden() {
        assert_eq!(AppError::Authorization.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
