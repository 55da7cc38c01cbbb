pub mod middleware;
pub mod models;

use actix_web::{HttpMessage, HttpRequest};

use crate::error::AppError;
pub use middleware::AuthMiddleware;
pub use models::{AuthUser, UserRole};

pub fn current_user(req: &HttpRequest) -> Option<AuthUser> {
    req.extensions().get::<AuthUser>().cloned()
}

pub fn require_user(req: &HttpRequest) -> Result<AuthUser, AppError> {
    current_user(req).ok_or(AppError::Unauthorized)
}

pub fn require_admin(req: &HttpRequest) -> Result<AuthUser, AppError> {
    let user = require_user(req)?;
    if user.role != UserRole::Admin {
        return Err(AppError::Authorization);
    }
    Ok(user)
}
