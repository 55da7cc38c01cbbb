use std::future::{ready, Ready};
use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use sqlx::PgPool;

use crate::auth::models::{AuthUser, Claims};
use crate::error::AppError;

/// Resolves the acting user from an `Authorization: Bearer` header and
/// attaches it to request extensions. Requests without the header pass
/// through anonymously; per-route requirements are enforced by the guards in
/// `auth::mod`. A header that is present but invalid is rejected outright.
#[derive(Clone)]
pub struct AuthMiddleware {
    pool: PgPool,
    jwt_secret: String,
}

impl AuthMiddleware {
    pub fn new(pool: PgPool, jwt_secret: String) -> Self {
        Self { pool, jwt_secret }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            pool: self.pool.clone(),
            jwt_secret: self.jwt_secret.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    pool: PgPool,
    jwt_secret: String,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let pool = self.pool.clone();
        let jwt_secret = self.jwt_secret.clone();
        let svc = Rc::clone(&self.service);

        Box::pin(async move {
            let bearer = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(|s| s.to_string());

            if let Some(token) = bearer {
                let decoded = decode::<Claims>(
                    &token,
                    &DecodingKey::from_secret(jwt_secret.as_bytes()),
                    &Validation::new(Algorithm::HS256),
                )
                .map_err(|_| AppError::Unauthorized)?;

                let user = sqlx::query_as::<_, AuthUser>(
                    "SELECT id, name, email, role FROM users WHERE id = $1",
                )
                .bind(decoded.claims.sub)
                .fetch_optional(&pool)
                .await
                .map_err(AppError::Transaction)?
                .ok_or(AppError::Unauthorized)?;

                req.extensions_mut().insert(user);
            }

            let res = svc.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
