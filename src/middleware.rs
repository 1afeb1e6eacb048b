use actix_service::{forward_ready, Service};
use actix_web::dev::{ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, HttpRequest};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::errors::ApiError;
use crate::models::Role;
use crate::token::TokenService;

// Identity attached to the request after token verification.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

pub fn current_user(req: &HttpRequest) -> Result<AuthUser, ApiError> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(ApiError::Unauthorized)
}

// Middleware factory
pub struct AuthMiddleware {
    tokens: TokenService,
}

impl AuthMiddleware {
    pub fn new(tokens: TokenService) -> Self {
        AuthMiddleware { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    tokens: TokenService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let tokens = self.tokens.clone();
        let service = self.service.clone();

        Box::pin(async move {
            let header = match req.headers().get("Authorization") {
                Some(header) => header,
                None => return Err(ApiError::Unauthorized.into()),
            };

            let raw = match header.to_str() {
                Ok(raw) => raw,
                Err(_) => return Err(ApiError::InvalidToken.into()),
            };

            match tokens.verify(raw) {
                Ok(claims) => {
                    req.extensions_mut().insert(AuthUser {
                        id: claims.sub,
                        email: claims.email,
                        role: claims.role,
                    });
                    service.call(req).await
                }
                Err(_) => Err(ApiError::InvalidToken.into()),
            }
        })
    }
}
