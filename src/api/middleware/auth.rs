use crate::config::AppConfig;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use std::{
    future::{ready, Future, Ready},
    pin::Pin,
    rc::Rc,
};
use tracing::{info, warn};

/// The authenticated user of a request, stored in the request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
}

/// Routes that need a logged-in user.
pub fn is_protected(path: &str) -> bool {
    path == "/add_category"
        || path.starts_with("/add_page/")
        || path == "/restricted"
        || path == "/register_profile"
        || path == "/like_category"
}

/// Resolves the current user from an `Authorization: Bearer` header or an
/// `api_key` query parameter, and sends anonymous requests for protected
/// routes to the login page.
pub struct LoginRequired;

impl<S, B> Transform<S, ServiceRequest> for LoginRequired
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = LoginRequiredMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoginRequiredMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct LoginRequiredMiddleware<S> {
    service: Rc<S>,
}

fn presented_key(req: &ServiceRequest) -> Option<String> {
    let key = match req.headers().get(header::AUTHORIZATION) {
        Some(header_value) => header_value
            .to_str()
            .ok()
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(|key| key.trim().to_string()),
        None => {
            let params = qstring::QString::from(req.query_string());
            params.get("api_key").map(|key| key.trim().to_string())
        }
    };

    key.filter(|key| !key.is_empty())
}

impl<S, B> Service<ServiceRequest> for LoginRequiredMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        let config = match req.app_data::<actix_web::web::Data<AppConfig>>() {
            Some(c) => c.clone(),
            None => {
                warn!("AppConfig missing in app_data");
                return Box::pin(async move {
                    Err(actix_web::error::ErrorInternalServerError("Configuration error"))
                });
            }
        };

        let user = presented_key(&req)
            .and_then(|key| config.auth.user_for_key(&key).cloned())
            .map(|credential| CurrentUser {
                username: credential.username,
            });

        match user {
            Some(user) => {
                req.extensions_mut().insert(user);
            }
            None if is_protected(req.path()) => {
                info!("Anonymous request for {}, redirecting to login", req.path());
                let location = format!(
                    "{}?next={}",
                    config.auth.login_url,
                    urlencoding::encode(req.path())
                );
                let response = HttpResponse::Found()
                    .insert_header((header::LOCATION, location))
                    .finish()
                    .map_into_right_body();
                return Box::pin(async move { Ok(req.into_response(response)) });
            }
            None => {}
        }

        Box::pin(async move {
            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protects_only_account_routes() {
        assert!(is_protected("/add_category"));
        assert!(is_protected("/add_page/python"));
        assert!(is_protected("/restricted"));
        assert!(is_protected("/register_profile"));
        assert!(is_protected("/like_category"));

        assert!(!is_protected("/"));
        assert!(!is_protected("/category/python"));
        assert!(!is_protected("/search"));
        assert!(!is_protected("/goto"));
    }
}
