use actix_web::body::BoxBody;
use actix_web::{
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
    HttpMessage, HttpRequest,
};
use log::debug;

use crate::models::poll_model::AuthUser;
use crate::utils::jwt::JWT;

pub const AUTH_COOKIE: &str = "auth_token";

/// Attaches the session's `AuthUser` to the request when the auth cookie
/// holds a valid token. Anonymous requests pass through untouched.
pub async fn identify_user(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    if let (Some(jwt), Some(cookie)) = (req.app_data::<Data<JWT>>(), req.cookie(AUTH_COOKIE)) {
        match jwt.decode(cookie.value()) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => debug!("Ignoring invalid or expired session token {}", e),
        }
    }
    next.call(req).await
}

pub fn current_user(req: &HttpRequest) -> Option<AuthUser> {
    req.extensions().get::<AuthUser>().cloned()
}
