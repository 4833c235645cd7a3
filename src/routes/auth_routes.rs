use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    web::{self, Data, ServiceConfig},
    HttpRequest, HttpResponse, Responder,
};
use log::{error, info};
use serde_json::json;

use super::{error_response, INDEX_URL, LOGIN_URL};
use crate::{
    config::app_config::AppConfig,
    db::PollStore,
    error::PollError,
    middlewares::authenticate::AUTH_COOKIE,
    models::{
        poll_api_model::{LoginForm, NextParam, SignupForm},
        poll_model::User,
    },
    services::accounts,
    utils::{json_responder::Response, jwt::JWT},
};

/// Absolute path on this site: no scheme, no authority, nothing a browser
/// would rewrite into one.
fn is_local_path(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next
            .chars()
            .any(|c| c == '\\' || c.is_whitespace() || c.is_control())
}

/// Only same-site paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if is_local_path(next) => next,
        _ => INDEX_URL,
    }
}

fn session_cookie(jwt: &JWT, config: &AppConfig, token: String) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!config.is_dev)
        .path("/")
        .max_age(Duration::seconds(jwt.session_lifetime().num_seconds()))
        .finish()
}

/// 302 to `location` carrying a fresh session for `user`.
fn logged_in(jwt: &JWT, config: &AppConfig, user: &User, location: &str) -> HttpResponse {
    let token = match jwt.sign(user) {
        Ok(token) => token,
        Err(e) => {
            error!("Error generating the jwt token {} {}", user.username, e);
            return Response::<()>::error(
                "Something went wrong!",
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            );
        }
    };
    HttpResponse::Found()
        .insert_header(("Location", location.to_string()))
        .cookie(session_cookie(jwt, config, token))
        .finish()
}

#[actix_web::get("/accounts/login/")]
pub async fn login_page(
    req: HttpRequest,
    jwt: Data<JWT>,
    web::Query(params): web::Query<NextParam>,
) -> impl Responder {
    Response::page(
        &req,
        &jwt,
        json!({"username": "", "next": params.next}),
        actix_web::http::StatusCode::OK,
    )
}

#[actix_web::post("/accounts/login/")]
pub async fn login(
    req: HttpRequest,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    config: Data<AppConfig>,
    web::Query(params): web::Query<NextParam>,
    web::Form(form): web::Form<LoginForm>,
) -> HttpResponse {
    match accounts::login(store.get_ref(), &form).await {
        Ok(user) => {
            info!("User logged in: {}", user.username);
            let next = form.next.as_deref().or(params.next.as_deref());
            logged_in(&jwt, &config, &user, safe_next(next))
        }
        Err(PollError::Validation(errors)) => Response::form(
            &req,
            &jwt,
            json!({"username": form.username, "next": form.next.or(params.next)}),
            errors,
        ),
        Err(e) => error_response(&req, &jwt, e),
    }
}

pub async fn logout_user() -> HttpResponse {
    let cookie = Cookie::build(AUTH_COOKIE, "")
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::days(-1))
        .finish();
    HttpResponse::Found()
        .insert_header(("Location", LOGIN_URL))
        .cookie(cookie)
        .finish()
}

#[actix_web::get("/signup/")]
pub async fn signup_page(req: HttpRequest, jwt: Data<JWT>) -> impl Responder {
    Response::page(
        &req,
        &jwt,
        json!({"username": ""}),
        actix_web::http::StatusCode::OK,
    )
}

#[actix_web::post("/signup/")]
pub async fn signup(
    req: HttpRequest,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    config: Data<AppConfig>,
    web::Form(form): web::Form<SignupForm>,
) -> HttpResponse {
    match accounts::signup(store.get_ref(), &form, config.bcrypt_cost).await {
        Ok(user) => logged_in(&jwt, &config, &user, INDEX_URL),
        Err(PollError::Validation(errors)) => {
            Response::form(&req, &jwt, json!({"username": form.username}), errors)
        }
        Err(e) => error_response(&req, &jwt, e),
    }
}

pub fn init(cnf: &mut ServiceConfig) {
    cnf.service(login_page)
        .service(login)
        .service(
            web::resource("/accounts/logout/")
                .route(web::get().to(logout_user))
                .route(web::post().to(logout_user)),
        )
        .service(signup_page)
        .service(signup);
}
