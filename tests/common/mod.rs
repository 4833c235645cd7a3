#![allow(dead_code)]

use std::sync::Arc;

use actix_web::{
    cookie::Cookie,
    dev::ServiceResponse,
    http::header,
};
use chrono::{DateTime, Duration, Utc};
use polls_backend::{
    config::app_config::AppConfig,
    db::{memory_store::MemoryStore, PollStore},
    middlewares::authenticate::AUTH_COOKIE,
    models::poll_model::{Choice, Question, User},
    services::accounts,
    utils::{flash::FLASH_COOKIE, jwt::JWT},
};

pub const SECRET: &str = "test-secret";
pub const PASSWORD: &str = "test1234";
/// bcrypt's minimum cost (the crate keeps its own `MIN_COST` private).
pub const BCRYPT_MIN_COST: u32 = 4;

pub fn test_config() -> AppConfig {
    AppConfig {
        db_url: "memory:".to_string(),
        db_name: "polls-test".to_string(),
        jwt_secret: SECRET.to_string(),
        is_dev: true,
        client_origin: "http://localhost:3000".to_string(),
        server_addr: "localhost:0".to_string(),
        session_days: 1,
        bcrypt_cost: BCRYPT_MIN_COST,
        admin_username: None,
        admin_password: None,
    }
}

/// Builds the full application around a memory store and a fixed clock.
macro_rules! test_app {
    ($store:expr, $now:expr) => {
        ::actix_web::test::init_service(
            ::actix_web::App::new()
                .app_data(::actix_web::web::Data::from(
                    $store.clone() as ::std::sync::Arc<dyn ::polls_backend::db::PollStore>
                ))
                .app_data(::actix_web::web::Data::new(
                    ::polls_backend::utils::jwt::JWT::init(crate::common::SECRET, 1),
                ))
                .app_data(::actix_web::web::Data::new(
                    ::polls_backend::utils::clock::Clock::Fixed($now),
                ))
                .app_data(::actix_web::web::Data::new(crate::common::test_config()))
                .wrap(::actix_web::middleware::from_fn(
                    ::polls_backend::middlewares::authenticate::identify_user,
                ))
                .configure(::polls_backend::routes::init),
        )
        .await
    };
}
pub(crate) use test_app;

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Creates a question published `days` from `now` (negative for the past)
/// with the given choices.
pub async fn create_question(
    store: &MemoryStore,
    text: &str,
    now: DateTime<Utc>,
    days: i64,
    end_days: Option<i64>,
    choices: &[&str],
) -> (Question, Vec<Choice>) {
    let question = Question::new(
        text,
        now + Duration::days(days),
        end_days.map(|d| now + Duration::days(d)),
    );
    let choices: Vec<Choice> = choices.iter().map(|c| Choice::new(&question.id, c)).collect();
    store
        .insert_question(question.clone(), choices.clone())
        .await
        .unwrap();
    (question, choices)
}

pub async fn create_user(store: &MemoryStore, username: &str, is_staff: bool) -> User {
    let user = accounts::new_user(username, PASSWORD, is_staff, BCRYPT_MIN_COST).unwrap();
    assert!(store.insert_user(user.clone()).await.unwrap());
    user
}

pub fn session_cookie(user: &User) -> Cookie<'static> {
    let token = JWT::init(SECRET, 1).sign(user).unwrap();
    Cookie::new(AUTH_COOKIE, token)
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("redirect without location")
        .to_str()
        .unwrap()
        .to_string()
}

pub fn response_cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

pub fn flash_cookie<B>(resp: &ServiceResponse<B>) -> Cookie<'static> {
    let cookie = response_cookie(resp, FLASH_COOKIE).expect("no flash cookie set");
    Cookie::new(FLASH_COOKIE, cookie.value().to_string())
}

pub async fn user_exists(store: &MemoryStore, username: &str) -> bool {
    store.find_user_by_username(username).await.unwrap().is_some()
}
