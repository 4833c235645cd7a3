use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    http::header,
    HttpRequest, HttpResponse,
};
use chrono::Duration;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::jwt::{expires_in, JWT};

pub const FLASH_COOKIE: &str = "messages";
const FLASH_LIFETIME_MINUTES: i64 = 5;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

impl FlashMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: Level::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: Level::Error, text: text.into() }
    }
}

#[derive(Deserialize, Serialize, Debug)]
struct FlashToken {
    messages: Vec<FlashMessage>,
    exp: usize,
}

/// Messages waiting in the request's flash cookie. Tampered or expired
/// cookies yield nothing.
pub fn pending(req: &HttpRequest, jwt: &JWT) -> Vec<FlashMessage> {
    let Some(cookie) = req.cookie(FLASH_COOKIE) else {
        return Vec::new();
    };
    match jwt.decode_payload::<FlashToken>(cookie.value()) {
        Ok(token) => token.messages,
        Err(e) => {
            debug!("Dropping unreadable flash cookie {}", e);
            Vec::new()
        }
    }
}

pub fn has_cookie(req: &HttpRequest) -> bool {
    req.cookie(FLASH_COOKIE).is_some()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// 302 to `location`, queueing `message` behind any messages still pending.
pub fn redirect(req: &HttpRequest, jwt: &JWT, location: &str, message: Option<FlashMessage>) -> HttpResponse {
    let mut response = HttpResponse::Found();
    response.insert_header((header::LOCATION, location));

    let Some(message) = message else {
        return response.finish();
    };
    let mut messages = pending(req, jwt);
    messages.push(message);
    let token = FlashToken {
        messages,
        exp: expires_in(Duration::minutes(FLASH_LIFETIME_MINUTES)),
    };
    match jwt.sign_payload(&token) {
        Ok(value) => {
            let cookie = Cookie::build(FLASH_COOKIE, value)
                .http_only(true)
                .same_site(SameSite::Lax)
                .path("/")
                .max_age(CookieDuration::minutes(FLASH_LIFETIME_MINUTES))
                .finish();
            response.cookie(cookie);
        }
        Err(e) => error!("Error signing flash messages {}", e),
    }
    response.finish()
}
