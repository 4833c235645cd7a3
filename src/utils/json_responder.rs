use actix_web::{http::StatusCode, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::FormErrors;

use super::{
    flash::{self, FlashMessage},
    jwt::JWT,
};

#[derive(Deserialize, Serialize, Debug, PartialEq)]
pub enum Status {
    Ok,
    Error,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Response<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FormErrors>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<FlashMessage>,
}

impl<T: Serialize> Response<T> {
    pub fn ok(result: T, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(Response {
            status: Status::Ok,
            result: Some(result),
            error: None,
            errors: None,
            messages: Vec::new(),
        })
    }

    /// Renders a view, handing over the pending flash messages and clearing
    /// the flash cookie.
    pub fn page(req: &HttpRequest, jwt: &JWT, result: T, status: StatusCode) -> HttpResponse {
        Self::render(req, jwt, result, None, status)
    }

    /// Re-renders a form with the errors raised against it.
    pub fn form(req: &HttpRequest, jwt: &JWT, form: T, errors: FormErrors) -> HttpResponse {
        Self::render(req, jwt, form, Some(errors), StatusCode::OK)
    }

    fn render(
        req: &HttpRequest,
        jwt: &JWT,
        result: T,
        errors: Option<FormErrors>,
        status: StatusCode,
    ) -> HttpResponse {
        let messages = flash::pending(req, jwt);
        let mut response = HttpResponse::build(status);
        if flash::has_cookie(req) {
            response.cookie(flash::removal_cookie());
        }
        response.json(Response {
            status: if errors.is_some() { Status::Error } else { Status::Ok },
            result: Some(result),
            error: None,
            errors,
            messages,
        })
    }
}

impl Response<()> {
    pub fn error(error: &str, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(Response::<()> {
            status: Status::Error,
            result: None,
            error: Some(error.to_string()),
            errors: None,
            messages: Vec::new(),
        })
    }

    pub fn invalid(errors: FormErrors, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(Response::<()> {
            status: Status::Error,
            result: None,
            error: Some("Invalid form submission".to_string()),
            errors: Some(errors),
            messages: Vec::new(),
        })
    }
}
