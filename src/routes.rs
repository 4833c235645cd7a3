use actix_web::{http::StatusCode, web::ServiceConfig, HttpRequest, HttpResponse};
use log::error;

use crate::{
    error::PollError,
    utils::{
        flash::{self, FlashMessage},
        json_responder::Response,
        jwt::JWT,
    },
};

pub mod admin_routes;
pub mod auth_routes;
pub mod general_routes;
pub mod poll_routes;

pub const INDEX_URL: &str = "/polls/";
pub const LOGIN_URL: &str = "/accounts/login/";

pub fn detail_url(question_id: &str) -> String {
    format!("/polls/{}/", question_id)
}

pub fn results_url(question_id: &str) -> String {
    format!("/polls/{}/results/", question_id)
}

pub fn login_redirect(next: &str) -> HttpResponse {
    let location = match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{}?{}", LOGIN_URL, query),
        Err(e) => {
            error!("Error encoding login target {} {}", next, e);
            LOGIN_URL.to_string()
        }
    };
    HttpResponse::Found()
        .insert_header(("Location", location))
        .finish()
}

/// Turns a service failure into the response the caller sees. Missing or
/// closed questions never surface as 404; they send the visitor back to the
/// index with a message.
pub fn error_response(req: &HttpRequest, jwt: &JWT, err: PollError) -> HttpResponse {
    match err {
        PollError::NotFound(_) | PollError::NotVotable(_) | PollError::NotOpened(_) => {
            flash::redirect(req, jwt, INDEX_URL, Some(FlashMessage::error(err.to_string())))
        }
        PollError::NoChoiceSelected => flash::redirect(
            req,
            jwt,
            req.path(),
            Some(FlashMessage::error(err.to_string())),
        ),
        PollError::Unauthorized => login_redirect(req.path()),
        PollError::Forbidden => Response::<()>::error(&err.to_string(), StatusCode::FORBIDDEN),
        PollError::Validation(errors) => Response::<()>::invalid(errors, StatusCode::BAD_REQUEST),
        PollError::Store(e) => {
            error!("Store failure on {} {:?}", req.path(), e);
            Response::<()>::error("Something went wrong!", StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn init(cnf: &mut ServiceConfig) {
    cnf.configure(general_routes::init)
        .configure(poll_routes::init)
        .configure(auth_routes::init)
        .configure(admin_routes::init);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;

    #[test]
    fn login_redirect_encodes_the_target() {
        let resp = login_redirect("/polls/a&b#c/");
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/accounts/login/?next=%2Fpolls%2Fa%26b%23c%2F"
        );
    }
}
