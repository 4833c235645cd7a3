use actix_web::{
    http::StatusCode,
    web::{self, scope, Data, Path, ServiceConfig},
    HttpRequest, HttpResponse, Responder,
};

use super::{detail_url, error_response, login_redirect, results_url};
use crate::{
    db::PollStore,
    error::PollError,
    middlewares::authenticate::current_user,
    models::poll_api_model::VoteForm,
    services::{polls, voting},
    utils::{
        clock::Clock,
        flash::{self, FlashMessage},
        json_responder::Response,
        jwt::JWT,
    },
};

#[actix_web::get("/")]
pub async fn index(
    req: HttpRequest,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    clock: Data<Clock>,
) -> impl Responder {
    match polls::published_questions(store.get_ref(), clock.now()).await {
        Ok(list) => Response::page(&req, &jwt, list, StatusCode::OK),
        Err(e) => error_response(&req, &jwt, e),
    }
}

#[actix_web::get("/{id}/")]
pub async fn detail(
    req: HttpRequest,
    id: Path<String>,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    clock: Data<Clock>,
) -> impl Responder {
    let identity = current_user(&req);
    match polls::question_detail(store.get_ref(), identity.as_ref(), &id, clock.now()).await {
        Ok(detail) => Response::page(&req, &jwt, detail, StatusCode::OK),
        Err(e) => error_response(&req, &jwt, e),
    }
}

#[actix_web::get("/{id}/results/")]
pub async fn results(
    req: HttpRequest,
    id: Path<String>,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    clock: Data<Clock>,
) -> impl Responder {
    match polls::question_results(store.get_ref(), &id, clock.now()).await {
        Ok(results) => Response::page(&req, &jwt, results, StatusCode::OK),
        Err(e) => error_response(&req, &jwt, e),
    }
}

#[actix_web::post("/{id}/vote/")]
pub async fn vote(
    req: HttpRequest,
    id: Path<String>,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    clock: Data<Clock>,
    form: Option<web::Form<VoteForm>>,
) -> HttpResponse {
    let identity = current_user(&req);
    // an unreadable body counts as no selection
    let choice_id = form.and_then(|form| form.into_inner().choice);
    let result = voting::cast_vote(
        store.get_ref(),
        identity.as_ref(),
        &id,
        choice_id.as_deref(),
        clock.now(),
    )
    .await;

    match result {
        Ok(choice) => flash::redirect(
            &req,
            &jwt,
            &results_url(&id),
            Some(FlashMessage::success(format!(
                "Your choice ( {} ) has been saved.",
                choice.text
            ))),
        ),
        Err(PollError::Unauthorized) => login_redirect(&detail_url(&id)),
        Err(e @ PollError::NoChoiceSelected) => flash::redirect(
            &req,
            &jwt,
            &detail_url(&id),
            Some(FlashMessage::error(e.to_string())),
        ),
        Err(e) => error_response(&req, &jwt, e),
    }
}

pub fn init(cnf: &mut ServiceConfig) {
    cnf.service(
        scope("/polls")
            .service(index)
            .service(detail)
            .service(results)
            .service(vote),
    );
}
