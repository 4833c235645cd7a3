use actix_web::{
    http::StatusCode,
    web::{scope, Data, Json, Path, ServiceConfig},
    HttpRequest, Responder,
};
use serde_json::json;

use super::error_response;
use crate::{
    db::PollStore,
    error::PollError,
    middlewares::authenticate::current_user,
    models::poll_api_model::NewQuestionRequest,
    services::polls,
    utils::{clock::Clock, json_responder::Response, jwt::JWT},
};

#[actix_web::get("")]
pub async fn list_questions(
    req: HttpRequest,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    clock: Data<Clock>,
) -> impl Responder {
    let identity = current_user(&req);
    match polls::all_questions(store.get_ref(), identity.as_ref(), clock.now()).await {
        Ok(questions) => Response::ok(questions, StatusCode::OK),
        Err(e) => error_response(&req, &jwt, e),
    }
}

#[actix_web::post("")]
pub async fn create_question(
    req: HttpRequest,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
    clock: Data<Clock>,
    Json(request): Json<NewQuestionRequest>,
) -> impl Responder {
    let identity = current_user(&req);
    match polls::create_question(store.get_ref(), identity.as_ref(), request, clock.now()).await {
        Ok((question, choices)) => Response::ok(
            json!({"question": question, "choices": choices}),
            StatusCode::CREATED,
        ),
        Err(e) => error_response(&req, &jwt, e),
    }
}

#[actix_web::delete("/{id}")]
pub async fn delete_question(
    req: HttpRequest,
    id: Path<String>,
    store: Data<dyn PollStore>,
    jwt: Data<JWT>,
) -> impl Responder {
    let identity = current_user(&req);
    match polls::delete_question(store.get_ref(), identity.as_ref(), &id).await {
        Ok(()) => Response::ok(format!("Deleted question {}", id), StatusCode::OK),
        // admin clients get a plain 404 rather than the visitor redirect
        Err(PollError::NotFound(id)) => Response::<()>::error(
            &format!("Poll question {} does not exist.", id),
            StatusCode::NOT_FOUND,
        ),
        Err(e) => error_response(&req, &jwt, e),
    }
}

pub fn init(cnf: &mut ServiceConfig) {
    cnf.service(
        scope("/admin/questions")
            .service(list_questions)
            .service(create_question)
            .service(delete_question),
    );
}
