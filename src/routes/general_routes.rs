use actix_web::{web::ServiceConfig, HttpResponse, Responder};

use super::INDEX_URL;

#[actix_web::get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::MovedPermanently()
        .insert_header(("Location", INDEX_URL))
        .finish()
}

pub fn init(cnf: &mut ServiceConfig) {
    cnf.service(home);
}
