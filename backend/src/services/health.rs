use actix_web::web::{get, resource};
use actix_web::{HttpResponse, Resource, Responder};
use certs_common::responses::HealthResponse;

pub fn configure_routes() -> Resource {
    resource("/health").route(get().to(process))
}

async fn process() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse { ok: true })
}
