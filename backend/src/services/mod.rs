pub mod certificates;
pub mod health;

use actix_web::web;

/// Registers every route of the service on an Actix app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::configure_routes())
        .service(certificates::configure_routes());
}
