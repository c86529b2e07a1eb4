use crate::error::LookupError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use certs_common::model::certificate::Certificate;
use certs_common::responses::CertificateResponse;
use std::sync::Arc;

/// Actix web handler for `GET /api/certificates/{certificate_id}`.
///
/// # Returns
/// - `200 OK` with `{"certificate": {...}}` when the record exists.
/// - `404 Not Found` when it does not.
/// - `503 Service Unavailable` when the store cannot be read.
pub async fn process(
    certificate_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, LookupError> {
    let certificate = find_certificate(&state, certificate_id.into_inner())
        .await?
        .ok_or(LookupError::NotFound)?;
    Ok(HttpResponse::Ok().json(CertificateResponse { certificate }))
}

/// Reads one certificate on the blocking pool. A missing record is `Ok(None)`.
pub(crate) async fn find_certificate(
    state: &AppState,
    certificate_id: String,
) -> Result<Option<Certificate>, LookupError> {
    let store = Arc::clone(&state.store);
    let found = web::block(move || store.find_one(&certificate_id))
        .await
        .map_err(|e| LookupError::Worker(e.to_string()))??;
    Ok(found)
}
