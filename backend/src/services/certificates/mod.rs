//! # Certificate Service Module
//!
//! Routes every request under `/api/certificates` to its handler.
//!
//! ## Sub-modules:
//! - `get`: public lookup of one certificate by ID.
//! - `pdf`: renders one certificate as a downloadable PDF.
//! - `import`: admin-only spreadsheet upload feeding the import reconciler.

mod get;
mod import;
mod pdf;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all certificate endpoints.
const API_PATH: &str = "/api/certificates";

/// Configures and returns the Actix `Scope` for certificate routes.
///
/// # Registered Routes:
///
/// *   **`POST /import`**:
///     - **Handler**: `import::process`
///     - **Description**: Accepts a multipart upload whose `file` field holds a CSV
///       or Excel workbook. Requires an admin bearer token. Every row is upserted
///       by certificate ID and the response lists inserted and updated IDs plus
///       the rows that failed, with their 1-based row numbers.
///
/// *   **`GET /{certificate_id}`**:
///     - **Handler**: `get::process`
///     - **Description**: Returns `{"certificate": {...}}`, or 404 when no record
///       has that ID.
///
/// *   **`GET /{certificate_id}/pdf`**:
///     - **Handler**: `pdf::process`
///     - **Description**: Renders the certificate and serves it as an attachment
///       named `<certificate_id>.pdf`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/import", post().to(import::process))
        .route("/{certificate_id}", get().to(get::process))
        .route("/{certificate_id}/pdf", get().to(pdf::process))
}
