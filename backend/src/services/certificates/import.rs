//! # Certificate Import Endpoint
//!
//! Backend logic for `POST /api/certificates/import`.
//!
//! ## Workflow
//!
//! 1.  **Authorization**: the bearer token is verified and must carry the admin
//!     claim. Nothing is read from the body before that.
//!
//! 2.  **Upload**: the multipart `file` field is streamed into memory while its
//!     size is checked against `max_upload_bytes` and its MD5 digest computed for
//!     the audit log. Other fields are ignored.
//!
//! 3.  **Import**: parsing and reconciliation run on the blocking pool, bounded
//!     by `import_timeout_secs`. Rows written before a timeout stay written and
//!     the worker stops before the next one.
//!
//! 4.  **HTTP Response**: the `ImportOutcome` as JSON. Batch-level problems
//!     (missing file, unreadable workbook, no sheets) reject the request instead.

use crate::auth::require_admin;
use crate::error::ImportError;
use crate::import::ImportReconciler;
use crate::spreadsheet;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use certs_common::model::import::ImportOutcome;
use futures_util::StreamExt;
use log::info;
use md5::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The multipart field carrying the spreadsheet.
const FILE_FIELD: &str = "file";

struct Upload {
    filename: String,
    bytes: Vec<u8>,
    md5: String,
}

/// HTTP handler: authorizes the caller, then imports the uploaded spreadsheet.
pub async fn process(
    req: HttpRequest,
    payload: Multipart,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let identity = require_admin(&req, state.verifier.as_ref())?;

    let upload = read_upload(payload, state.config.max_upload_bytes).await?;
    info!(
        "Import of '{}' ({} bytes, md5 {}) requested by {}",
        upload.filename,
        upload.bytes.len(),
        upload.md5,
        identity.subject
    );

    let outcome = run_import(&state, upload).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// Collects the `file` field of the multipart payload.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Upload, ImportError> {
    let mut upload: Option<Upload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ImportError::Multipart(e.to_string()))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if name.as_deref() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();

        let mut bytes = Vec::new();
        let mut md5_hasher = Context::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| ImportError::Multipart(e.to_string()))?;
            if bytes.len() + chunk.len() > limit {
                return Err(ImportError::TooLarge { limit });
            }
            md5_hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }

        upload = Some(Upload {
            filename,
            bytes,
            md5: format!("{:x}", md5_hasher.finalize()),
        });
    }

    upload.ok_or(ImportError::MissingFile)
}

/// Parses the upload and reconciles it against the store on the blocking pool.
///
/// The worker shares the response deadline, so once the caller has been told
/// the import timed out no further rows are written.
async fn run_import(state: &AppState, upload: Upload) -> Result<ImportOutcome, ImportError> {
    let store = Arc::clone(&state.store);
    let timeout = Duration::from_secs(state.config.import_timeout_secs);
    let deadline = Instant::now() + timeout;

    let job = web::block(move || {
        let rows = spreadsheet::parse_upload(&upload.filename, &upload.bytes)?;
        ImportReconciler::new(store.as_ref())
            .with_deadline(deadline)
            .import(&rows)
            .map_err(|_| ImportError::TimedOut)
    });

    match tokio::time::timeout(timeout, job).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(ImportError::Worker(e.to_string())),
        Err(_) => Err(ImportError::TimedOut),
    }
}
