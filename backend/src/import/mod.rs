//! # Certificate Import
//!
//! The bulk spreadsheet import, split into three steps:
//!
//! - `normalize`: maps loosely named spreadsheet headers onto the six canonical
//!   certificate fields.
//! - `validate`: coerces the matched cells into typed [`CertificateFields`],
//!   reporting every problem of a row at once.
//! - `reconcile`: runs both over a whole batch and upserts each valid row into the
//!   certificate store, classifying it as inserted or updated and recording a
//!   failure for anything else without stopping the batch.
//!
//! [`CertificateFields`]: certs_common::model::certificate::CertificateFields

pub mod normalize;
pub mod reconcile;
pub mod validate;

pub use normalize::{normalize_header, normalize_row, CandidateRow, CanonicalField};
pub use reconcile::{DeadlineExceeded, ImportReconciler, RowError};
pub use validate::{validate_row, FieldIssue, ValidationError};
