//! Certificate persistence.
//!
//! The import path and the public lookup only see the [`CertificateStore`] trait;
//! [`SqliteCertificateStore`] is the implementation wired in by `main.rs`.

mod sqlite;

pub use sqlite::SqliteCertificateStore;

use certs_common::model::certificate::{Certificate, CertificateFields};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The record as it stands after an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub certificate: Certificate,
    /// True when no record with this certificate ID existed before the write.
    pub created: bool,
}

/// Keyed access to certificate records.
///
/// Implementations must make `find_one_and_update` atomic per certificate ID so
/// that concurrent imports of the same ID never produce two records.
pub trait CertificateStore: Send + Sync {
    /// Looks a certificate up by ID. A missing record is `Ok(None)`.
    fn find_one(&self, certificate_id: &str) -> Result<Option<Certificate>, StoreError>;

    /// Inserts the record, or replaces every field of the existing one.
    fn find_one_and_update(&self, fields: &CertificateFields) -> Result<Upserted, StoreError>;
}
