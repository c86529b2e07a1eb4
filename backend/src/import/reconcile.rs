use super::normalize::{colliding_headers, normalize_row};
use super::validate::{validate_row, ValidationError};
use crate::spreadsheet::RawRow;
use crate::store::{CertificateStore, StoreError, Upserted};
use certs_common::model::certificate::CertificateFields;
use certs_common::model::import::{ImportOutcome, RowFailure};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::time::Instant;
use thiserror::Error;

/// Why a single row was rejected. Never escapes the batch.
#[derive(Debug, Error)]
pub enum RowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The deadline passed before the batch finished. Rows before `row` were
/// processed and stay written; nothing from `row` on was touched.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("import stopped before row {row}; {written} rows were written")]
pub struct DeadlineExceeded {
    pub row: usize,
    pub written: usize,
}

/// Applies a parsed spreadsheet to the certificate store.
pub struct ImportReconciler<'a> {
    store: &'a dyn CertificateStore,
    deadline: Option<Instant>,
}

impl<'a> ImportReconciler<'a> {
    pub fn new(store: &'a dyn CertificateStore) -> Self {
        Self {
            store,
            deadline: None,
        }
    }

    /// Stops the batch before the first upsert that would start after `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Imports every row and reports one outcome per row.
    ///
    /// Rows are normalized and validated in parallel, then upserted one at a time
    /// in their original order. A failing row is recorded with its 1-based
    /// position and the batch carries on; rows already written stay written.
    pub fn import(&self, rows: &[RawRow]) -> Result<ImportOutcome, DeadlineExceeded> {
        let start = Instant::now();
        warn_on_colliding_headers(rows);

        let validated: Vec<Result<CertificateFields, ValidationError>> = rows
            .par_iter()
            .map(|row| validate_row(&normalize_row(row)))
            .collect();

        let mut outcome = ImportOutcome::empty(rows.len());
        for (index, result) in validated.into_iter().enumerate() {
            let row = index + 1;
            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                let written = outcome.inserted.len() + outcome.updated.len();
                warn!("Import deadline passed before row {}; {} rows written", row, written);
                return Err(DeadlineExceeded { row, written });
            }
            match result
                .map_err(RowError::from)
                .and_then(|fields| self.upsert(&fields))
            {
                Ok(Upserted {
                    certificate,
                    created: true,
                }) => outcome.inserted.push(certificate.certificate_id),
                Ok(Upserted { certificate, .. }) => {
                    outcome.updated.push(certificate.certificate_id)
                }
                Err(err) => {
                    debug!("Row {} rejected: {}", row, err);
                    outcome.failed.push(RowFailure {
                        row,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            "Imported {} rows in {:.2?}: {} inserted, {} updated, {} failed",
            outcome.total,
            start.elapsed(),
            outcome.inserted.len(),
            outcome.updated.len(),
            outcome.failed.len()
        );
        Ok(outcome)
    }

    fn upsert(&self, fields: &CertificateFields) -> Result<Upserted, RowError> {
        Ok(self.store.find_one_and_update(fields)?)
    }
}

/// Every row of a sheet shares the header row, so the first one is enough.
fn warn_on_colliding_headers(rows: &[RawRow]) {
    let Some(first) = rows.first() else {
        return;
    };
    for (field, headers) in colliding_headers(first.headers()) {
        warn!(
            "Headers {:?} all map to {}; the right-most column is used",
            headers, field
        );
    }
}
