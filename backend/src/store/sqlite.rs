use super::{CertificateStore, StoreError, Upserted};
use certs_common::model::certificate::{Certificate, CertificateFields};
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS certificates (
        certificate_id   TEXT PRIMARY KEY NOT NULL,
        student_name     TEXT NOT NULL,
        domain           TEXT NOT NULL,
        internship_start TEXT NOT NULL,
        internship_end   TEXT NOT NULL,
        issue_date       TEXT NOT NULL,
        created_at       TEXT NOT NULL,
        updated_at       TEXT NOT NULL
    );
";

const SELECT_BY_ID: &str = "
    SELECT certificate_id, student_name, domain, internship_start, internship_end,
           issue_date, created_at, updated_at
    FROM certificates
    WHERE certificate_id = ?1
";

const UPSERT: &str = "
    INSERT INTO certificates (
        certificate_id, student_name, domain, internship_start, internship_end,
        issue_date, created_at, updated_at
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
    ON CONFLICT(certificate_id) DO UPDATE SET
        student_name     = excluded.student_name,
        domain           = excluded.domain,
        internship_start = excluded.internship_start,
        internship_end   = excluded.internship_end,
        issue_date       = excluded.issue_date,
        updated_at       = excluded.updated_at
    RETURNING certificate_id, student_name, domain, internship_start, internship_end,
              issue_date, created_at, updated_at
";

/// SQLite-backed certificate store.
///
/// The handle owns its connection; construct it once at startup and share it
/// behind an `Arc`.
pub struct SqliteCertificateStore {
    conn: Mutex<Connection>,
}

impl SqliteCertificateStore {
    /// Opens (or creates) the database file and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        // Other processes may hold the write lock briefly
        conn.busy_timeout(Duration::from_secs(5))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))
    }
}

fn certificate_from_row(row: &Row<'_>) -> rusqlite::Result<Certificate> {
    Ok(Certificate {
        certificate_id: row.get(0)?,
        student_name: row.get(1)?,
        domain: row.get(2)?,
        internship_start: row.get(3)?,
        internship_end: row.get(4)?,
        issue_date: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl CertificateStore for SqliteCertificateStore {
    fn find_one(&self, certificate_id: &str) -> Result<Option<Certificate>, StoreError> {
        let conn = self.connection()?;
        let certificate = conn
            .query_row(SELECT_BY_ID, params![certificate_id], certificate_from_row)
            .optional()?;
        Ok(certificate)
    }

    fn find_one_and_update(&self, fields: &CertificateFields) -> Result<Upserted, StoreError> {
        let mut conn = self.connection()?;
        // IMMEDIATE takes the write lock up front, so the existence probe and the
        // upsert see the same state.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existed: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM certificates WHERE certificate_id = ?1)",
            params![fields.certificate_id],
            |row| row.get(0),
        )?;

        let certificate = tx.query_row(
            UPSERT,
            params![
                fields.certificate_id,
                fields.student_name,
                fields.domain,
                fields.internship_start,
                fields.internship_end,
                fields.issue_date,
                Utc::now(),
            ],
            certificate_from_row,
        )?;
        tx.commit()?;

        debug!(
            "Upserted certificate {} ({})",
            certificate.certificate_id,
            if existed { "updated" } else { "inserted" }
        );

        Ok(Upserted {
            certificate,
            created: !existed,
        })
    }
}
