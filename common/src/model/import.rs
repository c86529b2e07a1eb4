use serde::{Deserialize, Serialize};

/// The result of one import batch.
///
/// Every input row is accounted for exactly once: its certificate ID lands in
/// `inserted` or `updated`, or its row number lands in `failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Number of rows in the batch.
    pub total: usize,
    /// Certificate IDs written for the first time, in row order.
    pub inserted: Vec<String>,
    /// Certificate IDs that replaced an existing record, in row order.
    pub updated: Vec<String>,
    /// Rejected rows, ordered by row number.
    pub failed: Vec<RowFailure>,
}

/// A row that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based position of the row among the parsed data rows.
    pub row: usize,
    pub error: String,
}

impl ImportOutcome {
    pub fn empty(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Rows that received an outcome so far.
    pub fn accounted(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.failed.len()
    }
}
