use thiserror::Error;

use crate::store::StoreError;

/// Batch-level failures. Any of these aborts a run before the first row is
/// classified; per-row failures are reported as [`crate::ImportError`] instead.
#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// Config validation error (empty mapping, unmapped name field, bad pattern, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),

    /// Column mapping could not be parsed.
    #[error("invalid mapping: {0}")]
    InvalidMapping(String),

    /// `seed` was called on an index that already holds records.
    #[error("candidate index already seeded")]
    IndexAlreadySeeded,

    /// The persistence collaborator failed to return existing records.
    #[error("cannot load existing records: {0}")]
    Seed(#[source] StoreError),
}
