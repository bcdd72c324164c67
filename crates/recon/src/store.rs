use serde::Serialize;
use thiserror::Error;

use crate::model::{ErrorKind, Record, RecordId};

/// Persistence collaborator for one reconciliation run.
///
/// `seed_all` is called exactly once, before the first row. `create_one` is
/// called once per non-duplicate row, in row order, and must return before
/// the next row is classified.
pub trait RecordStore {
    fn seed_all(&mut self) -> Result<Vec<Record>, StoreError>;

    fn create_one(&mut self, record: &Record) -> Result<RecordId, StoreError>;
}

/// One rejected field, as reported by the collaborator's schema check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    /// Violation type, e.g. `required`, `max_length`, `pattern`.
    pub kind: String,
    pub code: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, kind: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: kind.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The record violates the collection schema.
    #[error("validation failed ({} field violation(s))", .0.len())]
    Validation(Vec<FieldViolation>),

    /// Any other backend failure.
    #[error("{message}")]
    Backend { code: Option<String>, message: String },
}

impl StoreError {
    pub fn backend(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::PersistenceValidation,
            Self::Backend { .. } => ErrorKind::Unknown,
        }
    }

    /// Code of the first violation, else the backend code, else `UNKNOWN`.
    pub fn code(&self) -> &str {
        match self {
            Self::Validation(violations) => violations
                .first()
                .map(|v| v.code.as_str())
                .unwrap_or("UNKNOWN"),
            Self::Backend { code, .. } => code.as_deref().unwrap_or("UNKNOWN"),
        }
    }

    /// Human-readable detail, quoting the offending values from `record`.
    pub fn detail(&self, record: &Record) -> String {
        match self {
            Self::Validation(violations) if violations.is_empty() => "validation failed".into(),
            Self::Validation(violations) => violations
                .iter()
                .map(|v| {
                    let mut line = format!("Field \"{}\": {} ({})", v.field, v.kind, v.code);
                    if let Some(value) = record.get(&v.field) {
                        line.push_str(&format!(" | value: \"{value}\""));
                    }
                    line
                })
                .collect::<Vec<_>>()
                .join("; "),
            Self::Backend { message, .. } if message.is_empty() => "unknown error".into(),
            Self::Backend { message, .. } => message.clone(),
        }
    }
}
