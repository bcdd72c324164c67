//! `rolodex-recon`: duplicate reconciliation engine for contact imports.
//!
//! Pure engine crate: receives pre-extracted rows and a persistence
//! collaborator, returns per-row outcomes. No CLI or file IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod model;
pub mod normalize;
pub mod rows;
pub mod store;

pub use classify::{classify, Classifier, Concordance};
pub use config::{ColumnMapping, FieldNames, ImportConfig, SchemaConfig, StatusConfig};
pub use engine::{run, Reconciler};
pub use error::ReconError;
pub use index::CandidateIndex;
pub use model::{
    Action, BatchStatus, ErrorKind, ImportError, ImportMeta, ImportReport, ImportResult,
    ImportSummary, Record, RecordId, RecordStatus, Row, RowOutcome, Verdict,
};
pub use normalize::{normalize, NormalizeMode, Normalizer};
pub use rows::rows_from_grid;
pub use store::{FieldViolation, RecordStore, StoreError};
