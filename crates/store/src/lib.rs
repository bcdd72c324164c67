//! `rolodex-store`: persistence collaborators for the reconciliation engine.
//!
//! Both stores implement [`rolodex_recon::RecordStore`] and enforce the
//! collection [`Schema`] before accepting a record.

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use schema::{Schema, FAILED_VALIDATION};
pub use sqlite::SqliteStore;
