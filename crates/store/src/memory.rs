use rolodex_recon::{Record, RecordId, RecordStore, StoreError};
use tracing::{debug, warn};

use crate::schema::Schema;

/// Vec-backed store. Ids are sequential integers that continue after the
/// highest numeric id among the seed records.
#[derive(Debug, Default)]
pub struct MemoryStore {
    schema: Schema,
    seeded: Vec<Record>,
    created: Vec<Record>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new(schema: Schema) -> Self {
        Self::with_records(schema, Vec::new())
    }

    pub fn with_records(schema: Schema, records: Vec<Record>) -> Self {
        let max_id = records
            .iter()
            .filter_map(|r| r.id.as_ref())
            .filter_map(|id| id.0.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            schema,
            seeded: records,
            created: Vec::new(),
            next_id: max_id + 1,
        }
    }

    /// Records accepted by `create_one`, in insertion order, ids assigned.
    pub fn created(&self) -> &[Record] {
        &self.created
    }

    pub fn len(&self) -> usize {
        self.seeded.len() + self.created.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for MemoryStore {
    fn seed_all(&mut self) -> Result<Vec<Record>, StoreError> {
        debug!(records = self.len(), "memory store seed");
        Ok(self.seeded.iter().chain(&self.created).cloned().collect())
    }

    fn create_one(&mut self, record: &Record) -> Result<RecordId, StoreError> {
        if let Err(violations) = self.schema.validate(record) {
            warn!(violations = violations.len(), "record rejected by schema");
            return Err(StoreError::Validation(violations));
        }

        let id = RecordId::from(self.next_id);
        self.next_id += 1;

        let mut stored = record.clone();
        stored.id = Some(id.clone());
        self.created.push(stored);

        debug!(id = %id, "memory store insert");
        Ok(id)
    }
}
