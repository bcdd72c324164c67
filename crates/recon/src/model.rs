use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Opaque identifier handed out by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Review status stamped on every imported record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Created,
    ToVerify,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ToVerify => "to_verify",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "to_verify" => Some(Self::ToVerify),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact-like entity: field name -> trimmed string value.
///
/// Only the name / address / postal code fields (see [`crate::FieldNames`])
/// take part in reconciliation. Every other field is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: None,
            status: None,
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn with_id(mut self, id: impl Into<RecordId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }
}

/// One extracted spreadsheet row. `number` is the 1-based sheet row and is
/// only used for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub number: usize,
    pub record: Record,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Same entity, already represented. Do not import.
    Exact,
    /// Possibly the same entity. Import, flagged for review.
    Partial,
    /// Distinct entity.
    None,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "EXACT"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::None => write!(f, "NONE"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes + errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Ignored,
    Created,
    ToVerify,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ignored => write!(f, "ignored"),
            Self::Created => write!(f, "created"),
            Self::ToVerify => write!(f, "toVerify"),
        }
    }
}

impl From<RecordStatus> for Action {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Created => Self::Created,
            RecordStatus::ToVerify => Self::ToVerify,
        }
    }
}

/// Terminal state of a row that did not fail.
///
/// For `Ignored`, `id` references the existing record the row duplicates.
/// Otherwise it is the identifier of the newly created record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    pub row: usize,
    pub action: Action,
    pub id: Option<RecordId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    MissingName,
    PersistenceValidation,
    Unknown,
}

/// A row that ended in the FAILED state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportError {
    pub row: usize,
    pub error: String,
    pub code: String,
    pub kind: ErrorKind,
}

impl ImportError {
    pub fn missing_name(row: usize, name_field: &str) -> Self {
        Self {
            row,
            error: format!("missing value for name field \"{name_field}\""),
            code: "MISSING_NAME".into(),
            kind: ErrorKind::MissingName,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub created: usize,
    pub to_verify: usize,
    pub ignored: usize,
    pub failed: usize,
}

impl ImportSummary {
    /// Rows that reached a terminal state, failed ones included.
    pub fn processed(&self) -> usize {
        self.created + self.to_verify + self.ignored + self.failed
    }
}

/// Success vs. multi-status: any failed row makes the batch multi-status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Success,
    MultiStatus,
}

/// Everything one reconciliation run produced, in row order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub outcomes: Vec<RowOutcome>,
    pub errors: Vec<ImportError>,
}

impl ImportReport {
    pub fn push_outcome(&mut self, outcome: RowOutcome) {
        match outcome.action {
            Action::Ignored => self.summary.ignored += 1,
            Action::Created => self.summary.created += 1,
            Action::ToVerify => self.summary.to_verify += 1,
        }
        self.outcomes.push(outcome);
    }

    pub fn push_error(&mut self, error: ImportError) {
        self.summary.failed += 1;
        self.errors.push(error);
    }

    pub fn status(&self) -> BatchStatus {
        if self.errors.is_empty() {
            BatchStatus::Success
        } else {
            BatchStatus::MultiStatus
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportMeta {
    pub config_name: String,
    pub collection: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    pub meta: ImportMeta,
    #[serde(flatten)]
    pub report: ImportReport,
}
