use tracing::{debug, error, info, warn};

use crate::classify::Classifier;
use crate::config::{ImportConfig, StatusConfig};
use crate::error::ReconError;
use crate::index::CandidateIndex;
use crate::model::{
    Action, ImportError, ImportMeta, ImportReport, ImportResult, Record, RecordStatus, Row,
    RowOutcome, Verdict,
};
use crate::store::{RecordStore, StoreError};

/// Run one import per config. Seeds from `store`, reconciles `rows` in order.
pub fn run<S>(config: &ImportConfig, rows: Vec<Row>, store: &mut S) -> Result<ImportResult, ReconError>
where
    S: RecordStore + ?Sized,
{
    let mut reconciler = Reconciler::new(store, config.classifier())?;
    if let Some(ref status) = config.status {
        reconciler = reconciler.with_status_field(status.clone());
    }
    let report = reconciler.reconcile(rows);

    Ok(ImportResult {
        meta: ImportMeta {
            config_name: config.name.clone(),
            collection: config.collection.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        report,
    })
}

/// Reconciliation driver for a single run.
///
/// Owns the run's [`CandidateIndex`]. Rows are processed strictly in order:
/// a record created for row N is visible to the lookup of row N+1.
pub struct Reconciler<'s, S: RecordStore + ?Sized> {
    store: &'s mut S,
    classifier: Classifier,
    index: CandidateIndex,
    status_field: Option<StatusConfig>,
}

impl<'s, S: RecordStore + ?Sized> Reconciler<'s, S> {
    /// Seed the index from `store`. Fails the whole run if seeding fails.
    pub fn new(store: &'s mut S, classifier: Classifier) -> Result<Self, ReconError> {
        let existing = store.seed_all().map_err(ReconError::Seed)?;
        debug!(records = existing.len(), "seeding candidate index");

        let mut index = CandidateIndex::for_classifier(&classifier);
        index.seed(existing)?;

        Ok(Self {
            store,
            classifier,
            index,
            status_field: None,
        })
    }

    /// Also write the status label into `status.field` of each created record.
    pub fn with_status_field(mut self, status: StatusConfig) -> Self {
        self.status_field = Some(status);
        self
    }

    pub fn reconcile(mut self, rows: Vec<Row>) -> ImportReport {
        let mut report = ImportReport::default();

        for row in rows {
            match self.process(row) {
                Ok(outcome) => report.push_outcome(outcome),
                Err(err) => report.push_error(err),
            }
        }

        let s = &report.summary;
        info!(
            created = s.created,
            to_verify = s.to_verify,
            ignored = s.ignored,
            failed = s.failed,
            "import finished"
        );
        report
    }

    fn process(&mut self, row: Row) -> Result<RowOutcome, ImportError> {
        let Row { number, mut record } = row;
        let name_field = &self.classifier.fields().name;

        if self.classifier.name_key(&record).is_empty() {
            warn!(row = number, field = %name_field, "row has no name, skipped");
            return Err(ImportError::missing_name(number, name_field));
        }

        let status = match self.decide(number, &record) {
            Decision::Duplicate(outcome) => return Ok(outcome),
            Decision::Import(status) => status,
        };

        record.status = Some(status);
        if let Some(ref labels) = self.status_field {
            record.set(labels.field.clone(), labels.label(status));
        }

        match self.store.create_one(&record) {
            Ok(id) => {
                debug!(row = number, id = %id, status = %status, "record created");
                record.id = Some(id.clone());
                self.index.append(record);
                Ok(RowOutcome {
                    row: number,
                    action: Action::from(status),
                    id: Some(id),
                })
            }
            Err(err) => Err(self.store_failure(number, &record, &err)),
        }
    }

    /// EXACT over the whole candidate list first, then PARTIAL.
    fn decide(&self, number: usize, record: &Record) -> Decision {
        let name = record.get(&self.classifier.fields().name).unwrap_or("");
        let candidates = self.index.lookup(name);

        if let Some(existing) = candidates
            .iter()
            .find(|c| self.classifier.classify(c, record) == Verdict::Exact)
        {
            debug!(row = number, existing = ?existing.id, "exact duplicate, ignored");
            return Decision::Duplicate(RowOutcome {
                row: number,
                action: Action::Ignored,
                id: existing.id.clone(),
            });
        }

        match candidates
            .iter()
            .find(|c| self.classifier.classify(c, record) == Verdict::Partial)
        {
            Some(existing) => {
                let evidence = self.classifier.concordance(existing, record);
                debug!(
                    row = number,
                    existing = ?existing.id,
                    address = evidence.address,
                    postal = evidence.postal,
                    "partial match, flagged for review"
                );
                Decision::Import(RecordStatus::ToVerify)
            }
            None => Decision::Import(RecordStatus::Created),
        }
    }

    fn store_failure(&self, number: usize, record: &Record, err: &StoreError) -> ImportError {
        let detail = err.detail(record);
        let code = err.code().to_string();
        error!(row = number, code = %code, "row {number}: {detail}");
        ImportError {
            row: number,
            error: detail,
            code,
            kind: err.kind(),
        }
    }
}

enum Decision {
    Duplicate(RowOutcome),
    Import(RecordStatus),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldNames;
    use crate::model::{ErrorKind, RecordId};
    use crate::normalize::NormalizeMode;
    use crate::store::FieldViolation;

    /// Vec-backed store that can be told to reject specific names.
    #[derive(Default)]
    struct TestStore {
        existing: Vec<Record>,
        created: Vec<Record>,
        reject: Vec<&'static str>,
        seed_calls: usize,
    }

    impl RecordStore for TestStore {
        fn seed_all(&mut self) -> Result<Vec<Record>, StoreError> {
            self.seed_calls += 1;
            Ok(self.existing.clone())
        }

        fn create_one(&mut self, record: &Record) -> Result<RecordId, StoreError> {
            if let Some(name) = record.get("name") {
                if self.reject.iter().any(|r| *r == name) {
                    return Err(StoreError::Validation(vec![FieldViolation::new(
                        "name",
                        "pattern",
                        "FAILED_VALIDATION",
                    )]));
                }
            }
            self.created.push(record.clone());
            Ok(RecordId::from(format!("new-{}", self.created.len())))
        }
    }

    fn row(number: usize, name: &str, address: &str, postal: &str) -> Row {
        let mut record = Record::from_pairs([("name", name)]);
        if !address.is_empty() {
            record.set("address", address);
        }
        if !postal.is_empty() {
            record.set("postal_code", postal);
        }
        Row { number, record }
    }

    fn actions(report: &ImportReport) -> Vec<(usize, Action, Option<String>)> {
        report
            .outcomes
            .iter()
            .map(|o| (o.row, o.action, o.id.as_ref().map(|id| id.0.clone())))
            .collect()
    }

    #[test]
    fn within_batch_duplicates_are_seen() {
        let mut store = TestStore::default();
        let report = Reconciler::new(&mut store, Classifier::default())
            .unwrap()
            .reconcile(vec![
                row(1, "Jean Dupont", "12 Rue de Paris", "75001"),
                row(2, "Jean Dupont", "12 Rue de Paris", "75001"),
                row(3, "Jean Dupont", "5 Avenue Victor Hugo", "75001"),
            ]);

        assert_eq!(
            actions(&report),
            vec![
                (1, Action::Created, Some("new-1".into())),
                (2, Action::Ignored, Some("new-1".into())),
                (3, Action::ToVerify, Some("new-2".into())),
            ]
        );
        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.ignored, 1);
        assert_eq!(report.summary.to_verify, 1);
        assert_eq!(report.summary.failed, 0);
        assert_eq!(store.created.len(), 2);
        assert_eq!(store.created[0].status, Some(RecordStatus::Created));
        assert_eq!(store.created[1].status, Some(RecordStatus::ToVerify));
        assert_eq!(store.seed_calls, 1);
    }

    #[test]
    fn seeded_records_are_candidates() {
        let mut store = TestStore {
            existing: vec![Record::from_pairs([
                ("name", "Marie Curie"),
                ("address", "1 Rue Pierre et Marie Curie"),
                ("postal_code", "75005"),
            ])
            .with_id("42")],
            ..Default::default()
        };
        let report = Reconciler::new(&mut store, Classifier::default())
            .unwrap()
            .reconcile(vec![
                row(1, "marie  curie", "1 rue Pierre et Marie Curie", "75005"),
                row(2, "Marie Curie", "", "75005"),
            ]);
        assert_eq!(
            actions(&report),
            vec![
                (1, Action::Ignored, Some("42".into())),
                (2, Action::ToVerify, Some("new-1".into())),
            ]
        );
    }

    #[test]
    fn exact_wins_over_earlier_partial() {
        let mut store = TestStore {
            existing: vec![
                Record::from_pairs([
                    ("name", "Jean Dupont"),
                    ("address", "5 Avenue Victor Hugo"),
                    ("postal_code", "75001"),
                ])
                .with_id("partial"),
                Record::from_pairs([
                    ("name", "Jean Dupont"),
                    ("address", "12 Rue de Paris"),
                    ("postal_code", "75001"),
                ])
                .with_id("exact"),
            ],
            ..Default::default()
        };
        let report = Reconciler::new(&mut store, Classifier::default())
            .unwrap()
            .reconcile(vec![row(7, "Jean Dupont", "12 Rue de Paris", "75001")]);
        assert_eq!(actions(&report), vec![(7, Action::Ignored, Some("exact".into()))]);
        assert!(store.created.is_empty());
    }

    #[test]
    fn missing_name_is_rejected_before_matching() {
        let mut store = TestStore::default();
        let report = Reconciler::new(&mut store, Classifier::default())
            .unwrap()
            .reconcile(vec![
                row(1, "  ", "12 Rue de Paris", "75001"),
                Row {
                    number: 2,
                    record: Record::from_pairs([("address", "12 Rue de Paris")]),
                },
                row(3, "Jean Dupont", "12 Rue de Paris", "75001"),
            ]);

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].row, 1);
        assert_eq!(report.errors[0].code, "MISSING_NAME");
        assert_eq!(report.errors[1].kind, ErrorKind::MissingName);
        assert_eq!(report.summary.failed, 2);
        assert_eq!(report.summary.created, 1);
        assert_eq!(report.summary.ignored + report.summary.to_verify, 0);
        assert_eq!(store.created.len(), 1);
    }

    #[test]
    fn persistence_failure_does_not_stop_the_batch() {
        let mut store = TestStore {
            reject: vec!["Bad Row"],
            ..Default::default()
        };
        let report = Reconciler::new(&mut store, Classifier::default())
            .unwrap()
            .reconcile(vec![
                row(1, "Bad Row", "12 Rue de Paris", "75001"),
                row(2, "Bad Row", "12 Rue de Paris", "75001"),
                row(3, "Jean Dupont", "", ""),
            ]);

        // The failed record never reached the index, so row 2 is not a duplicate.
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].row, 1);
        assert_eq!(report.errors[1].row, 2);
        assert_eq!(report.errors[0].code, "FAILED_VALIDATION");
        assert_eq!(report.errors[0].kind, ErrorKind::PersistenceValidation);
        assert_eq!(
            report.errors[0].error,
            "Field \"name\": pattern (FAILED_VALIDATION) | value: \"Bad Row\""
        );
        assert_eq!(actions(&report), vec![(3, Action::Created, Some("new-1".into()))]);
        assert_eq!(report.status(), crate::model::BatchStatus::MultiStatus);
    }

    #[test]
    fn status_label_written_to_field() {
        let mut store = TestStore::default();
        let report = Reconciler::new(&mut store, Classifier::default())
            .unwrap()
            .with_status_field(StatusConfig {
                field: "statut".into(),
                created: "Fiche créée".into(),
                to_verify: "Fiche à vérifier".into(),
            })
            .reconcile(vec![
                row(1, "Jean Dupont", "12 Rue de Paris", "75001"),
                row(2, "Jean Dupont", "", "75001"),
            ]);
        assert_eq!(report.summary.processed(), 2);
        assert_eq!(store.created[0].get("statut"), Some("Fiche créée"));
        assert_eq!(store.created[1].get("statut"), Some("Fiche à vérifier"));
    }

    #[test]
    fn name_only_matches_create_distinct_records() {
        let mut store = TestStore::default();
        let report = Reconciler::new(&mut store, Classifier::default())
            .unwrap()
            .reconcile(vec![row(1, "Jean Dupont", "", ""), row(2, "Jean Dupont", "", "")]);
        assert_eq!(report.summary.created, 2);
        assert_eq!(report.status(), crate::model::BatchStatus::Success);
    }

    #[test]
    fn seed_failure_aborts() {
        struct Broken;
        impl RecordStore for Broken {
            fn seed_all(&mut self) -> Result<Vec<Record>, StoreError> {
                Err(StoreError::backend("SQLITE_CANTOPEN", "unable to open database file"))
            }
            fn create_one(&mut self, _: &Record) -> Result<RecordId, StoreError> {
                unreachable!("no row may be processed after a failed seed")
            }
        }
        let err = Reconciler::new(&mut Broken, Classifier::default()).err().unwrap();
        assert!(matches!(err, ReconError::Seed(_)));
        assert!(err.to_string().contains("unable to open database file"));
    }

    #[test]
    fn run_uses_config_fields_and_mode() {
        let config = ImportConfig::from_toml(
            r#"
name = "French contacts"
collection = "contacts"
normalize = "strict"
[fields]
name = "nom_prenom"
address = "adresse"
address_secondary = "adresse_2"
postal_code = "code_postal"
[status]
field = "statut"
[mapping]
0 = "nom_prenom"
"#,
        )
        .unwrap();
        assert_eq!(config.fields, FieldNames {
            name: "nom_prenom".into(),
            address: "adresse".into(),
            address_secondary: "adresse_2".into(),
            postal_code: "code_postal".into(),
        });
        assert_eq!(config.normalize, NormalizeMode::Strict);

        let rows = vec![
            Row {
                number: 2,
                record: Record::from_pairs([
                    ("nom_prenom", "Jean-Pierre O'Brien"),
                    ("adresse", "12, rue de Paris"),
                    ("code_postal", "75001"),
                ]),
            },
            Row {
                number: 3,
                record: Record::from_pairs([
                    ("nom_prenom", "Jean Pierre O Brien"),
                    ("adresse_2", "12 Rue de Paris"),
                    ("code_postal", "75001"),
                ]),
            },
        ];
        let mut store = TestStore::default();
        let result = run(&config, rows, &mut store).unwrap();
        assert_eq!(result.meta.collection, "contacts");
        assert_eq!(result.report.summary.created, 1);
        assert_eq!(result.report.summary.ignored, 1);
        assert_eq!(store.created[0].get("statut"), Some("created"));
    }
}
