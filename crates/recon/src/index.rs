use std::collections::HashMap;

use crate::classify::Classifier;
use crate::error::ReconError;
use crate::model::Record;
use crate::normalize::Normalizer;

/// Run-scoped, append-only set of known records, keyed by normalized name.
///
/// Seeded once from the store, then extended with every record the run
/// creates. Lookups return records in insertion order: seeded records first,
/// then appended ones.
#[derive(Debug)]
pub struct CandidateIndex {
    name_field: String,
    normalizer: Normalizer,
    records: Vec<Record>,
    by_key: HashMap<String, Vec<usize>>,
    seeded: bool,
}

impl CandidateIndex {
    pub fn new(name_field: impl Into<String>, normalizer: Normalizer) -> Self {
        Self {
            name_field: name_field.into(),
            normalizer,
            records: Vec::new(),
            by_key: HashMap::new(),
            seeded: false,
        }
    }

    /// Index keyed the same way the classifier compares names.
    pub fn for_classifier(classifier: &Classifier) -> Self {
        Self::new(classifier.fields().name.clone(), classifier.normalizer())
    }

    /// Load previously persisted records. Must be the first mutation.
    pub fn seed<I>(&mut self, records: I) -> Result<(), ReconError>
    where
        I: IntoIterator<Item = Record>,
    {
        if self.seeded || !self.records.is_empty() {
            return Err(ReconError::IndexAlreadySeeded);
        }
        self.seeded = true;
        for record in records {
            self.insert(record);
        }
        Ok(())
    }

    /// All records whose normalized name equals `normalize(name)`.
    pub fn lookup(&self, name: &str) -> Vec<&Record> {
        let key = self.normalizer.normalize(Some(name));
        self.by_key
            .get(&key)
            .map(|positions| positions.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Make `record` visible to every later lookup.
    pub fn append(&mut self, record: Record) {
        self.insert(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: Record) {
        let key = self.normalizer.normalize(record.get(&self.name_field));
        let position = self.records.len();
        self.records.push(record);
        self.by_key.entry(key).or_default().push(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NormalizeMode;

    fn named(name: &str, id: i64) -> Record {
        Record::from_pairs([("name", name)]).with_id(id)
    }

    fn ids(found: &[&Record]) -> Vec<String> {
        found
            .iter()
            .map(|r| r.id.as_ref().map(|id| id.0.clone()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn lookup_by_normalized_name() {
        let mut index = CandidateIndex::new("name", Normalizer::default());
        index
            .seed(vec![named("Jean Dupont", 1), named("Marie Curie", 2), named(" JEAN  DUPONT", 3)])
            .unwrap();

        assert_eq!(ids(&index.lookup("jean dupont")), vec!["1", "3"]);
        assert_eq!(ids(&index.lookup("Marie   Curie ")), vec!["2"]);
        assert!(index.lookup("Pierre Curie").is_empty());
    }

    #[test]
    fn appended_records_are_visible_after_seeded_ones() {
        let mut index = CandidateIndex::new("name", Normalizer::default());
        index.seed(vec![named("Jean Dupont", 1)]).unwrap();
        assert_eq!(index.lookup("Jean Dupont").len(), 1);

        index.append(named("Jean Dupont", 10));
        index.append(named("Marie Curie", 11));
        index.append(named("jean dupont", 12));

        assert_eq!(ids(&index.lookup("Jean Dupont")), vec!["1", "10", "12"]);
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn seed_twice_is_rejected() {
        let mut index = CandidateIndex::new("name", Normalizer::default());
        index.seed(Vec::new()).unwrap();
        assert!(matches!(
            index.seed(vec![named("Jean Dupont", 1)]),
            Err(ReconError::IndexAlreadySeeded)
        ));
    }

    #[test]
    fn seed_after_append_is_rejected() {
        let mut index = CandidateIndex::new("name", Normalizer::default());
        index.append(named("Jean Dupont", 1));
        assert!(index.seed(Vec::new()).is_err());
    }

    #[test]
    fn strict_keys_merge_punctuation() {
        let mut index = CandidateIndex::new("name", Normalizer::new(NormalizeMode::Strict));
        index.seed(vec![named("Jean-Pierre O'Brien", 1)]).unwrap();
        assert_eq!(ids(&index.lookup("jean pierre o brien")), vec!["1"]);
    }

    #[test]
    fn custom_name_field() {
        let mut index = CandidateIndex::new("nom_prenom", Normalizer::default());
        index
            .seed(vec![Record::from_pairs([("nom_prenom", "Jean Dupont")]).with_id(7_i64)])
            .unwrap();
        assert_eq!(ids(&index.lookup("jean dupont")), vec!["7"]);
    }
}
