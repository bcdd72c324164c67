use serde::Serialize;

use crate::config::FieldNames;
use crate::model::{Record, Verdict};
use crate::normalize::{NormalizeMode, Normalizer};

/// Field-level agreement between an existing record and a candidate.
///
/// When the names disagree nothing else is compared, so `address` and
/// `postal` are always false alongside `name == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Concordance {
    pub name: bool,
    pub address: bool,
    pub postal: bool,
}

impl Concordance {
    pub fn verdict(&self) -> Verdict {
        if !self.name {
            return Verdict::None;
        }
        if self.address && self.postal {
            Verdict::Exact
        } else if self.address || self.postal {
            Verdict::Partial
        } else {
            Verdict::None
        }
    }
}

/// Multi-field concordance classifier.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    fields: FieldNames,
    normalizer: Normalizer,
}

impl Classifier {
    pub fn new(fields: FieldNames, mode: NormalizeMode) -> Self {
        Self {
            fields,
            normalizer: Normalizer::new(mode),
        }
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    pub fn normalizer(&self) -> Normalizer {
        self.normalizer
    }

    /// Normalized join key of a record (its name).
    pub fn name_key(&self, record: &Record) -> String {
        self.normalizer.normalize(record.get(&self.fields.name))
    }

    pub fn concordance(&self, existing: &Record, candidate: &Record) -> Concordance {
        if self.name_key(existing) != self.name_key(candidate) {
            return Concordance {
                name: false,
                address: false,
                postal: false,
            };
        }

        let existing_addresses = self.addresses(existing);
        let candidate_addresses = self.addresses(candidate);
        let address = existing_addresses
            .iter()
            .any(|a| candidate_addresses.contains(a));

        let existing_postal = self.postal_code(existing);
        let postal = !existing_postal.is_empty() && existing_postal == self.postal_code(candidate);

        Concordance {
            name: true,
            address,
            postal,
        }
    }

    pub fn classify(&self, existing: &Record, candidate: &Record) -> Verdict {
        self.concordance(existing, candidate).verdict()
    }

    /// Normalized, non-empty address lines. At most two entries.
    fn addresses(&self, record: &Record) -> Vec<String> {
        [&self.fields.address, &self.fields.address_secondary]
            .into_iter()
            .map(|field| self.normalizer.normalize(record.get(field)))
            .filter(|a| !a.is_empty())
            .collect()
    }

    fn postal_code(&self, record: &Record) -> String {
        self.normalizer.normalize(record.get(&self.fields.postal_code))
    }
}

/// Classify with default field names and basic normalization.
pub fn classify(existing: &Record, candidate: &Record) -> Verdict {
    Classifier::default().classify(existing, candidate)
}
