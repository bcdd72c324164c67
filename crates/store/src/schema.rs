use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use rolodex_recon::{FieldViolation, Record, SchemaConfig};

/// Code reported for every schema violation.
pub const FAILED_VALIDATION: &str = "FAILED_VALIDATION";

/// Compiled field rules for one collection.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    required: BTreeSet<String>,
    max_length: BTreeMap<String, usize>,
    patterns: BTreeMap<String, Regex>,
}

impl Schema {
    /// A schema that accepts every record.
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SchemaConfig) -> Result<Self, regex::Error> {
        let patterns = config
            .patterns
            .iter()
            .map(|(field, pattern)| Ok((field.clone(), Regex::new(pattern)?)))
            .collect::<Result<_, regex::Error>>()?;

        Ok(Self {
            required: config.required.iter().cloned().collect(),
            max_length: config.max_length.clone(),
            patterns,
        })
    }

    /// Check `record` against every rule. Violations are returned in field
    /// order; a missing required field is not checked further.
    pub fn validate(&self, record: &Record) -> Result<(), Vec<FieldViolation>> {
        let fields: BTreeSet<&str> = self
            .required
            .iter()
            .chain(self.max_length.keys())
            .chain(self.patterns.keys())
            .map(String::as_str)
            .collect();

        let mut violations = Vec::new();
        for field in fields {
            let value = record.get(field).filter(|v| !v.trim().is_empty());

            let Some(value) = value else {
                if self.required.contains(field) {
                    violations.push(FieldViolation::new(field, "required", FAILED_VALIDATION));
                }
                continue;
            };

            if let Some(&max) = self.max_length.get(field) {
                if value.chars().count() > max {
                    violations.push(FieldViolation::new(field, "max_length", FAILED_VALIDATION));
                }
            }

            if let Some(re) = self.patterns.get(field) {
                if !re.is_match(value) {
                    violations.push(FieldViolation::new(field, "pattern", FAILED_VALIDATION));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}
