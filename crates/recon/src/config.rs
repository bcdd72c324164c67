use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classify::Classifier;
use crate::error::ReconError;
use crate::model::RecordStatus;
use crate::normalize::NormalizeMode;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub name: String,
    /// Target collection. May be left empty and supplied by the caller.
    #[serde(default)]
    pub collection: String,
    /// Leading sheet rows to skip (headers).
    #[serde(default)]
    pub header_rows: usize,
    #[serde(default)]
    pub normalize: NormalizeMode,
    #[serde(default)]
    pub fields: FieldNames,
    #[serde(default)]
    pub status: Option<StatusConfig>,
    #[serde(default)]
    pub mapping: ColumnMapping,
    #[serde(default)]
    pub schema: SchemaConfig,
}

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

/// Physical names of the fields the classifier reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub name: String,
    pub address: String,
    pub address_secondary: String,
    pub postal_code: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            name: "name".into(),
            address: "address".into(),
            address_secondary: "address_secondary".into(),
            postal_code: "postal_code".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Status labels
// ---------------------------------------------------------------------------

/// Writes the review status into a record field when present.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusConfig {
    pub field: String,
    #[serde(default = "default_created_label")]
    pub created: String,
    #[serde(default = "default_to_verify_label")]
    pub to_verify: String,
}

fn default_created_label() -> String {
    RecordStatus::Created.as_str().into()
}

fn default_to_verify_label() -> String {
    RecordStatus::ToVerify.as_str().into()
}

impl StatusConfig {
    pub fn label(&self, status: RecordStatus) -> &str {
        match status {
            RecordStatus::Created => &self.created,
            RecordStatus::ToVerify => &self.to_verify,
        }
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Column index (0-based) -> field name. Columns mapped to an empty name,
/// or to `null` in JSON, are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, Option<String>>")]
pub struct ColumnMapping {
    columns: BTreeMap<usize, String>,
}

impl TryFrom<BTreeMap<String, Option<String>>> for ColumnMapping {
    type Error = String;

    fn try_from(raw: BTreeMap<String, Option<String>>) -> Result<Self, Self::Error> {
        let mut columns = BTreeMap::new();
        for (key, field) in raw {
            let index: usize = key
                .trim()
                .parse()
                .map_err(|_| format!("column key '{key}' is not a column index"))?;
            if let Some(field) = field {
                let field = field.trim();
                if !field.is_empty() {
                    columns.insert(index, field.to_string());
                }
            }
        }
        Ok(Self { columns })
    }
}

impl ColumnMapping {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(i, f)| (i, f.into()))
                .filter(|(_, f)| !f.trim().is_empty())
                .collect(),
        }
    }

    /// Parse a JSON object such as `{"0": "name", "1": "address", "4": null}`.
    pub fn from_json(input: &str) -> Result<Self, ReconError> {
        serde_json::from_str(input).map_err(|e| ReconError::InvalidMapping(e.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns.iter().map(|(i, f)| (*i, f.as_str()))
    }

    pub fn maps_field(&self, field: &str) -> bool {
        self.columns.values().any(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Validation rules enforced by the persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub required: Vec<String>,
    /// Maximum length in characters.
    #[serde(default)]
    pub max_length: BTreeMap<String, usize>,
    #[serde(default)]
    pub patterns: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ImportConfig {
    /// Parse and validate.
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config = Self::parse_toml(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without validating, so callers can apply overrides first.
    pub fn parse_toml(input: &str) -> Result<Self, ReconError> {
        toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.collection.trim().is_empty() {
            return Err(ReconError::ConfigValidation("collection is required".into()));
        }

        if self.mapping.is_empty() {
            return Err(ReconError::ConfigValidation(
                "mapping must map at least one column".into(),
            ));
        }

        if !self.mapping.maps_field(&self.fields.name) {
            return Err(ReconError::ConfigValidation(format!(
                "mapping does not include the name field '{}'",
                self.fields.name
            )));
        }

        let names = [
            ("name", &self.fields.name),
            ("address", &self.fields.address),
            ("address_secondary", &self.fields.address_secondary),
            ("postal_code", &self.fields.postal_code),
        ];
        for (role, field) in names {
            if field.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!(
                    "fields.{role} must not be empty"
                )));
            }
        }

        if let Some(ref status) = self.status {
            if status.field.trim().is_empty() {
                return Err(ReconError::ConfigValidation(
                    "status.field must not be empty".into(),
                ));
            }
        }

        for (field, pattern) in &self.schema.patterns {
            regex::Regex::new(pattern).map_err(|e| {
                ReconError::ConfigValidation(format!("schema pattern for '{field}': {e}"))
            })?;
        }

        Ok(())
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.fields.clone(), self.normalize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
name = "Contacts 2026"
collection = "contacts"
header_rows = 1
normalize = "strict"

[fields]
name = "nom_prenom"
address = "adresse"
address_secondary = "adresse_2"
postal_code = "code_postal"

[status]
field = "statut"
created = "Fiche créée"
to_verify = "Fiche à vérifier"

[mapping]
0 = "nom_prenom"
1 = "adresse"
2 = "adresse_2"
3 = "code_postal"
4 = ""

[schema]
required = ["nom_prenom"]
max_length = { code_postal = 5 }
patterns = { code_postal = "^[0-9]{5}$" }
"#;

    #[test]
    fn parse_valid() {
        let config = ImportConfig::from_toml(VALID).unwrap();
        assert_eq!(config.name, "Contacts 2026");
        assert_eq!(config.collection, "contacts");
        assert_eq!(config.header_rows, 1);
        assert_eq!(config.normalize, NormalizeMode::Strict);
        assert_eq!(config.fields.postal_code, "code_postal");
        assert_eq!(config.mapping.len(), 4);
        assert_eq!(
            config.mapping.iter().collect::<Vec<_>>(),
            vec![(0, "nom_prenom"), (1, "adresse"), (2, "adresse_2"), (3, "code_postal")]
        );
        let status = config.status.as_ref().unwrap();
        assert_eq!(status.label(RecordStatus::ToVerify), "Fiche à vérifier");
        assert_eq!(config.schema.max_length["code_postal"], 5);
    }

    #[test]
    fn defaults() {
        let input = r#"
name = "Minimal"
collection = "people"

[mapping]
0 = "name"
"#;
        let config = ImportConfig::from_toml(input).unwrap();
        assert_eq!(config.header_rows, 0);
        assert_eq!(config.normalize, NormalizeMode::Basic);
        assert_eq!(config.fields, FieldNames::default());
        assert!(config.status.is_none());
        assert!(config.schema.required.is_empty());
    }

    #[test]
    fn status_labels_default_to_status_names() {
        let input = r#"
name = "Labels"
collection = "people"
[status]
field = "status"
[mapping]
0 = "name"
"#;
        let config = ImportConfig::from_toml(input).unwrap();
        let status = config.status.unwrap();
        assert_eq!(status.label(RecordStatus::Created), "created");
        assert_eq!(status.label(RecordStatus::ToVerify), "to_verify");
    }

    #[test]
    fn reject_missing_collection() {
        let input = r#"
name = "No collection"
[mapping]
0 = "name"
"#;
        let err = ImportConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("collection is required"));

        // Parses fine without validation, so the caller can fill it in.
        let mut config = ImportConfig::parse_toml(input).unwrap();
        config.collection = "people".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_unmapped_name_field() {
        let input = r#"
name = "Bad"
collection = "people"
[mapping]
0 = "address"
"#;
        let err = ImportConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn reject_empty_mapping() {
        let input = r#"
name = "Bad"
collection = "people"
"#;
        let err = ImportConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("at least one column"));
    }

    #[test]
    fn reject_non_numeric_column_key() {
        let input = r#"
name = "Bad"
collection = "people"
[mapping]
A = "name"
"#;
        let err = ImportConfig::from_toml(input).unwrap_err();
        assert!(matches!(err, ReconError::ConfigParse(_)));
        assert!(err.to_string().contains("not a column index"));
    }

    #[test]
    fn reject_bad_pattern() {
        let input = r#"
name = "Bad"
collection = "people"
[mapping]
0 = "name"
[schema]
patterns = { name = "([a-z" }
"#;
        let err = ImportConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("schema pattern for 'name'"));
    }

    #[test]
    fn reject_invalid_normalize_mode() {
        let input = r#"
name = "Bad"
collection = "people"
normalize = "fuzzy"
[mapping]
0 = "name"
"#;
        assert!(ImportConfig::from_toml(input).is_err());
    }

    #[test]
    fn mapping_from_json() {
        let mapping =
            ColumnMapping::from_json(r#"{"0": "nom_prenom", "2": null, "3": " ", "5": "code_postal"}"#)
                .unwrap();
        assert_eq!(
            mapping.iter().collect::<Vec<_>>(),
            vec![(0, "nom_prenom"), (5, "code_postal")]
        );
        assert!(mapping.maps_field("code_postal"));
        assert!(!mapping.maps_field("adresse"));
    }

    #[test]
    fn mapping_from_bad_json() {
        assert!(matches!(
            ColumnMapping::from_json("[1, 2]"),
            Err(ReconError::InvalidMapping(_))
        ));
        assert!(ColumnMapping::from_json(r#"{"x": "name"}"#).is_err());
    }
}
