//! Localized user-facing messages for `rolodex import`.
//!
//! Catalogs exist for `en-US`, `fr-FR` and `tr-TR`. Any other language
//! falls back to `en-US`.

use rolodex_recon::ImportSummary;

pub const DEFAULT_LANG: &str = "en-US";

#[derive(Debug, PartialEq, Eq)]
pub struct Catalog {
    pub lang: &'static str,
    pub missing_file: &'static str,
    pub missing_collection: &'static str,
    pub missing_mapping: &'static str,
    pub empty_file: &'static str,
    pub no_valid_items: &'static str,
    /// Template with an `{error}` placeholder.
    pub internal_error: &'static str,
    pub processed_items_prefix: &'static str,
    pub created: &'static str,
    pub to_verify: &'static str,
    pub ignored: &'static str,
    pub failed: &'static str,
    pub none: &'static str,
}

pub static EN_US: Catalog = Catalog {
    lang: "en-US",
    missing_file: "Missing spreadsheet file.",
    missing_collection: "Missing target collection.",
    missing_mapping: "Missing mapping.",
    empty_file: "Empty spreadsheet file.",
    no_valid_items: "No valid items to import. Check your mapping.",
    internal_error: "Internal error during spreadsheet import: {error}",
    processed_items_prefix: "items processed:",
    created: "created",
    to_verify: "to verify",
    ignored: "ignored",
    failed: "errors",
    none: "no changes",
};

pub static FR_FR: Catalog = Catalog {
    lang: "fr-FR",
    missing_file: "Fichier tableur manquant.",
    missing_collection: "Collection cible manquante.",
    missing_mapping: "Mapping manquant.",
    empty_file: "Fichier tableur vide.",
    no_valid_items: "Aucun élément valide à importer. Vérifiez le mapping.",
    internal_error: "Erreur interne lors de l'import du tableur : {error}",
    processed_items_prefix: "éléments traités :",
    created: "Fiches créées",
    to_verify: "Fiches à vérifier",
    ignored: "Ignorées",
    failed: "erreurs",
    none: "aucun changement",
};

pub static TR_TR: Catalog = Catalog {
    lang: "tr-TR",
    missing_file: "Tablo dosyası eksik.",
    missing_collection: "Hedef koleksiyon eksik.",
    missing_mapping: "Eşleştirme eksik.",
    empty_file: "Tablo dosyası boş.",
    no_valid_items: "İçe aktarılacak geçerli öğe yok. Eşleştirmeyi kontrol edin.",
    internal_error: "Tablo içe aktarımı sırasında dahili hata: {error}",
    processed_items_prefix: "işlenen öğeler:",
    created: "oluşturuldu",
    to_verify: "doğrulanacak",
    ignored: "yoksayıldı",
    failed: "hatalar",
    none: "değişiklik yok",
};

static CATALOGS: [&Catalog; 3] = [&EN_US, &FR_FR, &TR_TR];

/// Pick a catalog from an Accept-Language style value.
///
/// Only the first tag counts (`"fr-FR,fr;q=0.9"` -> `fr-FR`). A bare primary
/// subtag such as `fr` selects the matching catalog.
pub fn catalog(lang: &str) -> &'static Catalog {
    let tag = lang
        .split(',')
        .next()
        .and_then(|t| t.split(';').next())
        .unwrap_or("")
        .trim();
    if tag.is_empty() {
        return &EN_US;
    }

    if let Some(found) = CATALOGS.iter().copied().find(|c| c.lang.eq_ignore_ascii_case(tag)) {
        return found;
    }

    let primary = tag.split(['-', '_']).next().unwrap_or(tag);
    CATALOGS
        .iter()
        .find(|c| {
            c.lang
                .split('-')
                .next()
                .is_some_and(|p| p.eq_ignore_ascii_case(primary))
        })
        .copied()
        .unwrap_or(&EN_US)
}

/// Substitute `{key}` placeholders.
pub fn format_message(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}

/// `"<processed> <prefix> <parts>."`, listing the non-zero counts.
pub fn summary_message(catalog: &Catalog, summary: &ImportSummary) -> String {
    let counts = [
        (summary.created, catalog.created),
        (summary.to_verify, catalog.to_verify),
        (summary.ignored, catalog.ignored),
        (summary.failed, catalog.failed),
    ];
    let parts: Vec<String> = counts
        .iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("{n} {label}"))
        .collect();

    let detail = if parts.is_empty() {
        catalog.none.to_string()
    } else {
        parts.join(", ")
    };

    format!(
        "{} {} {}.",
        summary.processed(),
        catalog.processed_items_prefix,
        detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_tag() {
        assert_eq!(catalog("fr-FR,fr;q=0.9,en;q=0.8").lang, "fr-FR");
        assert_eq!(catalog("tr-TR").lang, "tr-TR");
        assert_eq!(catalog("FR-fr").lang, "fr-FR");
        assert_eq!(catalog("fr-FR;q=0.9").lang, "fr-FR");
    }

    #[test]
    fn primary_subtag_and_fallback() {
        assert_eq!(catalog("fr").lang, "fr-FR");
        assert_eq!(catalog("tr_TR").lang, "tr-TR");
        assert_eq!(catalog("de-DE").lang, "en-US");
        assert_eq!(catalog("").lang, "en-US");
        assert_eq!(catalog("en-GB,fr-FR").lang, "en-US");
    }

    #[test]
    fn format_placeholders() {
        assert_eq!(
            format_message(EN_US.internal_error, &[("error", "disk full")]),
            "Internal error during spreadsheet import: disk full"
        );
        assert_eq!(format_message("no placeholders", &[("error", "x")]), "no placeholders");
    }

    #[test]
    fn summary_lists_non_zero_counts() {
        let summary = ImportSummary {
            created: 2,
            to_verify: 1,
            ignored: 0,
            failed: 1,
        };
        assert_eq!(
            summary_message(&EN_US, &summary),
            "4 items processed: 2 created, 1 to verify, 1 errors."
        );
        assert_eq!(
            summary_message(&FR_FR, &summary),
            "4 éléments traités : 2 Fiches créées, 1 Fiches à vérifier, 1 erreurs."
        );
    }

    #[test]
    fn summary_without_changes() {
        assert_eq!(
            summary_message(&EN_US, &ImportSummary::default()),
            "0 items processed: no changes."
        );
        assert_eq!(
            summary_message(&TR_TR, &ImportSummary::default()),
            "0 işlenen öğeler: değişiklik yok."
        );
    }
}
