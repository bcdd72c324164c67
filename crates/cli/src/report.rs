//! Import report rendering: the `--json` document and the stderr summary.

use rolodex_recon::{BatchStatus, ImportError, ImportMeta, ImportResult, RowOutcome};
use serde::Serialize;

use crate::messages::{summary_message, Catalog};

/// JSON contract of `rolodex import --json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub message: String,
    pub status: BatchStatus,
    pub created: usize,
    pub to_verify: usize,
    pub ignored: usize,
    pub failed: &'a [ImportError],
    pub outcomes: &'a [RowOutcome],
    pub dry_run: bool,
    pub meta: &'a ImportMeta,
}

impl<'a> JsonReport<'a> {
    pub fn new(result: &'a ImportResult, catalog: &Catalog, dry_run: bool) -> Self {
        let report = &result.report;
        Self {
            message: summary_message(catalog, &report.summary),
            status: report.status(),
            created: report.summary.created,
            to_verify: report.summary.to_verify,
            ignored: report.summary.ignored,
            failed: &report.errors,
            outcomes: &report.outcomes,
            dry_run,
            meta: &result.meta,
        }
    }
}

/// Human summary: the localized message, then one line per failed row.
pub fn human_summary(report: &JsonReport<'_>) -> Vec<String> {
    let mut lines = Vec::with_capacity(1 + report.failed.len());
    if report.dry_run {
        lines.push(format!("{} (dry run, nothing written)", report.message));
    } else {
        lines.push(report.message.clone());
    }
    for err in report.failed {
        lines.push(format!("  row {}: [{}] {}", err.row, err.code, err.error));
    }
    lines
}
