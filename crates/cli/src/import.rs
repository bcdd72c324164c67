//! `rolodex import`: reconcile a spreadsheet against a collection.

use std::path::{Path, PathBuf};

use clap::Args;
use rolodex_io::IoError;
use rolodex_recon::{
    rows_from_grid, BatchStatus, ColumnMapping, ImportConfig, ReconError, RecordStore,
};
use rolodex_store::{MemoryStore, Schema, SqliteStore};
use tracing::{debug, info};

use crate::exit_codes::{EXIT_ERROR, EXIT_IMPORT_PARTIAL, EXIT_INPUT, EXIT_STORE};
use crate::messages::{self, format_message, Catalog, DEFAULT_LANG};
use crate::report::{human_summary, JsonReport};
use crate::CliError;

#[derive(Args)]
pub struct ImportArgs {
    /// Spreadsheet to import (.xlsx, .xls, .xlsb, .ods, .csv, .tsv)
    pub file: PathBuf,

    /// Path to the .import.toml config file
    #[arg(long)]
    pub config: PathBuf,

    /// SQLite database holding the collections [default: <data dir>/rolodex/rolodex.db]
    #[arg(long, env = "ROLODEX_DB")]
    pub db: Option<PathBuf>,

    /// Column mapping as JSON, overriding [mapping] (e.g. '{"0":"name"}')
    #[arg(long)]
    pub mapping: Option<String>,

    /// Target collection, overriding `collection`
    #[arg(long)]
    pub collection: Option<String>,

    /// Message language (first tag of an Accept-Language value)
    #[arg(long, env = "ROLODEX_LANG", default_value = DEFAULT_LANG)]
    pub lang: String,

    /// Classify and report without writing to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Output JSON to stdout instead of human summary
    #[arg(long)]
    pub json: bool,

    /// Write JSON output to file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_import(args: ImportArgs) -> Result<(), CliError> {
    let catalog = messages::catalog(&args.lang);
    debug!(lang = catalog.lang, "message catalog");

    if !args.file.is_file() {
        return Err(CliError::new(EXIT_INPUT, catalog.missing_file)
            .with_hint(format!("no such file: {}", args.file.display())));
    }

    let config = resolve_config(&args, catalog)?;
    let schema = Schema::from_config(&config.schema)
        .map_err(|e| CliError::config(format!("schema: {e}")))?;

    // Extract rows
    let grid = rolodex_io::read_grid(&args.file).map_err(|e| input_error(e, catalog))?;
    if grid.is_empty() {
        return Err(CliError::new(EXIT_INPUT, catalog.empty_file));
    }
    let rows = rows_from_grid(&grid, &config.mapping, config.header_rows);
    if rows.is_empty() {
        return Err(CliError::new(EXIT_INPUT, catalog.no_valid_items));
    }
    info!(file = %args.file.display(), rows = rows.len(), "extracted rows");

    // Run
    let db_path = resolve_db_path(args.db.as_deref())?;
    let mut store = open_store(&db_path, &config.collection, schema, args.dry_run)?;
    let result = rolodex_recon::run(&config, rows, store.as_mut()).map_err(|e| match e {
        ReconError::Seed(_) => CliError::new(EXIT_STORE, e.to_string()),
        other => CliError::new(
            EXIT_ERROR,
            format_message(catalog.internal_error, &[("error", &other.to_string())]),
        ),
    })?;

    // Output
    let report = JsonReport::new(&result, catalog, args.dry_run);
    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::general(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    // Human summary to stderr
    for line in human_summary(&report) {
        eprintln!("{line}");
    }

    match report.status {
        BatchStatus::Success => Ok(()),
        BatchStatus::MultiStatus => Err(CliError::silent(EXIT_IMPORT_PARTIAL)),
    }
}

/// Load the config and apply `--collection` / `--mapping` before validating.
fn resolve_config(args: &ImportArgs, catalog: &Catalog) -> Result<ImportConfig, CliError> {
    let mut config = crate::read_config(&args.config)?;

    if let Some(ref collection) = args.collection {
        config.collection = collection.trim().to_string();
    }
    if let Some(ref mapping) = args.mapping {
        config.mapping = ColumnMapping::from_json(mapping)?;
    }

    if config.collection.trim().is_empty() {
        return Err(CliError::config(catalog.missing_collection)
            .with_hint("set `collection` in the config or pass --collection"));
    }
    if config.mapping.is_empty() {
        return Err(CliError::config(catalog.missing_mapping)
            .with_hint("add a [mapping] table or pass --mapping"));
    }

    config.validate()?;
    Ok(config)
}

fn input_error(err: IoError, catalog: &Catalog) -> CliError {
    let message = match err {
        IoError::Read { .. } => catalog.missing_file.to_string(),
        other => other.to_string(),
    };
    CliError::new(EXIT_INPUT, message)
}

fn resolve_db_path(db: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(path) = db {
        return Ok(path.to_path_buf());
    }
    dirs::data_dir()
        .map(|dir| dir.join("rolodex").join("rolodex.db"))
        .ok_or_else(|| {
            CliError::args("cannot determine the data directory").with_hint("pass --db <PATH>")
        })
}

/// SQLite store, or for a dry run an in-memory copy of the collection.
fn open_store(
    db_path: &Path,
    collection: &str,
    schema: Schema,
    dry_run: bool,
) -> Result<Box<dyn RecordStore>, CliError> {
    let store_err = |e: rolodex_recon::StoreError| {
        CliError::new(EXIT_STORE, format!("record store {}: {e}", db_path.display()))
    };

    if dry_run {
        let existing = if db_path.exists() {
            let mut db = SqliteStore::open_read_only(db_path, collection, Schema::permissive())
                .map_err(store_err)?;
            db.seed_all().map_err(store_err)?
        } else {
            Vec::new()
        };
        debug!(records = existing.len(), "dry run against in-memory copy");
        return Ok(Box::new(MemoryStore::with_records(schema, existing)));
    }

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::new(EXIT_STORE, format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    let store = SqliteStore::open(db_path, collection, schema).map_err(store_err)?;
    Ok(Box::new(store))
}
