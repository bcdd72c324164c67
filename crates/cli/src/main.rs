// rolodex CLI - spreadsheet contact import with duplicate reconciliation

mod exit_codes;
mod import;
mod messages;
mod report;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use rolodex_recon::{ImportConfig, ReconError, Record};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exit_codes::{EXIT_ERROR, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "rolodex")]
#[command(about = "Import contact spreadsheets without creating duplicates")]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import the first sheet of a spreadsheet into a collection
    #[command(after_help = "\
Examples:
  rolodex import contacts.xlsx --config contacts.import.toml
  rolodex import contacts.csv --config contacts.import.toml --lang fr-FR
  rolodex import contacts.xlsx --config contacts.import.toml --mapping '{\"0\":\"name\",\"3\":\"postal_code\"}'
  rolodex import contacts.xlsx --config contacts.import.toml --dry-run --json

Exit codes:
  0  every row imported or ignored
  3  completed, some rows failed (report still written)
  4  invalid config or mapping
  5  input file missing, empty, or without valid rows
  6  record store could not be opened or seeded")]
    Import(import::ImportArgs),

    /// Validate an import config without running it
    #[command(after_help = "\
Examples:
  rolodex validate contacts.import.toml")]
    Validate {
        /// Path to the .import.toml config file
        config: PathBuf,
    },

    /// Compare two records and print the concordance verdict
    #[command(after_help = "\
Examples:
  rolodex classify --config contacts.import.toml \\
      --existing '{\"name\":\"Jean Dupont\",\"postal_code\":\"75001\"}' \\
      --candidate '{\"name\":\"JEAN DUPONT\",\"postal_code\":\"75001\"}'")]
    Classify {
        /// Path to the .import.toml config file (field names, normalization)
        #[arg(long)]
        config: PathBuf,

        /// Already-known record, as a JSON object of field -> value
        #[arg(long)]
        existing: String,

        /// Incoming record, as a JSON object of field -> value
        #[arg(long)]
        candidate: String,

        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Import(args) => import::cmd_import(args),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Classify {
            config,
            existing,
            candidate,
            json,
        } => cmd_classify(config, existing, candidate, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INVALID_CONFIG, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Exit without printing anything further.
    pub fn silent(code: u8) -> Self {
        Self::new(code, "")
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::ConfigParse(_)
            | ReconError::ConfigValidation(_)
            | ReconError::InvalidMapping(_) => Self::config(err.to_string()),
            ReconError::Seed(_) => Self::new(exit_codes::EXIT_STORE, err.to_string()),
            ReconError::IndexAlreadySeeded => Self::general(err.to_string()),
        }
    }
}

/// Read and parse a config without validating it.
pub(crate) fn read_config(path: &Path) -> Result<ImportConfig, CliError> {
    let input = std::fs::read_to_string(path).map_err(|e| {
        CliError::config(format!("cannot read config {}: {e}", path.display()))
    })?;
    Ok(ImportConfig::parse_toml(&input)?)
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    config.validate()?;
    rolodex_store::Schema::from_config(&config.schema)
        .map_err(|e| CliError::config(format!("schema: {e}")))?;

    println!(
        "valid: import '{}' into '{}' with {} mapped column(s)",
        config.name,
        config.collection,
        config.mapping.len()
    );
    Ok(())
}

// ============================================================================
// classify
// ============================================================================

fn parse_record(label: &str, input: &str) -> Result<Record, CliError> {
    let fields: BTreeMap<String, String> = serde_json::from_str(input).map_err(|e| {
        CliError::args(format!("--{label}: expected a JSON object of strings: {e}"))
    })?;
    Ok(Record::from_pairs(fields))
}

fn cmd_classify(
    config_path: PathBuf,
    existing: String,
    candidate: String,
    json: bool,
) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let classifier = config.classifier();

    let existing = parse_record("existing", &existing)?;
    let candidate = parse_record("candidate", &candidate)?;

    let concordance = classifier.concordance(&existing, &candidate);
    let verdict = concordance.verdict();

    if json {
        let out = serde_json::json!({
            "verdict": verdict,
            "concordance": concordance,
            "nameKey": {
                "existing": classifier.name_key(&existing),
                "candidate": classifier.name_key(&candidate),
            },
        });
        let text = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{text}");
        return Ok(());
    }

    let yes_no = |b: bool| if b { "match" } else { "no match" };
    println!("verdict: {verdict}");
    println!("name:    {}", yes_no(concordance.name));
    println!("address: {}", yes_no(concordance.address));
    println!("postal:  {}", yes_no(concordance.postal));
    Ok(())
}
