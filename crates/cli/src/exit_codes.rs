//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | Import completed, no row errors                             |
//! | 1    | General error (unspecified)                                 |
//! | 2    | CLI usage error (bad args)                                  |
//! | 3    | Import completed with row errors (multi-status)             |
//! | 4    | Invalid config or column mapping                            |
//! | 5    | Input file missing, unreadable, empty, or without valid rows |
//! | 6    | Record store could not be opened or seeded                  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - every row reached a terminal state without error.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Import ran to completion but at least one row failed.
/// The report is still written; this is the 207 of the import contract.
pub const EXIT_IMPORT_PARTIAL: u8 = 3;

/// Config could not be read, parsed, or validated, or `--mapping` is bad.
pub const EXIT_INVALID_CONFIG: u8 = 4;

/// Input file missing, unreadable, empty, or yielded no rows.
pub const EXIT_INPUT: u8 = 5;

/// Record store failure before any row was processed.
pub const EXIT_STORE: u8 = 6;
