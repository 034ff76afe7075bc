//! Unified error types for chatstat.
//!
//! This module provides a single [`ChatstatError`] enum that covers all error
//! cases in the library, grouped by what went wrong:
//!
//! - **Load failures** — unreachable path, wrong column count, unparseable
//!   timestamp ([`Io`](ChatstatError::Io), [`Parse`](ChatstatError::Parse),
//!   [`InvalidRow`](ChatstatError::InvalidRow))
//! - **Validation failures** — a reaction name outside the closed set
//!   ([`InvalidReaction`](ChatstatError::InvalidReaction))
//! - **Precondition failures** — statistics over too few items or with a zero
//!   denominator ([`InsufficientData`](ChatstatError::InsufficientData),
//!   [`ZeroDenominator`](ChatstatError::ZeroDenominator))
//! - **Not-ready failures** — a result that depends on a build step that has
//!   not run yet ([`NotReady`](ChatstatError::NotReady))
//!
//! None of these are ever downgraded to a default value: a silent zero would
//! corrupt every statistic computed downstream.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatstat operations.
///
/// # Example
///
/// ```rust
/// use chatstat::error::Result;
/// use chatstat::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatstatError>;

/// The error type for all chatstat operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatstatError {
    /// An I/O error occurred while loading a source.
    ///
    /// This typically happens when the export file doesn't exist or
    /// cannot be read. Loads are never retried.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse the raw payload of a source.
    #[error("Failed to parse {format} source{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The format being parsed (e.g., "delimited export", "device rows")
        format: &'static str,
        /// The underlying parse error
        #[source]
        source: ParseErrorKind,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// A single row could not be standardized.
    ///
    /// The whole load is aborted; `row` is the zero-based index of the
    /// offending data row (header rows are not counted).
    #[error("Invalid {format} row {row}: {message}")]
    InvalidRow {
        /// The format being standardized
        format: &'static str,
        /// Zero-based index of the offending row
        row: usize,
        /// Description of what's wrong
        message: String,
    },

    /// Invalid date or datetime string used as a trim bound.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// A configured pattern (e.g. the dead-line pattern) failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A reaction name outside the closed set of valid names.
    ///
    /// Carries the offending name and the complete valid set for diagnostics.
    /// When the name came from a source row, `row` is that row's index.
    #[error(
        "{}'{invalid_name}' is an invalid reaction name. Valid reaction names are {valid_names:?}",
        row_prefix(.row)
    )]
    InvalidReaction {
        /// The name that failed validation
        invalid_name: String,
        /// Every valid reaction name
        valid_names: &'static [&'static str],
        /// Zero-based index of the source row, if any
        row: Option<usize>,
    },

    /// A statistic was requested over too few items.
    #[error("{operation} requires at least {required} item(s), got {actual}")]
    InsufficientData {
        /// The statistic that was requested
        operation: &'static str,
        /// Minimum number of items required
        required: usize,
        /// Number of items actually available
        actual: usize,
    },

    /// An average or ratio was requested with a zero denominator.
    #[error("{operation} is undefined: denominator is zero")]
    ZeroDenominator {
        /// The statistic that was requested
        operation: &'static str,
    },

    /// A result was requested from an artifact that has not been built.
    #[error("{artifact} has not been built yet. {hint}")]
    NotReady {
        /// The artifact that must be built first
        artifact: &'static str,
        /// How to build it
        hint: &'static str,
    },

    /// The adapter for a source was compiled out.
    #[error("{source_name} support is disabled. Enable the '{feature}' feature")]
    SourceDisabled {
        /// Display name of the source
        source_name: &'static str,
        /// Cargo feature that enables it
        feature: &'static str,
    },

    /// CSV reading error.
    #[cfg(feature = "export-csv")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error.
    #[cfg(feature = "device-db")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kinds of parse errors that can occur.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// JSON parsing error
    #[cfg(feature = "device-db")]
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// CSV parsing error
    #[cfg(feature = "export-csv")]
    #[error("{0}")]
    Csv(#[from] csv::Error),
    /// Generic parsing error
    #[error("{0}")]
    Other(String),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatstatError {
    /// Creates a parse error for the device-row format.
    #[cfg(feature = "device-db")]
    pub fn device_rows_parse(source: serde_json::Error, path: Option<PathBuf>) -> Self {
        ChatstatError::Parse {
            format: "device rows",
            source: ParseErrorKind::Json(source),
            path,
        }
    }

    /// Creates a parse error for the delimited export format.
    #[cfg(feature = "export-csv")]
    pub fn export_parse(source: csv::Error, path: Option<PathBuf>) -> Self {
        ChatstatError::Parse {
            format: "delimited export",
            source: ParseErrorKind::Csv(source),
            path,
        }
    }

    /// Creates an invalid row error.
    pub fn invalid_row(format: &'static str, row: usize, message: impl Into<String>) -> Self {
        ChatstatError::InvalidRow {
            format,
            row,
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatstatError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD or YYYY-MM-DD HH:MM:SS",
        }
    }

    /// Creates an invalid reaction name error carrying the full valid set.
    pub fn invalid_reaction(name: impl Into<String>) -> Self {
        ChatstatError::InvalidReaction {
            invalid_name: name.into(),
            valid_names: crate::reaction::VALID_REACTION_NAMES,
            row: None,
        }
    }

    /// Attaches a source row index to an [`InvalidReaction`](ChatstatError::InvalidReaction).
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn at_row(self, index: usize) -> Self {
        match self {
            ChatstatError::InvalidReaction {
                invalid_name,
                valid_names,
                ..
            } => ChatstatError::InvalidReaction {
                invalid_name,
                valid_names,
                row: Some(index),
            },
            other => other,
        }
    }

    /// Creates an insufficient data error.
    pub fn insufficient_data(operation: &'static str, required: usize, actual: usize) -> Self {
        ChatstatError::InsufficientData {
            operation,
            required,
            actual,
        }
    }

    /// Creates a zero denominator error.
    pub fn zero_denominator(operation: &'static str) -> Self {
        ChatstatError::ZeroDenominator { operation }
    }

    /// Creates a not-ready error.
    pub fn not_ready(artifact: &'static str, hint: &'static str) -> Self {
        ChatstatError::NotReady { artifact, hint }
    }

    /// Creates a disabled-source error.
    pub fn source_disabled(source_name: &'static str, feature: &'static str) -> Self {
        ChatstatError::SourceDisabled {
            source_name,
            feature,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatstatError::Io(_))
    }

    /// Returns `true` if this is a load failure (IO, parse or row error).
    pub fn is_load_failure(&self) -> bool {
        match self {
            ChatstatError::Io(_)
            | ChatstatError::Parse { .. }
            | ChatstatError::InvalidRow { .. } => true,
            #[cfg(feature = "export-csv")]
            ChatstatError::Csv(_) => true,
            #[cfg(feature = "device-db")]
            ChatstatError::Json(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a reaction validation error.
    pub fn is_invalid_reaction(&self) -> bool {
        matches!(self, ChatstatError::InvalidReaction { .. })
    }

    /// Returns `true` if this is a precondition failure.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ChatstatError::InsufficientData { .. } | ChatstatError::ZeroDenominator { .. }
        )
    }

    /// Returns `true` if this is a not-ready error.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ChatstatError::NotReady { .. })
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, ChatstatError::InvalidDate { .. })
    }
}

#[allow(clippy::ref_option)]
fn row_prefix(row: &Option<usize>) -> String {
    row.map(|row| format!("Row {row}: ")).unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
