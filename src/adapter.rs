//! Adapter contract shared by every message source.
//!
//! Each source turns its native rows into canonical [`Message`]s in three
//! steps:
//!
//! 1. [`load`](Adapter::load) - one blocking read of the raw rows
//! 2. [`standardize`](Adapter::standardize) - map the native schema onto
//!    [`Message`] fields
//! 3. [`clean`](Adapter::clean) - strip URLs, normalize characters, split
//!    dead lines
//!
//! [`parse`](Adapter::parse) chains the three and assigns ids in arrival
//! order. A row that cannot be standardized aborts the whole load; there are
//! no partial results.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "synthetic")]
//! # fn main() -> chatstat::Result<()> {
//! use chatstat::adapter::{Adapter, Source};
//! use chatstat::adapters::SyntheticAdapter;
//! use chatstat::config::SyntheticConfig;
//!
//! let adapter = SyntheticAdapter::sample(SyntheticConfig::new().with_seed(1));
//! assert_eq!(adapter.source(), Source::Synthetic);
//!
//! let messages = adapter.parse()?;
//! assert!(!messages.is_empty());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "synthetic"))]
//! # fn main() {}
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CsvExportConfig, DeviceDbConfig, SyntheticConfig};
use crate::error::Result;
use crate::message::{Message, assign_ids};

/// Supported message sources.
///
/// # Example
///
/// ```rust
/// use chatstat::adapter::Source;
/// use std::str::FromStr;
///
/// assert_eq!(Source::from_str("csv").unwrap(), Source::ExportCsv);
/// assert_eq!(Source::from_str("chat.db").unwrap(), Source::DeviceDb);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Source {
    /// Delimited export with timestamp, flag and text columns
    #[serde(alias = "csv")]
    ExportCsv,

    /// Rows already extracted from the device message database
    #[serde(alias = "db")]
    DeviceDb,

    /// Rows produced by a generator
    Synthetic,
}

impl Source {
    /// Returns the Cargo feature that enables this source.
    pub fn feature(&self) -> &'static str {
        match self {
            Source::ExportCsv => "export-csv",
            Source::DeviceDb => "device-db",
            Source::Synthetic => "synthetic",
        }
    }

    /// Returns all source names including aliases.
    pub fn all_names() -> &'static [&'static str] {
        &["export_csv", "csv", "device_db", "db", "chat.db", "synthetic", "sample"]
    }

    /// Returns all available sources.
    pub fn all() -> &'static [Source] {
        &[Source::ExportCsv, Source::DeviceDb, Source::Synthetic]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::ExportCsv => write!(f, "delimited export"),
            Source::DeviceDb => write!(f, "device rows"),
            Source::Synthetic => write!(f, "synthetic"),
        }
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "export_csv" | "export-csv" | "csv" => Ok(Source::ExportCsv),
            "device_db" | "device-db" | "db" | "chat.db" => Ok(Source::DeviceDb),
            "synthetic" | "sample" => Ok(Source::Synthetic),
            _ => Err(format!(
                "Unknown source: '{}'. Expected one of: {}",
                s,
                Source::all_names().join(", ")
            )),
        }
    }
}

/// Where to read a source from and how.
///
/// Used by [`MessageCollection::load`](crate::collection::MessageCollection::load)
/// to pick the adapter at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceDescriptor {
    /// A delimited export file.
    ExportCsv {
        /// Path to the export file
        path: PathBuf,
        /// Parsing settings
        #[serde(default)]
        config: CsvExportConfig,
    },
    /// A file of pre-extracted device rows.
    DeviceDb {
        /// Path to the row file
        path: PathBuf,
        /// Parsing settings
        #[serde(default)]
        config: DeviceDbConfig,
    },
    /// Generated sample rows.
    Synthetic {
        /// Generator settings
        #[serde(default)]
        config: SyntheticConfig,
    },
}

impl SourceDescriptor {
    /// A delimited export at `path` with default settings.
    pub fn export_csv(path: impl Into<PathBuf>) -> Self {
        SourceDescriptor::ExportCsv {
            path: path.into(),
            config: CsvExportConfig::default(),
        }
    }

    /// A device row file at `path` with default settings.
    pub fn device_db(path: impl Into<PathBuf>) -> Self {
        SourceDescriptor::DeviceDb {
            path: path.into(),
            config: DeviceDbConfig::default(),
        }
    }

    /// Generated sample rows.
    pub fn synthetic(config: SyntheticConfig) -> Self {
        SourceDescriptor::Synthetic { config }
    }

    /// The source this descriptor points at.
    pub fn source(&self) -> Source {
        match self {
            SourceDescriptor::ExportCsv { .. } => Source::ExportCsv,
            SourceDescriptor::DeviceDb { .. } => Source::DeviceDb,
            SourceDescriptor::Synthetic { .. } => Source::Synthetic,
        }
    }
}

/// Converts one source into canonical messages.
///
/// Implementors provide the three pipeline steps; [`parse`](Adapter::parse)
/// is provided.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl Adapter for MyAdapter {
///     type Raw = Vec<MyRow>;
///
///     fn name(&self) -> &'static str { "MyAdapter" }
///     fn source(&self) -> Source { Source::DeviceDb }
///
///     fn load(&self) -> Result<Vec<MyRow>> {
///         let content = std::fs::read_to_string(&self.path)?;
///         Ok(serde_json::from_str(&content)?)
///     }
///
///     fn standardize(&self, raw: Vec<MyRow>) -> Result<Vec<Message>> {
///         raw.into_iter().enumerate().map(|(i, row)| row.into_message(i)).collect()
///     }
///
///     fn clean(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
///         Ok(Cleaner::new(&self.config.clean)?.clean_messages(messages))
///     }
/// }
/// ```
pub trait Adapter: Send + Sync {
    /// Raw rows as read from the source.
    type Raw;

    /// Returns the human-readable name of this adapter.
    fn name(&self) -> &'static str;

    /// Returns the source this adapter handles.
    fn source(&self) -> Source;

    /// Reads the raw rows. One blocking read, never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::Io`](crate::ChatstatError::Io) when the
    /// source is unreachable and a parse error when its payload is malformed.
    fn load(&self) -> Result<Self::Raw>;

    /// Maps raw rows onto canonical messages.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidRow`](crate::ChatstatError::InvalidRow)
    /// naming the first row that cannot be converted.
    fn standardize(&self, raw: Self::Raw) -> Result<Vec<Message>>;

    /// Applies the cleaning steps.
    fn clean(&self, messages: Vec<Message>) -> Result<Vec<Message>>;

    /// Runs `load`, `standardize` and `clean`, then assigns ids in arrival
    /// order starting at zero.
    fn parse(&self) -> Result<Vec<Message>> {
        let raw = self.load()?;
        let standardized = self.standardize(raw)?;
        let standardized_count = standardized.len();
        let mut messages = self.clean(standardized)?;
        assign_ids(&mut messages, 0);
        debug!(
            adapter = self.name(),
            standardized = standardized_count,
            cleaned = messages.len(),
            "parsed source"
        );
        Ok(messages)
    }
}
