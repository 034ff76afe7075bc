//! # Chatstat
//!
//! A Rust library that normalizes personal message exports into one canonical
//! event model and computes temporal statistics over it.
//!
//! ## Overview
//!
//! Chatstat reads conversation history from:
//! - **Delimited exports** — `timestamp,is_from_me,text` rows produced by
//!   message export tools
//! - **Device rows** — pre-extracted rows from a device message database,
//!   as a JSON array or JSON Lines
//! - **Synthetic data** — generated conversations for demos and tests
//!
//! Every source goes through the same load → standardize → clean pipeline and
//! ends up as an ordered [`MessageCollection`](collection::MessageCollection).
//! Analyzers then answer questions such as "which day was busiest?", "what
//! was the longest silence?" or "how often was 😂 used?".
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatstat::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let collection = MessageCollection::from_csv_export(
//!         "messages.csv",
//!         CsvExportConfig::new().with_handle("+15555550123"),
//!     )?;
//!
//!     let received = TextAnalyzer::new(&collection.get_received());
//!     let (day, count) = received.most_per_day()?;
//!     println!("busiest day: {day} ({count} messages)");
//!     println!("longest silence: {}", received.longest_silence()?.duration);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Synthetic Data
//!
//! ```rust
//! use chatstat::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = SyntheticConfig::new().with_total_messages(50).with_seed(7);
//! let collection = MessageCollection::from_synthetic(config)?;
//! assert_eq!(collection.len(), 50);
//!
//! let emoji = EmojiAnalyzer::new(&collection);
//! for (name, count) in emoji.most_frequent(3) {
//!     println!("{name}: {count}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`message`] — [`Message`], [`Direction`](message::Direction),
//!   [`Attachment`](message::Attachment)
//! - [`reaction`] — [`ReactionName`](reaction::ReactionName) and the
//!   [`Reactions`](reaction::Reactions) aggregate
//! - [`adapter`] — the [`Adapter`](adapter::Adapter) pipeline trait and
//!   [`SourceDescriptor`](adapter::SourceDescriptor)
//! - [`adapters`] — one adapter per source, plus shared text cleaning
//! - [`collection`] — [`MessageCollection`](collection::MessageCollection)
//!   and its direction and date views
//! - [`aggregate`] — [`Timeline`](aggregate::Timeline),
//!   [`TemporalStats`](aggregate::TemporalStats),
//!   [`FrequencyTable`](aggregate::FrequencyTable)
//! - [`analysis`] — text, attachment, emoji, reaction, sentiment and word
//!   analyzers
//! - [`config`] — per-source configuration
//! - [`error`] — unified error types ([`ChatstatError`], [`Result`])
//! - [`prelude`] — convenient re-exports
//!
//! ## Feature Flags
//!
//! | Feature | Enables |
//! |---------|---------|
//! | `export-csv` | [`CsvExportAdapter`](adapters::CsvExportAdapter) |
//! | `device-db` | [`DeviceDbAdapter`](adapters::DeviceDbAdapter) |
//! | `synthetic` | [`SyntheticAdapter`](adapters::SyntheticAdapter) |
//! | `full` (default) | all of the above |

pub mod adapter;
pub mod adapters;
pub mod aggregate;
pub mod analysis;
pub mod collection;
pub mod config;
pub mod error;
pub mod message;
pub mod reaction;

// Re-export the main types at the crate root for convenience
pub use error::{ChatstatError, Result};
pub use message::Message;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatstat::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::Message;
    pub use crate::message::{Attachment, Direction, MessageId};
    pub use crate::reaction::{ReactionName, Reactions};

    // Error types
    pub use crate::error::{ChatstatError, Result};

    // Sources
    pub use crate::adapter::{Adapter, Source, SourceDescriptor};
    pub use crate::config::{
        CleanConfig, CsvExportConfig, DeviceDbConfig, RowFormat, SyntheticConfig,
    };

    // Collection and aggregation
    pub use crate::aggregate::{DayDivisor, FrequencyTable, TemporalStats, Timeline};
    pub use crate::collection::MessageCollection;

    // Analyzers
    pub use crate::analysis::{
        AttachmentAnalyzer, EmojiAnalyzer, PolarityScorer, ReactionAnalyzer, SentimentAnalyzer,
        TextAnalyzer, WordFrequencies,
    };
}
