//! Delimited export adapter.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::{debug, warn};

use super::clean::{Cleaner, device_time_to_utc, normalize_characters};
use crate::adapter::{Adapter, Source};
use crate::config::CsvExportConfig;
use crate::error::{ChatstatError, Result};
use crate::message::{Direction, Message, assign_ids};
use crate::reaction::parse_tapback;

const FORMAT: &str = "delimited export";
const FIELD_COUNT: usize = 3;

/// Adapter for delimited exports.
///
/// Each row has exactly three positional fields:
///
/// | Field | Example | Meaning |
/// |-------|---------|---------|
/// | timestamp | `725846400000000000` | Nanoseconds since 2001-01-01 UTC |
/// | is outgoing | `1` / `0` / `true` / `false` | Sent by the account owner |
/// | text | `See you soon` | Raw message text |
///
/// A row whose text is a tapback (`Loved "See you soon"`) is not kept as a
/// message of its own: the reaction is recorded on the most recent earlier
/// message with the quoted text.
///
/// # Example
///
/// ```rust
/// use chatstat::adapters::CsvExportAdapter;
/// use chatstat::config::CsvExportConfig;
///
/// # fn main() -> chatstat::Result<()> {
/// let adapter = CsvExportAdapter::new("unused.csv", CsvExportConfig::new());
/// let messages = adapter.parse_str(
///     "date,is_from_me,text\n\
///      0,1,See you soon\n\
///      1000000000,0,\"Loved \"\"See you soon\"\"\"\n",
/// )?;
///
/// assert_eq!(messages.len(), 1);
/// assert_eq!(messages[0].reactions[0].as_str(), "loved");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvExportAdapter {
    path: PathBuf,
    config: CsvExportConfig,
}

impl CsvExportAdapter {
    /// Creates an adapter reading `path`.
    pub fn new(path: impl Into<PathBuf>, config: CsvExportConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Path this adapter reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CsvExportConfig {
        &self.config
    }

    /// Parses export content already in memory.
    pub fn parse_str(&self, content: &str) -> Result<Vec<Message>> {
        let records = self.read_records(content.as_bytes(), None)?;
        let mut messages = self.clean(self.standardize(records)?)?;
        assign_ids(&mut messages, 0);
        Ok(messages)
    }

    fn read_records<R: Read>(&self, reader: R, path: Option<&Path>) -> Result<Vec<StringRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.config.has_header)
            .delimiter(self.config.delimiter)
            .flexible(true)
            .from_reader(reader);

        reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ChatstatError::export_parse(e, path.map(Path::to_path_buf)))
    }

    fn standardize_row(&self, row: usize, record: &StringRecord) -> Result<Message> {
        if record.len() != FIELD_COUNT {
            return Err(ChatstatError::invalid_row(
                FORMAT,
                row,
                format!("expected {FIELD_COUNT} fields, found {}", record.len()),
            ));
        }

        let raw_date = record[0].trim();
        let nanos: i64 = raw_date.parse().map_err(|_| {
            ChatstatError::invalid_row(FORMAT, row, format!("invalid timestamp '{raw_date}'"))
        })?;
        let timestamp = device_time_to_utc(nanos).ok_or_else(|| {
            ChatstatError::invalid_row(FORMAT, row, format!("timestamp {nanos} out of range"))
        })?;

        let is_outgoing = parse_flag(&record[1])
            .ok_or_else(|| ChatstatError::invalid_row(FORMAT, row, format!("invalid flag '{}'", &record[1])))?;

        Ok(Message::new(timestamp, Direction::from_outgoing(is_outgoing))
            .with_handle(self.config.handle.clone())
            .with_text(&record[2]))
    }
}

/// Parses an outgoing flag: `1`/`0` or `true`/`false`.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// Folds tapback rows onto the message they quote.
///
/// The target is the most recent earlier message whose text equals the
/// quoted text. Tapbacks without a target are kept as ordinary messages.
fn fold_tapbacks(messages: Vec<Message>) -> Vec<Message> {
    let mut out: Vec<Message> = Vec::with_capacity(messages.len());
    let mut latest: HashMap<String, usize> = HashMap::new();
    let mut folded = 0usize;

    for message in messages {
        let normalized = message.text().map(normalize_characters);
        if let Some(text) = &normalized {
            if let Some((name, quoted)) = parse_tapback(text) {
                if let Some(&target) = latest.get(quoted.trim()) {
                    out[target].add_reaction(name);
                    folded += 1;
                    continue;
                }
                warn!(reaction = %name, quoted, "tapback target not found, keeping as message");
            }
            latest.insert(text.clone(), out.len());
        }
        out.push(message);
    }

    if folded > 0 {
        debug!(folded, "folded tapbacks into reactions");
    }
    out
}

impl Adapter for CsvExportAdapter {
    type Raw = Vec<StringRecord>;

    fn name(&self) -> &'static str {
        "CsvExport"
    }

    fn source(&self) -> Source {
        Source::ExportCsv
    }

    fn load(&self) -> Result<Self::Raw> {
        let file = File::open(&self.path)?;
        let records = self.read_records(BufReader::new(file), Some(&self.path))?;
        debug!(adapter = self.name(), rows = records.len(), path = %self.path.display(), "loaded rows");
        Ok(records)
    }

    fn standardize(&self, raw: Self::Raw) -> Result<Vec<Message>> {
        raw.iter()
            .enumerate()
            .map(|(row, record)| self.standardize_row(row, record))
            .collect()
    }

    /// Tapbacks are folded between dead-line splitting and text cleaning, so
    /// they match split segments before URLs are stripped.
    fn clean(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let cleaner = Cleaner::new(&self.config.clean)?;
        let split = cleaner.split_messages(messages);
        Ok(cleaner.clean_texts(fold_tapbacks(split)))
    }
}
