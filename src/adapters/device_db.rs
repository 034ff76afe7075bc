//! Adapter for rows already extracted from the device message database.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clean::{Cleaner, device_time_to_utc};
use crate::adapter::{Adapter, Source};
use crate::config::{DeviceDbConfig, RowFormat};
use crate::error::{ChatstatError, Result};
use crate::message::{Direction, Message, assign_ids};
use crate::reaction::ReactionName;

const FORMAT: &str = "device rows";

/// One row of the pre-extracted message table.
///
/// ```json
/// {
///   "date": 725846400000000000,
///   "is_from_me": 1,
///   "text": "Check this out",
///   "handle": "+15558675309",
///   "attachments": [{"filename": "~/Library/Messages/Attachments/IMG_0042.HEIC"}],
///   "reactions": ["loved"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRow {
    /// Nanoseconds since 2001-01-01 UTC
    pub date: i64,
    /// Outgoing flag as stored by the database
    pub is_from_me: Flag,
    /// Raw message text
    #[serde(default)]
    pub text: Option<String>,
    /// Sender or recipient identifier
    #[serde(default)]
    pub handle: Option<String>,
    /// Attachment records joined to this message
    #[serde(default)]
    pub attachments: Vec<DeviceAttachment>,
    /// Reaction names observed on this message
    #[serde(default)]
    pub reactions: Vec<String>,
}

/// Attachment columns joined from the attachment table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAttachment {
    /// Full path on the device, if stored
    #[serde(default)]
    pub filename: Option<String>,
    /// Name of the file as transferred
    #[serde(default)]
    pub transfer_name: Option<String>,
}

impl DeviceAttachment {
    /// The best available file name: the stored path, else the transfer name.
    pub fn name(&self) -> Option<&str> {
        self.filename.as_deref().or(self.transfer_name.as_deref())
    }
}

/// An outgoing flag stored as a boolean, an integer or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    /// `true` / `false`
    Bool(bool),
    /// `1` / `0`
    Int(i64),
    /// `"1"`, `"0"`, `"true"`, `"false"`
    Text(String),
}

impl Flag {
    /// Coerces to a boolean. `None` for anything but the accepted values.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Flag::Bool(b) => Some(*b),
            Flag::Int(1) => Some(true),
            Flag::Int(0) => Some(false),
            Flag::Int(_) => None,
            Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                _ => None,
            },
        }
    }
}

/// Adapter for pre-extracted device rows.
///
/// Performs type coercion only: device-epoch nanoseconds become UTC instants,
/// the flag becomes a [`Direction`], file names become extensions and
/// reaction strings are validated.
///
/// # Example
///
/// ```rust
/// use chatstat::adapters::DeviceDbAdapter;
/// use chatstat::config::DeviceDbConfig;
///
/// # fn main() -> chatstat::Result<()> {
/// let adapter = DeviceDbAdapter::new("unused.json", DeviceDbConfig::new());
/// let messages = adapter.parse_str(
///     r#"[{"date": 0, "is_from_me": 0, "text": "hey", "handle": "bob",
///          "attachments": [{"transfer_name": "clip.MOV"}], "reactions": ["Loved"]}]"#,
/// )?;
///
/// assert_eq!(messages[0].handle(), "bob");
/// assert_eq!(messages[0].attachments[0].file_extension, "mov");
/// assert_eq!(messages[0].reactions[0].as_str(), "loved");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceDbAdapter {
    path: PathBuf,
    config: DeviceDbConfig,
}

impl DeviceDbAdapter {
    /// Creates an adapter reading `path`.
    pub fn new(path: impl Into<PathBuf>, config: DeviceDbConfig) -> Self {
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
    pub fn config(&self) -> &DeviceDbConfig {
        &self.config
    }

    /// Parses row content already in memory.
    pub fn parse_str(&self, content: &str) -> Result<Vec<Message>> {
        let rows = self.read_rows(content, None)?;
        let mut messages = self.clean(self.standardize(rows)?)?;
        assign_ids(&mut messages, 0);
        Ok(messages)
    }

    fn read_rows(&self, content: &str, path: Option<&Path>) -> Result<Vec<DeviceRow>> {
        match self.config.format {
            RowFormat::JsonArray => serde_json::from_str(content)
                .map_err(|e| ChatstatError::device_rows_parse(e, path.map(Path::to_path_buf))),
            RowFormat::JsonLines => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .enumerate()
                .map(|(row, line)| {
                    serde_json::from_str(line)
                        .map_err(|e| ChatstatError::invalid_row(FORMAT, row, e.to_string()))
                })
                .collect(),
        }
    }
}

fn standardize_row(row: usize, raw: DeviceRow) -> Result<Message> {
    let timestamp = device_time_to_utc(raw.date).ok_or_else(|| {
        ChatstatError::invalid_row(FORMAT, row, format!("timestamp {} out of range", raw.date))
    })?;
    let is_outgoing = raw.is_from_me.as_bool().ok_or_else(|| {
        ChatstatError::invalid_row(FORMAT, row, format!("invalid flag {:?}", raw.is_from_me))
    })?;

    let mut message = Message::new(timestamp, Direction::from_outgoing(is_outgoing))
        .with_handle(raw.handle.unwrap_or_default());
    if let Some(text) = raw.text {
        message = message.with_text(text);
    }
    for attachment in &raw.attachments {
        message = message.with_attachment(attachment.name().map(str::to_string));
    }
    for name in &raw.reactions {
        message = message.with_reaction(ReactionName::new(name).map_err(|e| e.at_row(row))?);
    }
    Ok(message)
}

impl Adapter for DeviceDbAdapter {
    type Raw = Vec<DeviceRow>;

    fn name(&self) -> &'static str {
        "DeviceDb"
    }

    fn source(&self) -> Source {
        Source::DeviceDb
    }

    fn load(&self) -> Result<Self::Raw> {
        let content = fs::read_to_string(&self.path)?;
        let rows = self.read_rows(&content, Some(&self.path))?;
        debug!(adapter = self.name(), rows = rows.len(), path = %self.path.display(), "loaded rows");
        Ok(rows)
    }

    fn standardize(&self, raw: Self::Raw) -> Result<Vec<Message>> {
        raw.into_iter()
            .enumerate()
            .map(|(row, raw)| standardize_row(row, raw))
            .collect()
    }

    fn clean(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let cleaner = Cleaner::new(&self.config.clean)?;
        Ok(cleaner.clean_messages(messages))
    }
}
