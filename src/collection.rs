//! The canonical, time-ordered message collection.
//!
//! [`MessageCollection`] is what every analyzer reads from. It is immutable
//! once built: filtering ([`get`](MessageCollection::get)), trimming
//! ([`trim`](MessageCollection::trim)) and appending
//! ([`append`](MessageCollection::append)) all return new collections that
//! share the underlying messages through [`Arc`].
//!
//! # Example
//!
//! ```
//! use chatstat::collection::MessageCollection;
//! use chatstat::message::{Direction, Message};
//! use chrono::{TimeZone, Utc};
//!
//! # fn main() -> chatstat::Result<()> {
//! let at = |d, h| Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap();
//! let collection = MessageCollection::new(vec![
//!     Message::new(at(3, 10), Direction::Received).with_text("third"),
//!     Message::new(at(1, 9), Direction::Sent).with_text("first"),
//!     Message::new(at(1, 15), Direction::Received).with_text("second"),
//! ]);
//!
//! assert_eq!(collection.as_string(false), "first\nsecond\nthird");
//! assert_eq!(collection.get_sent().len(), 1);
//!
//! let january_first = collection.trim_dates(Some("2024-01-01"), Some("2024-01-02"))?;
//! assert_eq!(january_first.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::trace;

use crate::adapter::{Adapter, SourceDescriptor};
use crate::aggregate::{TemporalStats, Timeline};
use crate::analysis::AttachmentRef;
use crate::config::{CsvExportConfig, DeviceDbConfig, SyntheticConfig};
use crate::error::{ChatstatError, Result};
use crate::message::{Direction, Message, assign_ids};
use crate::reaction::Reactions;

#[cfg(feature = "synthetic")]
use crate::adapters::MessageGenerator;

/// An immutable, timestamp-ordered sequence of messages.
///
/// Ties on timestamp keep arrival order. Ids are unique within the
/// collection.
#[derive(Debug, Clone, Default)]
pub struct MessageCollection {
    messages: Vec<Arc<Message>>,
    timeline: Timeline,
}

impl MessageCollection {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Builds a collection from messages in arrival order.
    ///
    /// Ids are reassigned `0..n` in arrival order, then messages are sorted
    /// by timestamp (stable).
    pub fn new(mut messages: Vec<Message>) -> Self {
        assign_ids(&mut messages, 0);
        messages.sort_by_key(|m| m.timestamp);
        trace!(messages = messages.len(), "built collection");
        Self::from_shared(messages.into_iter().map(Arc::new).collect())
    }

    /// Builds a collection over already ordered, already numbered messages.
    fn from_shared(messages: Vec<Arc<Message>>) -> Self {
        let timeline = Timeline::from_instants(messages.iter().map(|m| m.timestamp).collect());
        Self { messages, timeline }
    }

    /// Runs an adapter and builds a collection from its output.
    pub fn from_adapter<A: Adapter>(adapter: &A) -> Result<Self> {
        Ok(Self::new(adapter.parse()?))
    }

    /// Loads whichever source `descriptor` points at.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::SourceDisabled`] when the source's Cargo
    /// feature is off, and any load error of the adapter otherwise.
    pub fn load(descriptor: &SourceDescriptor) -> Result<Self> {
        match descriptor {
            SourceDescriptor::ExportCsv { path, config } => load_csv_export(path, config),
            SourceDescriptor::DeviceDb { path, config } => load_device_db(path, config),
            SourceDescriptor::Synthetic { config } => load_synthetic(config),
        }
    }

    /// Loads a delimited export.
    #[cfg(feature = "export-csv")]
    pub fn from_csv_export(path: impl Into<PathBuf>, config: CsvExportConfig) -> Result<Self> {
        Self::from_adapter(&crate::adapters::CsvExportAdapter::new(path, config))
    }

    /// Loads pre-extracted device rows.
    #[cfg(feature = "device-db")]
    pub fn from_device_db(path: impl Into<PathBuf>, config: DeviceDbConfig) -> Result<Self> {
        Self::from_adapter(&crate::adapters::DeviceDbAdapter::new(path, config))
    }

    /// Generates a sample conversation.
    #[cfg(feature = "synthetic")]
    pub fn from_synthetic(config: SyntheticConfig) -> Result<Self> {
        Self::from_adapter(&crate::adapters::SyntheticAdapter::sample(config))
    }

    /// Builds a collection from any generator.
    #[cfg(feature = "synthetic")]
    pub fn from_generator<G: MessageGenerator>(generator: G) -> Result<Self> {
        Self::from_adapter(&crate::adapters::SyntheticAdapter::new(generator))
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Messages matching `direction`. [`Direction::All`] returns everything.
    pub fn get(&self, direction: Direction) -> Self {
        Self::from_shared(
            self.messages
                .iter()
                .filter(|m| direction.includes(m.direction))
                .cloned()
                .collect(),
        )
    }

    /// Messages sent by the account owner.
    pub fn get_sent(&self) -> Self {
        self.get(Direction::Sent)
    }

    /// Messages received by the account owner.
    pub fn get_received(&self) -> Self {
        self.get(Direction::Received)
    }

    /// Every message.
    pub fn get_all(&self) -> Self {
        self.get(Direction::All)
    }

    /// Messages in the half-open range `[start, end)`.
    ///
    /// A missing bound defaults to the collection's own bound; a missing
    /// `end` includes the last message.
    pub fn trim(&self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        let lo = start.map_or(0, |s| self.messages.partition_point(|m| m.timestamp < s));
        let hi = end.map_or(self.messages.len(), |e| {
            self.messages.partition_point(|m| m.timestamp < e)
        });
        if hi <= lo {
            return Self::default();
        }
        Self::from_shared(self.messages[lo..hi].to_vec())
    }

    /// Like [`trim`](Self::trim), with bounds given as `YYYY-MM-DD` or
    /// `YYYY-MM-DD HH:MM:SS` (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidDate`] if a bound cannot be parsed.
    pub fn trim_dates(&self, start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = start.map(parse_bound).transpose()?;
        let end = end.map(parse_bound).transpose()?;
        Ok(self.trim(start, end))
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// One line per message, in collection order.
    ///
    /// Text-less messages produce an empty line. With `include_reactions`,
    /// each line is followed by its reactions as ` [loved, liked]`.
    pub fn as_string(&self, include_reactions: bool) -> String {
        self.messages
            .iter()
            .map(|m| m.render(include_reactions))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// A new collection with `messages` merged in by timestamp.
    ///
    /// New messages receive ids after the current maximum, in arrival order.
    /// On equal timestamps existing messages come first.
    pub fn append(&self, mut messages: Vec<Message>) -> Self {
        let next_id = self.messages.iter().map(|m| m.id.0 + 1).max().unwrap_or(0);
        assign_ids(&mut messages, next_id);
        messages.sort_by_key(|m| m.timestamp);

        let mut merged = Vec::with_capacity(self.messages.len() + messages.len());
        let mut existing = self.messages.iter().peekable();
        for message in messages {
            while let Some(current) = existing.next_if(|m| m.timestamp <= message.timestamp) {
                merged.push(Arc::clone(current));
            }
            merged.push(Arc::new(message));
        }
        merged.extend(existing.cloned());
        trace!(messages = merged.len(), "appended to collection");
        Self::from_shared(merged)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterates messages in order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().map(unshare)
    }

    /// The shared messages, in order.
    pub fn shared(&self) -> &[Arc<Message>] {
        &self.messages
    }

    /// Earliest message.
    pub fn first(&self) -> Option<&Message> {
        self.messages.first().map(unshare)
    }

    /// Latest message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last().map(unshare)
    }

    /// Every attachment, in message order.
    pub fn attachments(&self) -> Vec<AttachmentRef> {
        self.messages
            .iter()
            .flat_map(|m| {
                (0..m.attachments.len()).map(move |index| AttachmentRef::new(Arc::clone(m), index))
            })
            .collect()
    }

    /// The reaction aggregate over every message.
    pub fn reactions(&self) -> Reactions {
        Reactions::from_messages(self.iter())
    }
}

impl TemporalStats for MessageCollection {
    fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

impl<'a> IntoIterator for &'a MessageCollection {
    type Item = &'a Message;
    type IntoIter =
        std::iter::Map<std::slice::Iter<'a, Arc<Message>>, fn(&'a Arc<Message>) -> &'a Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter().map(unshare as fn(&'a Arc<Message>) -> &'a Message)
    }
}

fn unshare(message: &Arc<Message>) -> &Message {
    message
}

fn parse_bound(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(datetime.and_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| ChatstatError::invalid_date(input))
}

#[cfg(feature = "export-csv")]
fn load_csv_export(path: &std::path::Path, config: &CsvExportConfig) -> Result<MessageCollection> {
    MessageCollection::from_csv_export(path, config.clone())
}

#[cfg(not(feature = "export-csv"))]
fn load_csv_export(_path: &std::path::Path, _config: &CsvExportConfig) -> Result<MessageCollection> {
    Err(ChatstatError::source_disabled("delimited export", "export-csv"))
}

#[cfg(feature = "device-db")]
fn load_device_db(path: &std::path::Path, config: &DeviceDbConfig) -> Result<MessageCollection> {
    MessageCollection::from_device_db(path, config.clone())
}

#[cfg(not(feature = "device-db"))]
fn load_device_db(_path: &std::path::Path, _config: &DeviceDbConfig) -> Result<MessageCollection> {
    Err(ChatstatError::source_disabled("device rows", "device-db"))
}

#[cfg(feature = "synthetic")]
fn load_synthetic(config: &SyntheticConfig) -> Result<MessageCollection> {
    MessageCollection::from_synthetic(config.clone())
}

#[cfg(not(feature = "synthetic"))]
fn load_synthetic(_config: &SyntheticConfig) -> Result<MessageCollection> {
    Err(ChatstatError::source_disabled("synthetic", "synthetic"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::message::MessageId;
    use crate::reaction::ReactionName;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn msg(d: u32, h: u32, dir: Direction, text: &str) -> Message {
        Message::new(at(d, h), dir).with_text(text)
    }

    fn sample() -> MessageCollection {
        MessageCollection::new(vec![
            msg(1, 9, Direction::Sent, "a"),
            msg(1, 15, Direction::Received, "b"),
            msg(3, 10, Direction::Sent, "c"),
        ])
    }

    #[test]
    fn test_new_sorts_and_numbers_in_arrival_order() {
        let collection = MessageCollection::new(vec![
            msg(2, 0, Direction::Sent, "late"),
            msg(1, 0, Direction::Sent, "early"),
            msg(2, 0, Direction::Received, "late tie"),
        ]);
        let texts: Vec<_> = collection.iter().map(|m| m.text().unwrap()).collect();
        assert_eq!(texts, vec!["early", "late", "late tie"]);
        let ids: Vec<_> = collection.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MessageId(1), MessageId(0), MessageId(2)]);
    }

    #[test]
    fn test_direction_views_partition() {
        let collection = sample();
        assert_eq!(collection.get_sent().len(), 2);
        assert_eq!(collection.get_received().len(), 1);
        assert_eq!(collection.get_all().len(), 3);
        assert!(collection.get_sent().iter().all(|m| m.is_sent()));
    }

    #[test]
    fn test_views_share_messages() {
        let collection = sample();
        let sent = collection.get_sent();
        assert!(Arc::ptr_eq(&sent.shared()[0], &collection.shared()[0]));
    }

    #[test]
    fn test_trim_half_open() {
        let collection = sample();
        assert_eq!(collection.trim(Some(at(1, 9)), Some(at(1, 15))).len(), 1);
        assert_eq!(collection.trim(Some(at(1, 10)), None).len(), 2);
        assert_eq!(collection.trim(None, Some(at(3, 10))).len(), 2);
        assert_eq!(collection.trim(None, None).len(), 3);
        assert!(collection.trim(Some(at(3, 11)), Some(at(1, 0))).is_empty());
    }

    #[test]
    fn test_trim_dates() {
        let collection = sample();
        let day_one = collection.trim_dates(Some("2024-01-01"), Some("2024-01-02")).unwrap();
        assert_eq!(day_one.len(), 2);
        let afternoon = collection
            .trim_dates(Some("2024-01-01 12:00:00"), None)
            .unwrap();
        assert_eq!(afternoon.len(), 2);
    }

    #[test]
    fn test_trim_dates_invalid() {
        let err = sample().trim_dates(Some("01/02/2024"), None).unwrap_err();
        assert!(err.is_invalid_date());
    }

    #[test]
    fn test_as_string() {
        let loved = ReactionName::new("loved").unwrap();
        let liked = ReactionName::new("liked").unwrap();
        let collection = MessageCollection::new(vec![
            msg(1, 0, Direction::Sent, "hi").with_reaction(loved).with_reaction(liked),
            Message::new(at(1, 1), Direction::Received),
            msg(1, 2, Direction::Sent, "two\nlines"),
        ]);
        assert_eq!(collection.as_string(false), "hi\n\ntwo lines");
        assert_eq!(collection.as_string(true), "hi [loved, liked]\n\ntwo lines");
    }

    #[test]
    fn test_append_merges_and_numbers() {
        let collection = sample();
        let appended = collection.append(vec![
            msg(2, 0, Direction::Received, "new"),
            msg(1, 9, Direction::Received, "tie"),
        ]);
        let texts: Vec<_> = appended.iter().map(|m| m.text().unwrap()).collect();
        assert_eq!(texts, vec!["a", "tie", "b", "new", "c"]);
        let new = appended.iter().find(|m| m.text() == Some("new")).unwrap();
        assert_eq!(new.id, MessageId(3));
        let tie = appended.iter().find(|m| m.text() == Some("tie")).unwrap();
        assert_eq!(tie.id, MessageId(4));
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_append_to_empty() {
        let appended = MessageCollection::default().append(vec![msg(1, 0, Direction::Sent, "x")]);
        assert_eq!(appended.len(), 1);
        assert_eq!(appended.first().unwrap().id, MessageId(0));
    }

    #[test]
    fn test_attachments_and_reactions() {
        let loved = ReactionName::new("loved").unwrap();
        let collection = MessageCollection::new(vec![
            msg(1, 0, Direction::Sent, "pics")
                .with_attachment(Some("a.jpg".into()))
                .with_attachment(Some("b.png".into())),
            msg(1, 1, Direction::Received, "nice").with_reaction(loved),
        ]);
        let attachments = collection.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[1].file_extension, "png");
        assert_eq!(collection.reactions().count("loved").unwrap(), 1);
    }

    #[test]
    fn test_temporal_stats_on_collection() {
        let collection = sample();
        assert_eq!(collection.total(), 3);
        assert_eq!(collection.days_without_activity(), 1);
    }

    #[cfg(feature = "synthetic")]
    #[test]
    fn test_load_descriptor_synthetic() {
        let config = SyntheticConfig::new().with_seed(9).with_total_messages(12);
        let collection = MessageCollection::load(&SourceDescriptor::synthetic(config)).unwrap();
        assert_eq!(collection.len(), 12);
    }

    #[cfg(feature = "export-csv")]
    #[test]
    fn test_load_descriptor_missing_file() {
        let err = MessageCollection::load(&SourceDescriptor::export_csv("/no/such/file.csv"))
            .unwrap_err();
        assert!(err.is_io());
    }
}
