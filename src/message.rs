//! Canonical event model shared by every source.
//!
//! This module provides [`Message`], the normalized representation of one
//! exchanged message, together with the records it owns ([`Attachment`]) and
//! the [`Direction`] enum. All source adapters convert their native rows into
//! this structure, so every analyzer works the same way regardless of where
//! the data came from.
//!
//! # Overview
//!
//! A message consists of:
//! - **Required**: `timestamp` (UTC) and `direction`
//! - **Optional**: `text`, `handle`
//! - **Owned lists**: `attachments`, `reactions`
//!
//! # Examples
//!
//! ```
//! use chatstat::message::{Direction, Message};
//! use chrono::{TimeZone, Utc};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let msg = Message::new(ts, Direction::Sent)
//!     .with_text("Check out this photo")
//!     .with_handle("+15558675309")
//!     .with_attachment(Some("IMG_0042.HEIC".to_string()));
//!
//! assert_eq!(msg.text(), Some("Check out this photo"));
//! assert_eq!(msg.attachments[0].file_extension, "heic");
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reaction::ReactionName;

/// Identity of a message inside one collection.
///
/// Assigned in arrival order when a source is parsed or a collection is
/// built. Reaction aggregates deduplicate by this identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a message was sent or received by the account owner.
///
/// [`Direction::All`] is the union of both and is only meaningful as a
/// filter; standardized messages are always `Sent` or `Received`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sent by the account owner
    Sent,
    /// Received by the account owner
    Received,
    /// Both directions
    #[default]
    All,
}

impl Direction {
    /// Maps an "is outgoing" flag to a direction.
    pub fn from_outgoing(is_outgoing: bool) -> Self {
        if is_outgoing {
            Direction::Sent
        } else {
            Direction::Received
        }
    }

    /// Returns `true` if a message travelling in `other` passes this filter.
    pub fn includes(self, other: Direction) -> bool {
        match self {
            Direction::All => true,
            _ => self == other,
        }
    }

    /// Returns all directions, `All` first.
    pub fn all() -> &'static [Direction] {
        &[Direction::All, Direction::Sent, Direction::Received]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => write!(f, "sent"),
            Direction::Received => write!(f, "received"),
            Direction::All => write!(f, "all"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sent" | "sender" => Ok(Direction::Sent),
            "received" | "recipient" => Ok(Direction::Received),
            "all" | "both" => Ok(Direction::All),
            _ => Err(format!(
                "Unknown direction: '{}'. Expected one of: all, sent, received",
                s
            )),
        }
    }
}

/// A file exchanged alongside a message.
///
/// Timestamp and direction are inherited from the owning message, which is
/// referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Id of the owning message.
    pub message_id: MessageId,

    /// When the owning message was exchanged.
    pub timestamp: DateTime<Utc>,

    /// Direction of the owning message.
    pub direction: Direction,

    /// File name as found in the source, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub filename: Option<String>,

    /// Lower-cased extension derived from `filename`, without the dot.
    ///
    /// Empty when the file has no extension or no name at all; the empty
    /// extension is a category of its own.
    pub file_extension: String,
}

impl Attachment {
    /// Creates an attachment owned by `message`.
    pub fn new(message: &Message, filename: Option<String>) -> Self {
        let file_extension = filename
            .as_deref()
            .map(extension_of)
            .unwrap_or_default();
        Self {
            message_id: message.id,
            timestamp: message.timestamp,
            direction: message.direction,
            filename,
            file_extension,
        }
    }

    /// Returns `true` if this attachment has the given extension.
    ///
    /// A leading `.` and letter case are ignored.
    pub fn has_extension(&self, extension: &str) -> bool {
        self.file_extension == normalize_extension(extension)
    }
}

/// Derives the lower-cased extension of a file name.
///
/// ```
/// use chatstat::message::extension_of;
///
/// assert_eq!(extension_of("IMG_0042.HEIC"), "heic");
/// assert_eq!(extension_of("archive.tar.gz"), "gz");
/// assert_eq!(extension_of("README"), "");
/// assert_eq!(extension_of(".hidden"), "");
/// ```
pub fn extension_of(filename: &str) -> String {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(pos) => name[pos + 1..].to_lowercase(),
    }
}

/// Normalizes a user-supplied extension (`".JPG"` → `"jpg"`).
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

/// A normalized message from any supported source.
///
/// # Fields
///
/// | Field | Type | Description |
/// |-------|------|-------------|
/// | `id` | `MessageId` | Identity within the owning collection |
/// | `timestamp` | `DateTime<Utc>` | When the message was exchanged |
/// | `direction` | `Direction` | `Sent` or `Received` |
/// | `text` | `Option<String>` | Cleaned text, `None` when empty |
/// | `handle` | `String` | Phone number, e-mail or other identifier |
/// | `attachments` | `Vec<Attachment>` | Owned attachment records |
/// | `reactions` | `Vec<ReactionName>` | Reactions observed on this message |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Identity within the owning collection.
    #[serde(default)]
    pub id: MessageId,

    /// When the message was exchanged.
    pub timestamp: DateTime<Utc>,

    /// Whether the account owner sent or received the message.
    pub direction: Direction,

    /// Cleaned text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub text: Option<String>,

    /// Identifier of the other party.
    #[serde(default)]
    pub handle: String,

    /// Attachments exchanged with this message.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub attachments: Vec<Attachment>,

    /// Reactions observed on this message, in arrival order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    #[serde(default)]
    pub reactions: Vec<ReactionName>,
}

impl Message {
    /// Creates a message with no text, handle, attachments or reactions.
    ///
    /// `direction` must be [`Direction::Sent`] or [`Direction::Received`].
    ///
    /// # Panics
    ///
    /// Panics in debug builds when given [`Direction::All`].
    pub fn new(timestamp: DateTime<Utc>, direction: Direction) -> Self {
        debug_assert!(
            direction != Direction::All,
            "a stored message must be Sent or Received"
        );
        Self {
            id: MessageId::default(),
            timestamp,
            direction,
            text: None,
            handle: String::new(),
            attachments: Vec::new(),
            reactions: Vec::new(),
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Builder method to set the id.
    ///
    /// Owned attachments are re-pointed at the new id.
    #[must_use]
    pub fn with_id(mut self, id: MessageId) -> Self {
        self.set_id(id);
        self
    }

    /// Builder method to set the text. Empty text is stored as `None`.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// Builder method to set the handle.
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }

    /// Builder method to add an attachment owned by this message.
    #[must_use]
    pub fn with_attachment(mut self, filename: Option<String>) -> Self {
        let attachment = Attachment::new(&self, filename);
        self.attachments.push(attachment);
        self
    }

    /// Builder method to record a reaction on this message.
    #[must_use]
    pub fn with_reaction(mut self, reaction: ReactionName) -> Self {
        self.add_reaction(reaction);
        self
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Returns the text, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns the handle.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Returns `true` if the message has no text (or only whitespace).
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().is_none_or(|t| t.trim().is_empty())
    }

    /// Returns `true` if the message was sent by the account owner.
    pub fn is_sent(&self) -> bool {
        self.direction == Direction::Sent
    }

    // =========================================================================
    // Mutation used during standardization
    // =========================================================================

    /// Sets the id and re-points owned attachments.
    pub(crate) fn set_id(&mut self, id: MessageId) {
        self.id = id;
        for attachment in &mut self.attachments {
            attachment.message_id = id;
        }
    }

    /// Records a reaction unless the same name is already present.
    pub(crate) fn add_reaction(&mut self, reaction: ReactionName) {
        if !self.reactions.contains(&reaction) {
            self.reactions.push(reaction);
        }
    }

    /// Renders this message as one line of text.
    ///
    /// Reactions, when requested and present, are appended as
    /// ` [loved, liked]`. Line breaks inside the text are flattened to spaces
    /// so that one message always occupies exactly one line.
    pub fn render(&self, include_reactions: bool) -> String {
        let mut line = self.text.as_deref().unwrap_or_default().replace('\n', " ");
        if include_reactions && !self.reactions.is_empty() {
            let names: Vec<&str> = self.reactions.iter().map(|r| r.as_str()).collect();
            line.push_str(&format!(" [{}]", names.join(", ")));
        }
        line
    }
}

/// Assigns ids `0..n` in arrival order.
pub(crate) fn assign_ids(messages: &mut [Message], first: u64) {
    for (offset, message) in messages.iter_mut().enumerate() {
        message.set_id(MessageId(first + offset as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_message_new() {
        let msg = Message::new(ts(), Direction::Received);
        assert_eq!(msg.timestamp, ts());
        assert_eq!(msg.direction, Direction::Received);
        assert!(msg.text().is_none());
        assert!(msg.is_empty());
        assert!(msg.attachments.is_empty());
    }

    #[test]
    fn test_message_builder() {
        let msg = Message::new(ts(), Direction::Sent)
            .with_text("Hello")
            .with_handle("jane@example.com")
            .with_id(MessageId(7));

        assert_eq!(msg.text(), Some("Hello"));
        assert_eq!(msg.handle(), "jane@example.com");
        assert_eq!(msg.id, MessageId(7));
        assert!(msg.is_sent());
    }

    #[test]
    fn test_empty_text_is_none() {
        let msg = Message::new(ts(), Direction::Sent).with_text("");
        assert!(msg.text.is_none());
    }

    #[test]
    fn test_attachment_inherits_from_message() {
        let msg = Message::new(ts(), Direction::Received)
            .with_id(MessageId(3))
            .with_attachment(Some("Photo.JPG".to_string()))
            .with_attachment(None);

        assert_eq!(msg.attachments.len(), 2);
        let first = &msg.attachments[0];
        assert_eq!(first.message_id, MessageId(3));
        assert_eq!(first.timestamp, ts());
        assert_eq!(first.direction, Direction::Received);
        assert_eq!(first.file_extension, "jpg");
        assert!(first.has_extension(".JPG"));
        assert_eq!(msg.attachments[1].file_extension, "");
    }

    #[test]
    fn test_with_id_repoints_attachments() {
        let msg = Message::new(ts(), Direction::Sent)
            .with_attachment(Some("a.png".to_string()))
            .with_id(MessageId(42));
        assert_eq!(msg.attachments[0].message_id, MessageId(42));
    }

    #[test]
    fn test_extension_of_paths() {
        assert_eq!(extension_of("~/Library/Messages/Attachments/ab/IMG.MOV"), "mov");
        assert_eq!(extension_of("dir.with.dots/file"), "");
        assert_eq!(extension_of("trailing."), "");
    }

    #[test]
    fn test_direction_includes() {
        assert!(Direction::All.includes(Direction::Sent));
        assert!(Direction::All.includes(Direction::Received));
        assert!(Direction::Sent.includes(Direction::Sent));
        assert!(!Direction::Sent.includes(Direction::Received));
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("sent".parse::<Direction>().unwrap(), Direction::Sent);
        assert_eq!("RECEIVED".parse::<Direction>().unwrap(), Direction::Received);
        assert_eq!("all".parse::<Direction>().unwrap(), Direction::All);
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_render_with_reactions() {
        let msg = Message::new(ts(), Direction::Sent)
            .with_text("dinner at 8?\nor 9")
            .with_reaction(ReactionName::new("loved").unwrap())
            .with_reaction(ReactionName::new("Liked").unwrap())
            .with_reaction(ReactionName::new("loved").unwrap());

        assert_eq!(msg.render(false), "dinner at 8? or 9");
        assert_eq!(msg.render(true), "dinner at 8? or 9 [loved, liked]");
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(ts(), Direction::Sent).with_text("Hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"direction\":\"sent\""));
        assert!(!json.contains("attachments"));

        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);

        let reacted = msg.with_reaction(ReactionName::new("Laughed at").unwrap());
        let json = serde_json::to_string(&reacted).unwrap();
        assert!(json.contains("\"reactions\":[\"laughed\"]"));
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, reacted);

        let bad = json.replace("laughed", "bogus");
        assert!(serde_json::from_str::<Message>(&bad).is_err());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Sent or Received")]
    fn test_new_rejects_all_direction() {
        let _ = Message::new(ts(), Direction::All);
    }
}
