use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::aggregate::{FrequencyTable, TemporalStats, Timeline, Timestamped};
use crate::collection::MessageCollection;
use crate::message::{Attachment, Message, normalize_extension};

/// A shared handle to one attachment of a message.
///
/// Dereferences to [`Attachment`]; the owning message stays reachable through
/// [`message`](AttachmentRef::message).
#[derive(Clone)]
pub struct AttachmentRef {
    message: Arc<Message>,
    index: usize,
}

impl AttachmentRef {
    /// `index` must be a valid position in `message.attachments`.
    pub(crate) fn new(message: Arc<Message>, index: usize) -> Self {
        debug_assert!(index < message.attachments.len());
        Self { message, index }
    }

    /// The message that owns this attachment.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// The attachment record.
    pub fn attachment(&self) -> &Attachment {
        &self.message.attachments[self.index]
    }
}

impl Deref for AttachmentRef {
    type Target = Attachment;

    fn deref(&self) -> &Attachment {
        self.attachment()
    }
}

impl fmt::Debug for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.attachment(), f)
    }
}

impl PartialEq for AttachmentRef {
    fn eq(&self, other: &Self) -> bool {
        self.attachment() == other.attachment()
    }
}

impl Timestamped for AttachmentRef {
    fn timestamp(&self) -> DateTime<Utc> {
        self.attachment().timestamp
    }
}

/// Statistics over the attachments of a collection, grouped by file type.
///
/// # Example
///
/// ```
/// use chatstat::analysis::AttachmentAnalyzer;
/// use chatstat::collection::MessageCollection;
/// use chatstat::message::{Direction, Message};
/// use chrono::Utc;
///
/// let collection = MessageCollection::new(vec![
///     Message::new(Utc::now(), Direction::Sent)
///         .with_attachment(Some("IMG_1.JPG".into()))
///         .with_attachment(Some("clip.mov".into()))
///         .with_attachment(Some("IMG_2.jpg".into())),
/// ]);
///
/// let attachments = AttachmentAnalyzer::new(&collection);
/// assert_eq!(attachments.count_of_filetype(".jpg"), 2);
/// assert_eq!(attachments.most_frequent(1), vec![("jpg".to_string(), 2)]);
/// ```
#[derive(Debug, Clone)]
pub struct AttachmentAnalyzer {
    attachments: Vec<AttachmentRef>,
    filetypes: FrequencyTable<String>,
    timeline: Timeline,
}

impl AttachmentAnalyzer {
    /// Creates an analyzer over every attachment in `collection`.
    pub fn new(collection: &MessageCollection) -> Self {
        let attachments = collection.attachments();
        let filetypes = attachments
            .iter()
            .map(|a| a.file_extension.clone())
            .collect();
        let timeline = Timeline::from_items(attachments.iter());
        Self {
            attachments,
            filetypes,
            timeline,
        }
    }

    /// Every attachment, in message order.
    pub fn attachments(&self) -> &[AttachmentRef] {
        &self.attachments
    }

    /// Attachments with the given extension. A leading `.` and case are
    /// ignored.
    pub fn attachments_with_filetype(&self, extension: &str) -> Vec<AttachmentRef> {
        let extension = normalize_extension(extension);
        self.attachments
            .iter()
            .filter(|a| a.file_extension == extension)
            .cloned()
            .collect()
    }

    /// Number of attachments with the given extension.
    pub fn count_of_filetype(&self, extension: &str) -> usize {
        self.filetypes.get(normalize_extension(extension).as_str())
    }

    /// Counts per extension; the empty extension is its own category.
    pub fn filetype_counts(&self) -> &FrequencyTable<String> {
        &self.filetypes
    }

    /// The `n` most common extensions.
    pub fn most_frequent(&self, n: usize) -> Vec<(String, usize)> {
        self.filetypes.most_frequent(n)
    }
}

impl TemporalStats for AttachmentAnalyzer {
    fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::message::Direction;

    fn collection() -> MessageCollection {
        let at = |d| Utc.with_ymd_and_hms(2024, 2, d, 12, 0, 0).unwrap();
        MessageCollection::new(vec![
            Message::new(at(1), Direction::Sent)
                .with_attachment(Some("a.PNG".into()))
                .with_attachment(Some("b.heic".into())),
            Message::new(at(2), Direction::Received).with_text("no files"),
            Message::new(at(4), Direction::Received)
                .with_attachment(Some("c.png".into()))
                .with_attachment(Some("noext".into()))
                .with_attachment(None),
        ])
    }

    #[test]
    fn test_counts_by_filetype() {
        let analyzer = AttachmentAnalyzer::new(&collection());
        assert_eq!(analyzer.total(), 5);
        assert_eq!(analyzer.count_of_filetype("png"), 2);
        assert_eq!(analyzer.count_of_filetype(".PNG"), 2);
        assert_eq!(analyzer.count_of_filetype("gif"), 0);
        assert_eq!(analyzer.count_of_filetype(""), 2);
    }

    #[test]
    fn test_attachments_with_filetype() {
        let analyzer = AttachmentAnalyzer::new(&collection());
        let pngs = analyzer.attachments_with_filetype(".png");
        assert_eq!(pngs.len(), 2);
        assert_eq!(pngs[0].filename.as_deref(), Some("a.PNG"));
        assert_eq!(pngs[1].message().direction, Direction::Received);
    }

    #[test]
    fn test_most_frequent_ties_by_discovery() {
        let analyzer = AttachmentAnalyzer::new(&collection());
        assert_eq!(
            analyzer.most_frequent(3),
            vec![("png".to_string(), 2), ("".to_string(), 2), ("heic".to_string(), 1)]
        );
    }

    #[test]
    fn test_direction_view() {
        let received = AttachmentAnalyzer::new(&collection().get_received());
        assert_eq!(received.total(), 3);
        assert!(received.attachments().iter().all(|a| a.direction == Direction::Received));
    }

    #[test]
    fn test_temporal_stats() {
        let analyzer = AttachmentAnalyzer::new(&collection());
        assert_eq!(analyzer.days_with_activity(), 2);
        assert_eq!(analyzer.days_without_activity(), 2);
        assert_eq!(analyzer.longest_silence().unwrap().duration.num_days(), 3);
        assert_eq!(analyzer.most_per_day().unwrap().1, 3);
    }
}
