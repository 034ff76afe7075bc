use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

use crate::aggregate::{FrequencyTable, TemporalStats, Timeline};
use crate::collection::MessageCollection;
use crate::message::Message;

/// Distinct emoji in `text`, in order of first appearance.
///
/// Works on grapheme clusters, so sequences such as `❤️`, `👍🏽` or family
/// emoji are kept whole.
///
/// ```
/// use chatstat::analysis::extract_emojis;
///
/// assert_eq!(extract_emojis("ha 😂😂 ok ❤️"), vec!["😂", "❤️"]);
/// assert!(extract_emojis("plain text 123").is_empty());
/// ```
pub fn extract_emojis(text: &str) -> Vec<&str> {
    let mut found: Vec<&str> = Vec::new();
    for grapheme in text.graphemes(true) {
        if !grapheme.is_ascii() && is_emoji(grapheme) && !found.contains(&grapheme) {
            found.push(grapheme);
        }
    }
    found
}

/// Looks the cluster up as is, then without skin tones and variation
/// selectors.
fn is_emoji(cluster: &str) -> bool {
    if emojis::get(cluster).is_some() {
        return true;
    }
    let base: String = cluster
        .chars()
        .filter(|c| !matches!(c, '\u{FE0F}' | '\u{1F3FB}'..='\u{1F3FF}'))
        .collect();
    !base.is_empty() && emojis::get(&base).is_some()
}

/// One emoji and the messages containing it.
#[derive(Clone)]
pub struct Emoji {
    name: String,
    messages: Vec<Arc<Message>>,
    timeline: Timeline,
}

impl Emoji {
    /// The emoji itself.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Messages containing the emoji, in order.
    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    /// Number of messages containing the emoji.
    pub fn count(&self) -> usize {
        self.messages.len()
    }
}

impl fmt::Debug for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emoji")
            .field("name", &self.name)
            .field("count", &self.count())
            .finish()
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl TemporalStats for Emoji {
    fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

/// Emoji usage across a collection.
///
/// Each emoji counts once per message that contains it, no matter how often
/// it is repeated inside that message.
#[derive(Debug, Clone)]
pub struct EmojiAnalyzer {
    emojis: Vec<Emoji>,
    index: HashMap<String, usize>,
    counts: FrequencyTable<String>,
    timeline: Timeline,
}

impl EmojiAnalyzer {
    /// Scans every text in `collection`.
    pub fn new(collection: &MessageCollection) -> Self {
        let mut owners: Vec<(String, Vec<Arc<Message>>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut counts = FrequencyTable::new();
        let mut occurrences = Vec::new();

        for message in collection.shared() {
            let Some(text) = message.text() else {
                continue;
            };
            for emoji in extract_emojis(text) {
                let pos = *index.entry(emoji.to_string()).or_insert_with(|| {
                    owners.push((emoji.to_string(), Vec::new()));
                    owners.len() - 1
                });
                owners[pos].1.push(Arc::clone(message));
                counts.record(emoji.to_string());
                occurrences.push(message.timestamp);
            }
        }

        let emojis = owners
            .into_iter()
            .map(|(name, messages)| {
                let timeline = Timeline::from_items(messages.iter());
                Emoji {
                    name,
                    messages,
                    timeline,
                }
            })
            .collect();

        Self {
            emojis,
            index,
            counts,
            timeline: Timeline::from_instants(occurrences),
        }
    }

    /// Distinct emoji, in order of first appearance.
    pub fn uniques(&self) -> Vec<&str> {
        self.emojis.iter().map(Emoji::name).collect()
    }

    /// Every tracked emoji, in order of first appearance.
    pub fn emojis(&self) -> &[Emoji] {
        &self.emojis
    }

    /// The tracked emoji with this name.
    pub fn emoji(&self, name: &str) -> Option<&Emoji> {
        self.index.get(name).map(|&pos| &self.emojis[pos])
    }

    /// Number of messages containing `name`; zero if never seen.
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name)
    }

    /// Message counts per emoji.
    pub fn counts(&self) -> &FrequencyTable<String> {
        &self.counts
    }

    /// The `n` most used emoji. Ties keep first-appearance order.
    pub fn most_frequent(&self, n: usize) -> Vec<(String, usize)> {
        self.counts.most_frequent(n)
    }
}

/// Temporal statistics over every emoji occurrence (one per emoji per
/// message).
impl TemporalStats for EmojiAnalyzer {
    fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::message::Direction;

    fn collection(texts: &[&str]) -> MessageCollection {
        MessageCollection::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    Message::new(
                        Utc.with_ymd_and_hms(2024, 3, 1 + i as u32, 8, 0, 0).unwrap(),
                        Direction::Sent,
                    )
                    .with_text(*text)
                })
                .collect(),
        )
    }

    #[test]
    fn test_repeated_emoji_counts_once_per_message() {
        let analyzer = EmojiAnalyzer::new(&collection(&["😂😂😂 lol"]));
        assert_eq!(analyzer.count("😂"), 1);
        assert_eq!(analyzer.emoji("😂").unwrap().count(), 1);
    }

    #[test]
    fn test_counts_and_uniques() {
        let analyzer = EmojiAnalyzer::new(&collection(&["hi 😊", "👍 and 😊", "none", "👍"]));
        assert_eq!(analyzer.uniques(), vec!["😊", "👍"]);
        assert_eq!(analyzer.count("😊"), 2);
        assert_eq!(analyzer.count("👍"), 2);
        assert_eq!(analyzer.count("🤤"), 0);
        assert_eq!(
            analyzer.most_frequent(5),
            vec![("😊".to_string(), 2), ("👍".to_string(), 2)]
        );
    }

    #[test]
    fn test_multi_codepoint_clusters() {
        let analyzer = EmojiAnalyzer::new(&collection(&["❤️ and 👍🏽"]));
        assert_eq!(analyzer.uniques(), vec!["❤️", "👍🏽"]);
    }

    #[test]
    fn test_emoji_temporal_stats() {
        let analyzer = EmojiAnalyzer::new(&collection(&["😎", "x", "x", "😎"]));
        let cool = analyzer.emoji("😎").unwrap();
        assert_eq!(cool.total(), 2);
        assert_eq!(cool.days_without_activity(), 2);
        assert_eq!(cool.longest_silence().unwrap().duration.num_days(), 3);
        assert_eq!(cool.to_string(), "😎");
    }

    #[test]
    fn test_no_emoji() {
        let analyzer = EmojiAnalyzer::new(&collection(&["plain", "text"]));
        assert!(analyzer.uniques().is_empty());
        assert!(analyzer.most_frequent(3).is_empty());
        assert!(analyzer.most_per_day().is_err());
    }
}
