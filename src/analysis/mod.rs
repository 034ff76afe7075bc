//! Analyzers over a [`MessageCollection`](crate::collection::MessageCollection).
//!
//! Every analyzer is built from a collection (usually a direction or date
//! view of one) and exposes [`TemporalStats`](crate::aggregate::TemporalStats)
//! over the entities it tracks, plus entity-specific queries:
//!
//! | Analyzer | Entity | Extra queries |
//! |----------|--------|---------------|
//! | [`TextAnalyzer`] | text-bearing messages | substring counts, average length, runs |
//! | [`AttachmentAnalyzer`] | attachments | counts by file type |
//! | [`EmojiAnalyzer`] | emoji, once per message | uniques, ranking |
//! | [`ReactionAnalyzer`] | reactions | counts by name, reacted messages |
//! | [`SentimentAnalyzer`] | text-bearing messages | average polarity |
//! | [`WordFrequencies`] | words | ranking after [`build`](WordFrequencies::build) |
//!
//! # Example
//!
//! ```
//! use chatstat::aggregate::TemporalStats;
//! use chatstat::analysis::{EmojiAnalyzer, TextAnalyzer};
//! use chatstat::collection::MessageCollection;
//! use chatstat::message::{Direction, Message};
//! use chrono::{TimeZone, Utc};
//!
//! let at = |h| Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap();
//! let collection = MessageCollection::new(vec![
//!     Message::new(at(9), Direction::Sent).with_text("good morning 😂😂"),
//!     Message::new(at(10), Direction::Received).with_text("morning! 😂"),
//! ]);
//!
//! let text = TextAnalyzer::new(&collection);
//! assert_eq!(text.count_of_substring("morning"), 2);
//! assert_eq!(text.total(), 2);
//!
//! let emoji = EmojiAnalyzer::new(&collection);
//! assert_eq!(emoji.count("😂"), 2);
//! ```

mod attachments;
mod emoji;
mod reactions;
mod sentiment;
mod text;
mod words;

pub use attachments::{AttachmentAnalyzer, AttachmentRef};
pub use emoji::{Emoji, EmojiAnalyzer, extract_emojis};
pub use reactions::ReactionAnalyzer;
pub use sentiment::{PolarityScorer, SentimentAnalyzer};
pub use text::TextAnalyzer;
pub use words::{DEFAULT_STOPWORDS, WordFrequencies};
