use std::sync::Arc;

use crate::aggregate::{TemporalStats, Timeline};
use crate::collection::MessageCollection;
use crate::error::{ChatstatError, Result};
use crate::message::Message;

/// Statistics over the text-bearing messages of a collection.
///
/// Messages without text (or with only whitespace) are excluded from every
/// statistic, including the temporal ones.
#[derive(Debug, Clone)]
pub struct TextAnalyzer {
    messages: Vec<Arc<Message>>,
    timeline: Timeline,
}

impl TextAnalyzer {
    /// Creates an analyzer over the text-bearing messages of `collection`.
    pub fn new(collection: &MessageCollection) -> Self {
        let messages: Vec<Arc<Message>> = collection
            .shared()
            .iter()
            .filter(|m| !m.is_empty())
            .cloned()
            .collect();
        let timeline = Timeline::from_items(messages.iter());
        Self { messages, timeline }
    }

    /// The analyzed messages, in order.
    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    fn texts(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(|m| m.text())
    }

    /// Non-overlapping, case-sensitive occurrences of `needle` across all
    /// texts. An empty needle matches nothing.
    pub fn count_of_substring(&self, needle: &str) -> usize {
        if needle.is_empty() {
            return 0;
        }
        self.texts().map(|text| text.matches(needle).count()).sum()
    }

    /// Mean text length in characters.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::ZeroDenominator`] when there is no text.
    pub fn average_length(&self) -> Result<f64> {
        if self.messages.is_empty() {
            return Err(ChatstatError::zero_denominator("average length"));
        }
        let chars: usize = self.texts().map(|text| text.chars().count()).sum();
        Ok(chars as f64 / self.messages.len() as f64)
    }

    /// Most messages in a row exchanged in the same direction.
    ///
    /// Only meaningful on an unfiltered collection. Zero when empty.
    pub fn longest_unidirectional_run(&self) -> usize {
        let mut longest = 0;
        let mut run = 0;
        let mut previous = None;
        for message in &self.messages {
            if previous == Some(message.direction) {
                run += 1;
            } else {
                run = 1;
                previous = Some(message.direction);
            }
            longest = longest.max(run);
        }
        longest
    }
}

impl TemporalStats for TextAnalyzer {
    fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}
