use std::sync::Arc;

use crate::collection::MessageCollection;
use crate::error::{ChatstatError, Result};
use crate::message::Message;

/// Scores the polarity of a piece of text.
///
/// Scores are expected in `-1.0..=1.0`, negative to positive, but nothing
/// enforces the range. Any `Fn(&str) -> f64` is a scorer.
pub trait PolarityScorer: Send + Sync {
    /// Polarity of `text`.
    fn polarity(&self, text: &str) -> f64;
}

impl<F> PolarityScorer for F
where
    F: Fn(&str) -> f64 + Send + Sync,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Average polarity of the text-bearing messages of a collection.
///
/// # Example
///
/// ```
/// use chatstat::analysis::SentimentAnalyzer;
/// use chatstat::collection::MessageCollection;
/// use chatstat::message::{Direction, Message};
/// use chrono::Utc;
///
/// let collection = MessageCollection::new(vec![
///     Message::new(Utc::now(), Direction::Sent).with_text("great"),
///     Message::new(Utc::now(), Direction::Received).with_text("awful"),
/// ]);
///
/// let scorer = |text: &str| if text.contains("great") { 1.0 } else { -0.5 };
/// let sentiment = SentimentAnalyzer::new(&collection, scorer);
/// assert_eq!(sentiment.average_polarity().unwrap(), 0.25);
/// ```
pub struct SentimentAnalyzer<S> {
    scorer: S,
    messages: Vec<Arc<Message>>,
}

impl<S: PolarityScorer> SentimentAnalyzer<S> {
    /// Creates an analyzer over the text-bearing messages of `collection`.
    pub fn new(collection: &MessageCollection, scorer: S) -> Self {
        let messages = collection
            .shared()
            .iter()
            .filter(|m| !m.is_empty())
            .cloned()
            .collect();
        Self { scorer, messages }
    }

    /// The scorer in use.
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// The scored messages, in order.
    pub fn messages(&self) -> &[Arc<Message>] {
        &self.messages
    }

    /// Each message with its polarity, in order.
    pub fn polarities(&self) -> Vec<(Arc<Message>, f64)> {
        self.messages
            .iter()
            .filter_map(|m| {
                let text = m.text()?;
                Some((Arc::clone(m), self.scorer.polarity(text)))
            })
            .collect()
    }

    /// Arithmetic mean of the polarities.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::ZeroDenominator`] when there is no text to
    /// score.
    pub fn average_polarity(&self) -> Result<f64> {
        if self.messages.is_empty() {
            return Err(ChatstatError::zero_denominator("average polarity"));
        }
        let sum: f64 = self.polarities().iter().map(|(_, p)| p).sum();
        Ok(sum / self.messages.len() as f64)
    }
}

impl<S> std::fmt::Debug for SentimentAnalyzer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAnalyzer")
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}
