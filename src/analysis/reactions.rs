use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregate::Timeline;
use crate::collection::MessageCollection;
use crate::error::Result;
use crate::message::{Message, MessageId};
use crate::reaction::{ReactionName, Reactions};

/// Reaction usage across a collection.
///
/// Every query taking a name validates it first.
///
/// # Example
///
/// ```
/// use chatstat::analysis::ReactionAnalyzer;
/// use chatstat::collection::MessageCollection;
/// use chatstat::message::{Direction, Message};
/// use chatstat::reaction::ReactionName;
/// use chrono::Utc;
///
/// # fn main() -> chatstat::Result<()> {
/// let collection = MessageCollection::new(vec![
///     Message::new(Utc::now(), Direction::Sent)
///         .with_text("dinner?")
///         .with_reaction(ReactionName::new("loved")?),
/// ]);
///
/// let reactions = ReactionAnalyzer::new(&collection);
/// assert_eq!(reactions.count("Loved")?, 1);
/// assert!(reactions.count("bogus").is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReactionAnalyzer {
    reactions: Reactions,
    messages: HashMap<MessageId, Arc<Message>>,
}

impl ReactionAnalyzer {
    /// Collects the reactions stored on every message of `collection`.
    pub fn new(collection: &MessageCollection) -> Self {
        let messages = collection
            .shared()
            .iter()
            .filter(|m| !m.reactions.is_empty())
            .map(|m| (m.id, Arc::clone(m)))
            .collect();
        Self {
            reactions: collection.reactions(),
            messages,
        }
    }

    /// The underlying aggregate.
    pub fn reactions(&self) -> &Reactions {
        &self.reactions
    }

    /// Number of messages carrying the reaction `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidReaction`](crate::ChatstatError::InvalidReaction)
    /// for an unknown name.
    pub fn count(&self, name: &str) -> Result<usize> {
        self.reactions.count(name)
    }

    /// Messages carrying the reaction `name`, in time order.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidReaction`](crate::ChatstatError::InvalidReaction)
    /// for an unknown name.
    pub fn messages(&self, name: &str) -> Result<Vec<Arc<Message>>> {
        let mut messages: Vec<Arc<Message>> = self
            .reactions
            .get(name)?
            .messages()
            .iter()
            .filter_map(|id| self.messages.get(id).cloned())
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    /// Timeline of the messages carrying `name`, for use with
    /// [`TemporalStats`](crate::aggregate::TemporalStats).
    pub fn timeline(&self, name: &str) -> Result<Timeline> {
        Ok(Timeline::from_items(self.messages(name)?.iter()))
    }

    /// Count for every valid name, in canonical order.
    pub fn counts(&self) -> Vec<(ReactionName, usize)> {
        self.reactions.counts()
    }

    /// Total reactions across all names.
    pub fn total(&self) -> usize {
        self.reactions.total()
    }

    /// The `n` most used reactions. Ties keep canonical order.
    pub fn most_frequent(&self, n: usize) -> Vec<(ReactionName, usize)> {
        let mut ranked = self.counts();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}
