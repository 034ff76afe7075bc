//! Reactions ("tapbacks") and their aggregate.
//!
//! Reaction names form a closed set ([`VALID_REACTION_NAMES`]). A
//! [`ReactionName`] can only be constructed from a member of that set, so
//! every reaction stored on a [`Message`] has already been validated.
//!
//! [`Reactions`] maps each valid name to the set of messages carrying it.
//! [`Reactions::update`] is the one mutating operation in the crate: it merges
//! new observations into the aggregate in place. [`Reactions::merged`] is the
//! non-mutating equivalent.
//!
//! # Example
//!
//! ```
//! use chatstat::message::MessageId;
//! use chatstat::reaction::{ReactionName, Reactions};
//!
//! # fn main() -> chatstat::Result<()> {
//! let loved = ReactionName::new("loved")?;
//! assert_eq!(loved.as_str(), "loved");
//! assert!(ReactionName::new("bogus").is_err());
//!
//! let mut reactions = Reactions::new();
//! reactions.update([("loved", MessageId(1)), ("Loved", MessageId(1))])?;
//! assert_eq!(reactions.count("loved")?, 1);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ChatstatError, Result};
use crate::message::{Message, MessageId};

/// Every valid reaction name, in canonical (lower-case) form.
pub const VALID_REACTION_NAMES: &[&str] = &[
    "liked",
    "disliked",
    "loved",
    "laughed",
    "emphasized",
    "questioned",
];

/// Tapback verbs as they appear in exported message text.
const TAPBACK_VERBS: &[(&str, &str)] = &[
    ("Liked", "liked"),
    ("Disliked", "disliked"),
    ("Loved", "loved"),
    ("Laughed at", "laughed"),
    ("Emphasized", "emphasized"),
    ("Questioned", "questioned"),
];

static TAPBACK_RE: LazyLock<Regex> = LazyLock::new(|| {
    let verbs: Vec<&str> = TAPBACK_VERBS.iter().map(|(verb, _)| *verb).collect();
    Regex::new(&format!(r#"(?s)^({}) "(.*)"$"#, verbs.join("|")))
        .expect("tapback pattern is valid")
});

/// A validated reaction name.
///
/// # Example
///
/// ```
/// use chatstat::reaction::ReactionName;
///
/// let name = ReactionName::new("Emphasized").unwrap();
/// assert_eq!(name.to_string(), "emphasized");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct ReactionName(&'static str);

impl ReactionName {
    /// Validates `name` against the closed set (ASCII case-insensitive).
    ///
    /// Tapback phrases such as `Laughed at` are accepted too and map to
    /// their canonical name.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidReaction`] carrying the offending name
    /// and the complete valid set.
    pub fn new(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        VALID_REACTION_NAMES
            .iter()
            .find(|valid| valid.eq_ignore_ascii_case(trimmed))
            .or_else(|| {
                TAPBACK_VERBS
                    .iter()
                    .find(|(verb, _)| verb.eq_ignore_ascii_case(trimmed))
                    .map(|(_, valid)| valid)
            })
            .map(|valid| ReactionName(*valid))
            .ok_or_else(|| ChatstatError::invalid_reaction(name))
    }

    /// Returns the canonical name.
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Returns every valid reaction name, in canonical order.
    pub fn all() -> impl Iterator<Item = ReactionName> {
        VALID_REACTION_NAMES.iter().map(|name| ReactionName(*name))
    }

    fn from_verb(verb: &str) -> Option<Self> {
        TAPBACK_VERBS
            .iter()
            .find(|(v, _)| *v == verb)
            .map(|(_, name)| ReactionName(*name))
    }
}

impl fmt::Display for ReactionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl TryFrom<String> for ReactionName {
    type Error = ChatstatError;

    fn try_from(value: String) -> Result<Self> {
        ReactionName::new(&value)
    }
}

impl<'de> Deserialize<'de> for ReactionName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        ReactionName::new(&name).map_err(serde::de::Error::custom)
    }
}

impl From<ReactionName> for String {
    fn from(value: ReactionName) -> Self {
        value.0.to_string()
    }
}

/// Recognizes a tapback message such as `Loved "see you soon"`.
///
/// Returns the reaction and the quoted text of the message it targets.
///
/// ```
/// use chatstat::reaction::parse_tapback;
///
/// let (name, quoted) = parse_tapback(r#"Laughed at "nice try""#).unwrap();
/// assert_eq!(name.as_str(), "laughed");
/// assert_eq!(quoted, "nice try");
/// assert!(parse_tapback("Loved it").is_none());
/// ```
pub fn parse_tapback(text: &str) -> Option<(ReactionName, &str)> {
    let caps = TAPBACK_RE.captures(text)?;
    let name = ReactionName::from_verb(caps.get(1)?.as_str())?;
    Some((name, caps.get(2)?.as_str()))
}

/// One reaction and the messages carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    name: ReactionName,
    messages: BTreeSet<MessageId>,
}

impl Reaction {
    /// Creates a reaction with no messages.
    pub fn new(name: ReactionName) -> Self {
        Self {
            name,
            messages: BTreeSet::new(),
        }
    }

    /// Returns the reaction name.
    pub fn name(&self) -> ReactionName {
        self.name
    }

    /// Returns the ids of the messages carrying this reaction.
    pub fn messages(&self) -> &BTreeSet<MessageId> {
        &self.messages
    }

    /// Number of distinct messages carrying this reaction.
    pub fn count(&self) -> usize {
        self.messages.len()
    }
}

/// Aggregate of every valid reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reactions {
    reactions: Vec<Reaction>,
}

impl Default for Reactions {
    fn default() -> Self {
        Self::new()
    }
}

impl Reactions {
    /// Creates an aggregate holding every valid name with no messages.
    pub fn new() -> Self {
        Self {
            reactions: ReactionName::all().map(Reaction::new).collect(),
        }
    }

    /// Builds the aggregate from the reactions stored on `messages`.
    pub fn from_messages<'a, I>(messages: I) -> Self
    where
        I: IntoIterator<Item = &'a Message>,
    {
        let mut reactions = Self::new();
        for message in messages {
            for name in &message.reactions {
                reactions.insert(*name, message.id);
            }
        }
        reactions
    }

    /// Merges new observations into this aggregate **in place**.
    ///
    /// Message sets are unioned, so re-applying an observation is a no-op.
    /// Every name is validated before anything is applied: on error the
    /// aggregate is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidReaction`] for the first unknown name.
    pub fn update<I, S>(&mut self, observations: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, MessageId)>,
        S: AsRef<str>,
    {
        let validated = observations
            .into_iter()
            .map(|(name, id)| ReactionName::new(name.as_ref()).map(|name| (name, id)))
            .collect::<Result<Vec<_>>>()?;

        for (name, id) in validated {
            self.insert(name, id);
        }
        Ok(())
    }

    /// Returns a new aggregate with `observations` merged in.
    pub fn merged<I, S>(&self, observations: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, MessageId)>,
        S: AsRef<str>,
    {
        let mut merged = self.clone();
        merged.update(observations)?;
        Ok(merged)
    }

    fn insert(&mut self, name: ReactionName, id: MessageId) {
        if let Some(reaction) = self.reactions.iter_mut().find(|r| r.name == name) {
            reaction.messages.insert(id);
        }
    }

    /// Returns the reaction with the given name.
    pub fn get(&self, name: &str) -> Result<&Reaction> {
        let name = ReactionName::new(name)?;
        self.reactions
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| ChatstatError::invalid_reaction(name.as_str()))
    }

    /// Number of messages carrying the given reaction.
    pub fn count(&self, name: &str) -> Result<usize> {
        self.get(name).map(Reaction::count)
    }

    /// Counts for every valid name, in canonical order.
    pub fn counts(&self) -> Vec<(ReactionName, usize)> {
        self.reactions.iter().map(|r| (r.name, r.count())).collect()
    }

    /// Total number of (reaction, message) pairs.
    pub fn total(&self) -> usize {
        self.reactions.iter().map(Reaction::count).sum()
    }

    /// Iterates over every reaction, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.iter()
    }
}

impl<'a> IntoIterator for &'a Reactions {
    type Item = &'a Reaction;
    type IntoIter = std::slice::Iter<'a, Reaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.reactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Direction;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_valid_name() {
        let name = ReactionName::new("loved").unwrap();
        assert_eq!(name.as_str(), "loved");
        assert_eq!(ReactionName::new("LOVED").unwrap(), name);
    }

    #[test]
    fn test_tapback_phrase_maps_to_canonical() {
        let laughed = ReactionName::new("laughed").unwrap();
        assert_eq!(ReactionName::new("Laughed at").unwrap(), laughed);
        assert_eq!(ReactionName::new("LAUGHED AT").unwrap(), laughed);
        assert_eq!(ReactionName::new(" Liked ").unwrap().as_str(), "liked");
        assert!(ReactionName::new("Laughed with").is_err());
    }

    #[test]
    fn test_invalid_name_carries_full_set() {
        let err = ReactionName::new("bogus").unwrap_err();
        match err {
            ChatstatError::InvalidReaction {
                invalid_name,
                valid_names,
                ..
            } => {
                assert_eq!(invalid_name, "bogus");
                assert_eq!(valid_names.len(), 6);
                assert!(valid_names.contains(&"questioned"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_names() {
        let names: Vec<&str> = ReactionName::all().map(|n| n.as_str()).collect();
        assert_eq!(names, VALID_REACTION_NAMES);
    }

    #[test]
    fn test_parse_tapback() {
        let (name, quoted) = parse_tapback(r#"Loved "see you soon""#).unwrap();
        assert_eq!(name.as_str(), "loved");
        assert_eq!(quoted, "see you soon");

        let (name, quoted) = parse_tapback("Emphasized \"two\nlines\"").unwrap();
        assert_eq!(name.as_str(), "emphasized");
        assert_eq!(quoted, "two\nlines");

        assert!(parse_tapback(r#"loved "lowercase verb""#).is_none());
        assert!(parse_tapback(r#"Adored "unknown verb""#).is_none());
    }

    #[test]
    fn test_update_unions_message_sets() {
        let mut reactions = Reactions::new();
        reactions
            .update([("loved", MessageId(1)), ("loved", MessageId(2))])
            .unwrap();
        reactions
            .update([("loved", MessageId(2)), ("liked", MessageId(2))])
            .unwrap();

        assert_eq!(reactions.count("loved").unwrap(), 2);
        assert_eq!(reactions.count("liked").unwrap(), 1);
        assert_eq!(reactions.count("questioned").unwrap(), 0);
        assert_eq!(reactions.total(), 3);
    }

    #[test]
    fn test_update_is_atomic_on_error() {
        let mut reactions = Reactions::new();
        let result = reactions.update([("loved", MessageId(1)), ("bogus", MessageId(2))]);
        assert!(result.is_err());
        assert_eq!(reactions.total(), 0);
    }

    #[test]
    fn test_merged_leaves_original() {
        let original = Reactions::new();
        let merged = original.merged([("liked", MessageId(5))]).unwrap();
        assert_eq!(original.total(), 0);
        assert_eq!(merged.count("liked").unwrap(), 1);
    }

    #[test]
    fn test_count_invalid_name() {
        let reactions = Reactions::new();
        assert!(reactions.count("bogus").unwrap_err().is_invalid_reaction());
    }

    #[test]
    fn test_from_messages() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let loved = ReactionName::new("loved").unwrap();
        let messages = vec![
            Message::new(ts, Direction::Sent)
                .with_id(MessageId(0))
                .with_reaction(loved),
            Message::new(ts, Direction::Received)
                .with_id(MessageId(1))
                .with_reaction(loved),
        ];
        let reactions = Reactions::from_messages(&messages);
        assert_eq!(reactions.count("loved").unwrap(), 2);
        let counts = reactions.counts();
        assert_eq!(counts.len(), VALID_REACTION_NAMES.len());
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let json = serde_json::to_string(&ReactionName::new("liked").unwrap()).unwrap();
        assert_eq!(json, "\"liked\"");
        assert!(serde_json::from_str::<ReactionName>("\"bogus\"").is_err());
        let name: ReactionName = serde_json::from_str("\"Laughed at\"").unwrap();
        assert_eq!(name.as_str(), "laughed");
    }
}
