//! Synthetic adapter and the default sample generator.

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clean::Cleaner;
use crate::adapter::{Adapter, Source};
use crate::config::{CleanConfig, SyntheticConfig};
use crate::error::{ChatstatError, ParseErrorKind, Result};
use crate::message::{Direction, Message};

/// Emoji appended to sample sentences.
pub const SAMPLE_EMOJIS: &[&str] = &["😊", "😍", "😭", "😘", "😎", "❤️", "👍", "😂", "🤤"];

const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi", "aliquip",
    "commodo", "consequat", "duis", "aute", "irure", "voluptate", "velit", "esse", "cillum",
];

/// One generated row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticRow {
    /// When the message was exchanged
    pub timestamp: DateTime<Utc>,
    /// Sent by the account owner
    pub is_outgoing: bool,
    /// Message text
    pub text: String,
    /// Identifier of the other party
    pub handle: String,
}

/// Produces raw rows for [`SyntheticAdapter`].
///
/// Closures returning `Result<Vec<SyntheticRow>>` implement this trait, which
/// is convenient for fixtures:
///
/// ```rust
/// use chatstat::adapter::Adapter;
/// use chatstat::adapters::{SyntheticAdapter, SyntheticRow};
/// use chrono::Utc;
///
/// # fn main() -> chatstat::Result<()> {
/// let adapter = SyntheticAdapter::new(|| -> chatstat::Result<Vec<SyntheticRow>> {
///     Ok(vec![SyntheticRow {
///         timestamp: Utc::now(),
///         is_outgoing: true,
///         text: "fixture".to_string(),
///         handle: "me".to_string(),
///     }])
/// });
/// assert_eq!(adapter.parse()?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub trait MessageGenerator: Send + Sync {
    /// Generates every row.
    fn generate(&self) -> Result<Vec<SyntheticRow>>;
}

impl<F> MessageGenerator for F
where
    F: Fn() -> Result<Vec<SyntheticRow>> + Send + Sync,
{
    fn generate(&self) -> Result<Vec<SyntheticRow>> {
        self()
    }
}

/// Placeholder conversation generator.
///
/// Timestamps are evenly spaced or uniformly random between the configured
/// start and end. Direction alternates in runs of random length, starting
/// with a sent run. Text is a lorem-ipsum sentence with an emoji appended at
/// the configured chance.
#[derive(Debug, Clone, Default)]
pub struct SampleGenerator {
    config: SyntheticConfig,
}

impl SampleGenerator {
    /// Creates a generator with the given settings.
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    fn timestamps(&self, rng: &mut StdRng) -> Vec<DateTime<Utc>> {
        let n = self.config.total_messages;
        let start = self.config.start;
        let span_ms = (self.config.end - start).num_milliseconds();

        if self.config.uniform {
            if n == 1 {
                return vec![start];
            }
            let steps = (n - 1) as i128;
            (0..n)
                .map(|i| {
                    let offset = i128::from(span_ms) * i as i128 / steps;
                    start + TimeDelta::milliseconds(offset as i64)
                })
                .collect()
        } else {
            let mut instants: Vec<DateTime<Utc>> = (0..n)
                .map(|_| start + TimeDelta::milliseconds(rng.gen_range(0..=span_ms)))
                .collect();
            instants.sort();
            instants
        }
    }

    /// Splits `total` into `total / 2` positive run lengths.
    fn block_sizes(total: usize, rng: &mut StdRng) -> Vec<usize> {
        let blocks = (total / 2).max(1);
        if blocks == 1 {
            return vec![total];
        }
        let mut dividers: Vec<usize> = rand::seq::index::sample(rng, total - 1, blocks - 1)
            .into_iter()
            .map(|d| d + 1)
            .collect();
        dividers.sort_unstable();

        let mut sizes = Vec::with_capacity(blocks);
        let mut previous = 0;
        for divider in dividers.into_iter().chain(std::iter::once(total)) {
            sizes.push(divider - previous);
            previous = divider;
        }
        sizes
    }

    fn sentence(&self, rng: &mut StdRng) -> String {
        let len = rng.gen_range(4..=12);
        let mut words: Vec<String> = (0..len)
            .filter_map(|_| WORDS.choose(&mut *rng).map(|w| (*w).to_string()))
            .collect();
        if let Some(first) = words.first_mut() {
            let mut chars = first.chars();
            if let Some(c) = chars.next() {
                *first = c.to_uppercase().chain(chars).collect();
            }
        }
        let mut sentence = words.join(" ");
        sentence.push('.');

        let chance = self.config.emoji_chance.clamp(0.0, 1.0);
        if rng.gen_bool(chance) {
            if let Some(emoji) = SAMPLE_EMOJIS.choose(rng) {
                sentence.push(' ');
                sentence.push_str(emoji);
            }
        }
        sentence
    }
}

impl MessageGenerator for SampleGenerator {
    fn generate(&self) -> Result<Vec<SyntheticRow>> {
        if self.config.end < self.config.start {
            return Err(ChatstatError::Parse {
                format: "synthetic",
                source: ParseErrorKind::Other(format!(
                    "end {} is before start {}",
                    self.config.end, self.config.start
                )),
                path: None,
            });
        }
        if self.config.total_messages == 0 {
            return Ok(Vec::new());
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let timestamps = self.timestamps(&mut rng);
        let blocks = Self::block_sizes(timestamps.len(), &mut rng);

        let mut rows = Vec::with_capacity(timestamps.len());
        let mut instants = timestamps.into_iter();
        let mut is_outgoing = true;
        for size in blocks {
            for timestamp in instants.by_ref().take(size) {
                rows.push(SyntheticRow {
                    timestamp,
                    is_outgoing,
                    text: self.sentence(&mut rng),
                    handle: self.config.handle.clone(),
                });
            }
            is_outgoing = !is_outgoing;
        }
        Ok(rows)
    }
}

/// Adapter over any [`MessageGenerator`].
#[derive(Debug, Clone)]
pub struct SyntheticAdapter<G = SampleGenerator> {
    generator: G,
    clean: CleanConfig,
}

impl SyntheticAdapter<SampleGenerator> {
    /// An adapter over the default [`SampleGenerator`].
    pub fn sample(config: SyntheticConfig) -> Self {
        Self::new(SampleGenerator::new(config))
    }
}

impl<G: MessageGenerator> SyntheticAdapter<G> {
    /// Creates an adapter over `generator` with default cleaning.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            clean: CleanConfig::default(),
        }
    }

    /// Sets the cleaning steps.
    #[must_use]
    pub fn with_clean(mut self, clean: CleanConfig) -> Self {
        self.clean = clean;
        self
    }

    /// Returns the generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }
}

impl<G: MessageGenerator> Adapter for SyntheticAdapter<G> {
    type Raw = Vec<SyntheticRow>;

    fn name(&self) -> &'static str {
        "Synthetic"
    }

    fn source(&self) -> Source {
        Source::Synthetic
    }

    fn load(&self) -> Result<Self::Raw> {
        let rows = self.generator.generate()?;
        debug!(adapter = self.name(), rows = rows.len(), "generated rows");
        Ok(rows)
    }

    fn standardize(&self, raw: Self::Raw) -> Result<Vec<Message>> {
        Ok(raw
            .into_iter()
            .map(|row| {
                Message::new(row.timestamp, Direction::from_outgoing(row.is_outgoing))
                    .with_handle(row.handle)
                    .with_text(row.text)
            })
            .collect())
    }

    fn clean(&self, messages: Vec<Message>) -> Result<Vec<Message>> {
        let cleaner = Cleaner::new(&self.clean)?;
        Ok(cleaner.clean_messages(messages))
    }
}
