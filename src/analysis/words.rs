use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::aggregate::FrequencyTable;
use crate::collection::MessageCollection;
use crate::error::{ChatstatError, Result};

/// English words ignored unless the stop word set is replaced.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "can't", "cannot", "could", "couldn't", "did",
    "didn't", "do", "does", "doesn't", "doing", "don't", "down", "during", "each", "else",
    "ever", "few", "for", "from", "further", "get", "had", "hadn't", "has", "hasn't", "have",
    "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here", "here's", "hers",
    "herself", "him", "himself", "his", "how", "how's", "however", "i", "i'd", "i'll", "i'm",
    "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "let's",
    "like", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off",
    "on", "once", "only", "or", "other", "otherwise", "ought", "our", "ours", "ourselves",
    "out", "over", "own", "same", "shall", "shan't", "she", "she'd", "she'll", "she's",
    "should", "shouldn't", "since", "so", "some", "such", "than", "that", "that's", "the",
    "their", "theirs", "them", "themselves", "then", "there", "there's", "these", "they",
    "they'd", "they'll", "they're", "they've", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "wasn't", "we", "we'd", "we'll", "we're", "we've",
    "were", "weren't", "what", "what's", "when", "when's", "where", "where's", "which",
    "while", "who", "who's", "whom", "why", "why's", "with", "won't", "would", "wouldn't",
    "you", "you'd", "you'll", "you're", "you've", "your", "yours", "yourself", "yourselves",
];

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w[\w']+").expect("word pattern is valid"));

#[derive(Debug, Clone, Default)]
enum BuildState {
    #[default]
    Unbuilt,
    Built(FrequencyTable<String>),
}

/// Word counts over a body of text, with stop words removed.
///
/// Feeding text or changing stop words drops any previous result; queries
/// fail with [`ChatstatError::NotReady`] until [`build`](Self::build) runs.
///
/// # Example
///
/// ```
/// use chatstat::analysis::WordFrequencies;
///
/// # fn main() -> chatstat::Result<()> {
/// let mut words = WordFrequencies::new("the Pizza was great, pizza again tomorrow?");
/// assert!(words.counts().is_err());
///
/// words.build()?;
/// assert_eq!(words.counts()?.get("pizza"), 2);
/// assert_eq!(words.counts()?.get("the"), 0);
/// assert_eq!(words.most_frequent(1)?, vec![("pizza".to_string(), 2)]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WordFrequencies {
    text: String,
    stopwords: HashSet<String>,
    state: BuildState,
}

impl Default for WordFrequencies {
    fn default() -> Self {
        Self::new("")
    }
}

impl WordFrequencies {
    /// Creates an unbuilt instance over `text` with [`DEFAULT_STOPWORDS`].
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            state: BuildState::Unbuilt,
        }
    }

    /// Feeds every line of `collection`, reactions excluded.
    pub fn from_collection(collection: &MessageCollection) -> Self {
        Self::new(collection.as_string(false))
    }

    /// Feeds the contents of a plain text file.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::Io`] if the file cannot be read.
    pub fn from_text_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(fs::read_to_string(path)?))
    }

    /// Replaces the text and drops any previous result.
    pub fn feed(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.state = BuildState::Unbuilt;
    }

    /// Replaces the stop word set.
    #[must_use]
    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords = words.into_iter().map(|w| w.as_ref().to_lowercase()).collect();
        self.state = BuildState::Unbuilt;
        self
    }

    /// Adds to the stop word set and drops any previous result.
    pub fn add_stopwords<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords
            .extend(words.into_iter().map(|w| w.as_ref().to_lowercase()));
        self.state = BuildState::Unbuilt;
    }

    /// The current stop word set.
    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// Tokenizes the fed text and counts the words.
    ///
    /// Words are lower-cased, a trailing `'s` is dropped, and purely numeric
    /// tokens are skipped along with stop words.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InsufficientData`] when no text was fed.
    pub fn build(&mut self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(ChatstatError::insufficient_data("word frequencies", 1, 0));
        }

        let table: FrequencyTable<String> = WORD_RE
            .find_iter(&self.text)
            .filter_map(|m| self.normalize(m.as_str()))
            .collect();

        debug!(distinct = table.len(), words = table.total(), "built word frequencies");
        self.state = BuildState::Built(table);
        Ok(())
    }

    fn normalize(&self, token: &str) -> Option<String> {
        let word = token.to_lowercase();
        if self.stopwords.contains(&word) {
            return None;
        }
        let word = word.strip_suffix("'s").map(str::to_string).unwrap_or(word);
        if word.chars().all(|c| c.is_numeric()) || self.stopwords.contains(&word) {
            return None;
        }
        Some(word)
    }

    /// Returns `true` once [`build`](Self::build) has succeeded on the
    /// current text.
    pub fn is_built(&self) -> bool {
        matches!(self.state, BuildState::Built(_))
    }

    /// Word counts.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::NotReady`] before [`build`](Self::build).
    pub fn counts(&self) -> Result<&FrequencyTable<String>> {
        match &self.state {
            BuildState::Built(table) => Ok(table),
            BuildState::Unbuilt => Err(ChatstatError::not_ready(
                "word frequencies",
                "Call build() first.",
            )),
        }
    }

    /// The `n` most frequent words. Ties keep first-appearance order.
    pub fn most_frequent(&self, n: usize) -> Result<Vec<(String, usize)>> {
        Ok(self.counts()?.most_frequent(n))
    }
}
