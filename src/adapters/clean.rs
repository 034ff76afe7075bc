//! Cleaning helpers shared by every adapter.
//!
//! - [`device_time_to_utc`] - device-epoch nanoseconds to a UTC instant
//! - [`remove_urls`] - strip URL substrings, leaving tapbacks intact
//! - [`normalize_characters`] - typographic characters to ASCII
//! - [`Cleaner`] - all of the above plus dead-line splitting, driven by a
//!   [`CleanConfig`]

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::trace;

use crate::config::CleanConfig;
use crate::error::Result;
use crate::message::Message;
use crate::reaction::parse_tapback;

/// Seconds between the Unix epoch and the device epoch (2001-01-01 UTC).
pub const DEVICE_EPOCH_OFFSET_SECS: i64 = 978_307_200;

const NANOS_PER_SEC: i64 = 1_000_000_000;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b((?:https?://|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)",
        r"(?:[^\s()<>]+|\(([^\s()<>]+|(\([^\s()<>]+\)))*\))+",
        r"(?:\(([^\s()<>]+|(\([^\s()<>]+\)))*\)|",
        r#"[^\s`!()\[\]{};:'".,<>?«»“”‘’]))"#,
    ))
    .expect("URL pattern is valid")
});

/// Converts device-epoch nanoseconds to a UTC instant.
///
/// Returns `None` only when the result is outside chrono's range.
///
/// ```
/// use chatstat::adapters::clean::device_time_to_utc;
///
/// assert_eq!(device_time_to_utc(0).unwrap().to_rfc3339(), "2001-01-01T00:00:00+00:00");
/// assert_eq!(
///     device_time_to_utc(1_000_000_000).unwrap().to_rfc3339(),
///     "2001-01-01T00:00:01+00:00"
/// );
/// ```
pub fn device_time_to_utc(nanos: i64) -> Option<DateTime<Utc>> {
    let secs = nanos.div_euclid(NANOS_PER_SEC) + DEVICE_EPOCH_OFFSET_SECS;
    let subsec = nanos.rem_euclid(NANOS_PER_SEC) as u32;
    DateTime::from_timestamp(secs, subsec)
}

/// Strips every URL substring and trims the result.
///
/// Tapbacks (`Liked "https://…"`) are returned unchanged so that they can
/// still be matched to the message they quote.
///
/// ```
/// use chatstat::adapters::clean::remove_urls;
///
/// assert_eq!(remove_urls("look https://example.com/x?y=1 now"), "look  now");
/// assert_eq!(remove_urls(r#"Liked "https://example.com""#), r#"Liked "https://example.com""#);
/// ```
pub fn remove_urls(text: &str) -> String {
    if parse_tapback(text).is_some() {
        return text.to_string();
    }
    URL_RE.replace_all(text, "").trim().to_string()
}

/// Replaces typographic characters with ASCII and trims.
///
/// Object replacement characters and replacement characters are removed,
/// curly quotes become straight quotes and `…` becomes `...`.
pub fn normalize_characters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{FFFC}' | '\u{FFFD}' => {}
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{2026}' => out.push_str("..."),
            _ => out.push(c),
        }
    }
    out.trim().to_string()
}

/// Applies a [`CleanConfig`] to standardized messages.
#[derive(Debug, Clone)]
pub struct Cleaner {
    dead_line: Option<Regex>,
    remove_urls: bool,
    normalize_characters: bool,
}

impl Cleaner {
    /// Compiles the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ChatstatError::InvalidPattern`](crate::ChatstatError::InvalidPattern)
    /// if the dead-line pattern does not compile.
    pub fn new(config: &CleanConfig) -> Result<Self> {
        let dead_line = config
            .dead_line_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()?;
        Ok(Self {
            dead_line,
            remove_urls: config.remove_urls,
            normalize_characters: config.normalize_characters,
        })
    }

    /// Cleans one text. Returns `None` when nothing is left.
    pub fn clean_text(&self, text: &str) -> Option<String> {
        let mut text = if self.normalize_characters {
            normalize_characters(text)
        } else {
            text.to_string()
        };
        if self.remove_urls {
            text = remove_urls(&text);
        }
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Splits a message wherever a line matches the dead-line pattern.
    ///
    /// Separator lines are dropped. Each non-blank segment becomes its own
    /// message with the same timestamp, direction and handle; attachments and
    /// reactions stay with the first. A message without any non-blank segment
    /// is kept once, with no text.
    pub fn split_dead_lines(&self, message: Message) -> Vec<Message> {
        let (Some(pattern), Some(text)) = (&self.dead_line, message.text.as_deref()) else {
            return vec![message];
        };

        let mut segments: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in text.lines() {
            if pattern.is_match(line) {
                segments.push(current.join("\n"));
                current.clear();
            } else {
                current.push(line);
            }
        }
        segments.push(current.join("\n"));
        segments.retain(|segment| !segment.trim().is_empty());

        if segments.len() == 1 && segments[0] == text {
            return vec![message];
        }

        trace!(segments = segments.len(), "split dead lines");
        let mut segments = segments.into_iter();
        let mut first = message;
        first.text = segments.next();
        let mut out = Vec::with_capacity(1 + segments.len());
        let rest: Vec<Message> = segments
            .map(|segment| {
                Message::new(first.timestamp, first.direction)
                    .with_handle(first.handle.clone())
                    .with_text(segment)
            })
            .collect();
        out.push(first);
        out.extend(rest);
        out
    }

    /// Splits every message on dead lines, preserving order.
    pub fn split_messages(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
            .into_iter()
            .flat_map(|message| self.split_dead_lines(message))
            .collect()
    }

    /// Applies [`clean_text`](Self::clean_text) to every message.
    pub fn clean_texts(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
            .into_iter()
            .map(|mut message| {
                message.text = message.text.as_deref().and_then(|t| self.clean_text(t));
                message
            })
            .collect()
    }

    /// Runs every enabled step over `messages`, preserving order.
    pub fn clean_messages(&self, messages: Vec<Message>) -> Vec<Message> {
        self.clean_texts(self.split_messages(messages))
    }
}
