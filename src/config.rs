//! Configuration types for source adapters.
//!
//! Plain structs with builder methods, usable without any framework. Every
//! struct implements `Serialize`/`Deserialize` so settings can be stored next
//! to the data they describe.
//!
//! - [`CleanConfig`] - cleaning steps shared by every adapter
//! - [`CsvExportConfig`] - delimited export settings
//! - [`DeviceDbConfig`] - pre-extracted device row settings
//! - [`SyntheticConfig`] - sample generator settings
//!
//! # Example
//!
//! ```rust
//! use chatstat::config::{CleanConfig, CsvExportConfig};
//!
//! let config = CsvExportConfig::new()
//!     .with_delimiter(b';')
//!     .with_clean(CleanConfig::new().with_remove_urls(false));
//!
//! assert_eq!(config.delimiter, b';');
//! assert!(!config.clean.remove_urls);
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default line pattern that separates independent messages inside one row.
pub const DEFAULT_DEAD_LINE_PATTERN: &str = "^0$";

/// Cleaning steps applied after standardization.
///
/// # Example
///
/// ```rust
/// use chatstat::config::CleanConfig;
///
/// let config = CleanConfig::new()
///     .with_dead_line_pattern(r"^-{3,}$")
///     .with_normalize_characters(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Regex matched against each text line; matching lines split the text
    /// into separate messages and are dropped (default: `^0$`).
    /// `None` disables splitting.
    pub dead_line_pattern: Option<String>,

    /// Strip URL substrings from text (default: true)
    pub remove_urls: bool,

    /// Replace typographic characters and trim (default: true)
    pub normalize_characters: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            dead_line_pattern: Some(DEFAULT_DEAD_LINE_PATTERN.to_string()),
            remove_urls: true,
            normalize_characters: true,
        }
    }
}

impl CleanConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that leaves text untouched.
    pub fn disabled() -> Self {
        Self {
            dead_line_pattern: None,
            remove_urls: false,
            normalize_characters: false,
        }
    }

    /// Sets the dead-line pattern.
    #[must_use]
    pub fn with_dead_line_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.dead_line_pattern = Some(pattern.into());
        self
    }

    /// Disables dead-line splitting.
    #[must_use]
    pub fn without_dead_lines(mut self) -> Self {
        self.dead_line_pattern = None;
        self
    }

    /// Sets whether URLs are removed.
    #[must_use]
    pub fn with_remove_urls(mut self, enabled: bool) -> Self {
        self.remove_urls = enabled;
        self
    }

    /// Sets whether typographic characters are normalized.
    #[must_use]
    pub fn with_normalize_characters(mut self, enabled: bool) -> Self {
        self.normalize_characters = enabled;
        self
    }
}

/// Configuration for delimited exports.
///
/// Rows carry exactly three positional fields: device-epoch timestamp in
/// nanoseconds, outgoing flag and text.
///
/// # Example
///
/// ```rust
/// use chatstat::config::CsvExportConfig;
///
/// let config = CsvExportConfig::new()
///     .with_delimiter(b'\t')
///     .with_has_header(false)
///     .with_handle("+15558675309");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvExportConfig {
    /// Field delimiter (default: `,`)
    pub delimiter: u8,

    /// Skip the first row (default: true)
    pub has_header: bool,

    /// Handle assigned to every message, since the export has no such column
    /// (default: empty)
    pub handle: String,

    /// Cleaning steps
    pub clean: CleanConfig,
}

impl Default for CsvExportConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            handle: String::new(),
            clean: CleanConfig::default(),
        }
    }
}

impl CsvExportConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether the first row is a header.
    #[must_use]
    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Sets the handle assigned to every message.
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }

    /// Sets the cleaning steps.
    #[must_use]
    pub fn with_clean(mut self, clean: CleanConfig) -> Self {
        self.clean = clean;
        self
    }
}

/// Layout of a device row file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFormat {
    /// One JSON array holding every row.
    #[default]
    JsonArray,
    /// One JSON object per line.
    JsonLines,
}

/// Configuration for pre-extracted device database rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDbConfig {
    /// Row file layout (default: JSON array)
    pub format: RowFormat,

    /// Cleaning steps
    pub clean: CleanConfig,
}

impl DeviceDbConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row file layout.
    #[must_use]
    pub fn with_format(mut self, format: RowFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the cleaning steps.
    #[must_use]
    pub fn with_clean(mut self, clean: CleanConfig) -> Self {
        self.clean = clean;
        self
    }
}

/// Configuration for the sample generator.
///
/// # Example
///
/// ```rust
/// use chatstat::config::SyntheticConfig;
///
/// let config = SyntheticConfig::new()
///     .with_total_messages(500)
///     .with_uniform(true)
///     .with_seed(7);
/// assert_eq!(config.total_messages, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// First instant (default: 2017-11-28 23:55:59 UTC)
    pub start: DateTime<Utc>,

    /// Last instant (default: 2017-12-25 17:11:22 UTC)
    pub end: DateTime<Utc>,

    /// Number of messages (default: 100)
    pub total_messages: usize,

    /// Evenly spaced timestamps instead of random ones (default: false)
    pub uniform: bool,

    /// Probability in `[0, 1]` of appending an emoji (default: 0.1)
    pub emoji_chance: f64,

    /// Handle of the other party (default: "Jane Doe")
    pub handle: String,

    /// Seed for reproducible output (default: none)
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            start: utc(2017, 11, 28, 23, 55, 59),
            end: utc(2017, 12, 25, 17, 11, 22),
            total_messages: 100,
            uniform: false,
            emoji_chance: 0.1,
            handle: "Jane Doe".to_string(),
            seed: None,
        }
    }
}

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, s))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

impl SyntheticConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time range.
    #[must_use]
    pub fn with_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Sets the number of messages.
    #[must_use]
    pub fn with_total_messages(mut self, total: usize) -> Self {
        self.total_messages = total;
        self
    }

    /// Sets whether timestamps are evenly spaced.
    #[must_use]
    pub fn with_uniform(mut self, uniform: bool) -> Self {
        self.uniform = uniform;
        self
    }

    /// Sets the emoji probability, clamped to `[0, 1]`.
    #[must_use]
    pub fn with_emoji_chance(mut self, chance: f64) -> Self {
        self.emoji_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Sets the handle of the other party.
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = handle.into();
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_config_defaults() {
        let config = CleanConfig::default();
        assert_eq!(config.dead_line_pattern.as_deref(), Some("^0$"));
        assert!(config.remove_urls);
        assert!(config.normalize_characters);
    }

    #[test]
    fn test_clean_config_disabled() {
        let config = CleanConfig::disabled();
        assert!(config.dead_line_pattern.is_none());
        assert!(!config.remove_urls);
        assert!(!config.normalize_characters);
    }

    #[test]
    fn test_csv_export_builder() {
        let config = CsvExportConfig::new()
            .with_delimiter(b'|')
            .with_has_header(false)
            .with_handle("bob")
            .with_clean(CleanConfig::new().without_dead_lines());
        assert_eq!(config.delimiter, b'|');
        assert!(!config.has_header);
        assert_eq!(config.handle, "bob");
        assert!(config.clean.dead_line_pattern.is_none());
    }

    #[test]
    fn test_device_db_builder() {
        let config = DeviceDbConfig::new().with_format(RowFormat::JsonLines);
        assert_eq!(config.format, RowFormat::JsonLines);
        assert_eq!(DeviceDbConfig::default().format, RowFormat::JsonArray);
    }

    #[test]
    fn test_synthetic_defaults() {
        let config = SyntheticConfig::default();
        assert_eq!(config.total_messages, 100);
        assert!(!config.uniform);
        assert!((config.emoji_chance - 0.1).abs() < f64::EPSILON);
        assert_eq!(config.handle, "Jane Doe");
        assert!(config.start < config.end);
        assert_eq!(config.start.to_rfc3339(), "2017-11-28T23:55:59+00:00");
    }

    #[test]
    fn test_synthetic_emoji_chance_clamped() {
        assert!((SyntheticConfig::new().with_emoji_chance(3.0).emoji_chance - 1.0).abs() < f64::EPSILON);
        assert!(SyntheticConfig::new().with_emoji_chance(-1.0).emoji_chance.abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_serde() {
        let config = CsvExportConfig::new().with_delimiter(b';');
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CsvExportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let partial: CleanConfig = serde_json::from_str(r#"{"remove_urls": false}"#).unwrap();
        assert!(!partial.remove_urls);
        assert!(partial.normalize_characters);
    }
}
