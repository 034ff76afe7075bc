//! Edge case tests for chatstat
//!
//! These tests cover boundary conditions that the unit and integration tests
//! don't reach: empty inputs, single items, cleaning corner cases and error
//! reporting.

use chatstat::adapters::clean::{Cleaner, normalize_characters, remove_urls};
use chatstat::adapters::{CsvExportAdapter, DeviceDbAdapter, MessageGenerator, SyntheticRow};
use chatstat::prelude::*;
use chrono::{NaiveDate, TimeZone, Utc};

fn at(d: u32, h: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
}

// =========================================================================
// Empty and tiny collections
// =========================================================================

#[test]
fn test_empty_collection_statistics() {
    let empty = MessageCollection::default();
    assert_eq!(empty.total(), 0);
    assert!(empty.per_day().is_empty());
    assert_eq!(empty.days_with_activity(), 0);
    assert_eq!(empty.days_without_activity(), 0);
    assert!(empty.most_per_day().unwrap_err().is_precondition());
    assert!(empty.least_per_day().unwrap_err().is_precondition());
    assert!(empty.longest_silence().unwrap_err().is_precondition());
    assert!(empty.most_consecutive_days().unwrap_err().is_precondition());
    assert!(empty.average_per_day(DayDivisor::ActiveDays).unwrap_err().is_precondition());
    assert_eq!(empty.as_string(true), "");
}

#[test]
fn test_single_message() {
    let one = MessageCollection::new(vec![Message::new(at(5, 12), Direction::Sent).with_text("hi")]);
    assert_eq!(one.most_per_day().unwrap(), (NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(), 1));
    let err = one.longest_silence().unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains('2'));
    assert!(one.datetime_of_longest_silence().is_err());
    assert_eq!(one.days_without_activity(), 0);
}

#[test]
fn test_same_instant_messages() {
    let collection = MessageCollection::new(vec![
        Message::new(at(1, 8), Direction::Sent).with_text("first"),
        Message::new(at(1, 8), Direction::Received).with_text("second"),
    ]);
    // equal timestamps keep arrival order
    assert_eq!(collection.as_string(false), "first\nsecond");
    assert_eq!(collection.longest_silence().unwrap().duration.num_seconds(), 0);
    assert_eq!(collection.most_consecutive_days().unwrap().days, 1);
}

#[test]
fn test_trim_with_inverted_bounds_is_empty() {
    let collection = MessageCollection::new(vec![
        Message::new(at(1, 8), Direction::Sent),
        Message::new(at(3, 8), Direction::Sent),
    ]);
    assert!(collection.trim(Some(at(3, 0)), Some(at(1, 0))).is_empty());
    assert_eq!(collection.trim(Some(at(3, 8)), None).len(), 1);
    assert!(collection.trim(None, Some(at(1, 8))).is_empty());
}

#[test]
fn test_trim_dates_rejects_garbage() {
    let collection = MessageCollection::default();
    let err = collection.trim_dates(Some("01/02/2024"), None).unwrap_err();
    assert!(err.is_invalid_date());
    assert!(collection.trim_dates(Some("2024-01-02 10:00:00"), Some("2024-02-01")).is_ok());
}

// =========================================================================
// Cleaning
// =========================================================================

#[test]
fn test_unicode_survives_cleaning() {
    assert_eq!(normalize_characters("Привет мир!"), "Привет мир!");
    assert_eq!(normalize_characters("こんにちは\u{FFFC}"), "こんにちは");
    assert_eq!(normalize_characters("\u{201C}ok\u{201D} it\u{2019}s fine\u{2026}"), "\"ok\" it's fine...");
}

#[test]
fn test_remove_urls_variants() {
    assert_eq!(remove_urls("www.example.com"), "");
    assert_eq!(remove_urls("go to example.org/path today"), "go to  today");
    assert_eq!(remove_urls("no links here."), "no links here.");
}

#[test]
fn test_dead_lines_split_multiline_text() {
    let cleaner = Cleaner::new(&CleanConfig::new()).unwrap();
    let message = Message::new(at(1, 9), Direction::Received)
        .with_text("first block\n0\nsecond block\n0\n0")
        .with_reaction(ReactionName::new("liked").unwrap());
    let split = cleaner.clean_messages(vec![message]);

    assert_eq!(split.len(), 2);
    assert_eq!(split[0].text(), Some("first block"));
    assert_eq!(split[1].text(), Some("second block"));
    assert_eq!(split[0].reactions.len(), 1);
    assert!(split[1].reactions.is_empty());
    assert!(split.iter().all(|m| m.timestamp == at(1, 9)));
}

#[test]
fn test_invalid_dead_line_pattern() {
    let err = Cleaner::new(&CleanConfig::new().with_dead_line_pattern("(unclosed")).unwrap_err();
    assert!(matches!(err, ChatstatError::InvalidPattern(_)));
}

#[test]
fn test_cleaning_disabled() {
    let adapter = CsvExportAdapter::new(
        "unused.csv",
        CsvExportConfig::new().with_clean(CleanConfig::disabled()),
    );
    let messages = adapter.parse_str("d,f,t\n0,1,0\n0,1,see https://x.io\n").unwrap();
    assert_eq!(messages[0].text(), Some("0"));
    assert_eq!(messages[1].text(), Some("see https://x.io"));
}

// =========================================================================
// Source edge cases
// =========================================================================

#[test]
fn test_export_wrong_field_count() {
    let adapter = CsvExportAdapter::new("unused.csv", CsvExportConfig::new());
    let err = adapter.parse_str("d,f,t\n0,1\n").unwrap_err();
    assert!(err.is_load_failure());
    assert!(err.to_string().contains("expected 3 fields, found 2"));
}

#[test]
fn test_export_unmatched_tapback_is_kept() {
    let adapter = CsvExportAdapter::new("unused.csv", CsvExportConfig::new());
    let messages = adapter
        .parse_str("d,f,t\n0,1,\"Liked \"\"something never said\"\"\"\n")
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].reactions.is_empty());
}

#[test]
fn test_export_tapback_targets_latest_match() {
    let adapter = CsvExportAdapter::new("unused.csv", CsvExportConfig::new());
    let messages = adapter
        .parse_str("d,f,t\n0,1,ok\n1000000000,0,ok\n2000000000,1,\"Questioned \"\"ok\"\"\"\n")
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].reactions.is_empty());
    assert_eq!(messages[1].reactions[0].as_str(), "questioned");
}

#[test]
fn test_device_rows_empty_array() {
    let adapter = DeviceDbAdapter::new("unused.json", DeviceDbConfig::new());
    assert!(adapter.parse_str("[]").unwrap().is_empty());
    assert!(adapter.parse_str("{not json").unwrap_err().is_load_failure());
}

#[test]
fn test_device_rows_bad_flag() {
    let adapter = DeviceDbAdapter::new("unused.json", DeviceDbConfig::new());
    let err = adapter
        .parse_str(r#"[{"date": 0, "is_from_me": 7, "text": "x"}]"#)
        .unwrap_err();
    assert!(err.is_load_failure());
}

#[test]
fn test_device_epoch_negative_nanos() {
    let adapter = DeviceDbAdapter::new("unused.json", DeviceDbConfig::new());
    let messages = adapter
        .parse_str(r#"[{"date": -500000000, "is_from_me": 1, "text": "x"}]"#)
        .unwrap();
    assert_eq!(messages[0].timestamp.to_rfc3339(), "2000-12-31T23:59:59.500+00:00");
}

#[test]
fn test_generator_error_propagates() {
    let generator = || -> chatstat::Result<Vec<SyntheticRow>> {
        Err(ChatstatError::insufficient_data("generate", 1, 0))
    };
    assert!(MessageCollection::from_generator(generator).unwrap_err().is_precondition());
}

#[test]
fn test_custom_generator() {
    struct Fixed;

    impl MessageGenerator for Fixed {
        fn generate(&self) -> chatstat::Result<Vec<SyntheticRow>> {
            Ok(vec![SyntheticRow {
                timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                is_outgoing: true,
                text: "generated".into(),
                handle: "bot".into(),
            }])
        }
    }

    let collection = MessageCollection::from_generator(Fixed).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.first().unwrap().handle(), "bot");
}

#[test]
fn test_synthetic_zero_messages() {
    let collection =
        MessageCollection::from_synthetic(SyntheticConfig::new().with_total_messages(0)).unwrap();
    assert!(collection.is_empty());
}

// =========================================================================
// Analyzer edge cases
// =========================================================================

#[test]
fn test_reaction_error_lists_valid_names() {
    let collection = MessageCollection::default();
    let err = ReactionAnalyzer::new(&collection).count("bogus").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("bogus"));
    for name in chatstat::reaction::VALID_REACTION_NAMES {
        assert!(text.contains(name));
    }
}

#[test]
fn test_word_frequencies_on_empty_collection() {
    let mut words = WordFrequencies::from_collection(&MessageCollection::default());
    assert!(words.most_frequent(3).unwrap_err().is_not_ready());
    assert!(words.build().unwrap_err().is_precondition());
}

#[test]
fn test_analyzers_on_text_less_collection() {
    let collection = MessageCollection::new(vec![
        Message::new(at(1, 1), Direction::Sent).with_attachment(Some("a.gif".into())),
    ]);
    assert!(TextAnalyzer::new(&collection).average_length().is_err());
    assert!(EmojiAnalyzer::new(&collection).uniques().is_empty());
    assert!(SentimentAnalyzer::new(&collection, |_: &str| 1.0).average_polarity().is_err());
    assert_eq!(AttachmentAnalyzer::new(&collection).count_of_filetype("GIF"), 1);
}
