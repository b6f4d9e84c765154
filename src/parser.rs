use serde_json::{Map, Value};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::identity::{IdentitySet, TimestampMap, UserIdentity};

pub const FOLLOWING_CONTAINER_KEY: &str = "relationships_following";

const STRING_LIST_KEY: &str = "string_list_data";
const VALUE_KEY: &str = "value";
const TITLE_KEY: &str = "title";
const TIMESTAMP_KEY: &str = "timestamp";

/// Identities and timestamps collected from one or more export buffers.
///
/// The parsers never fail. Input that cannot be used is dropped and only
/// shows up in the skip counters.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub identities: IdentitySet,
    pub timestamps: TimestampMap,
    pub buffers_skipped: usize,
    pub entries_skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InvalidUtf8,
    InvalidJson,
    UnexpectedShape,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidUtf8 => write!(f, "buffer is not valid UTF-8"),
            SkipReason::InvalidJson => write!(f, "buffer is not valid JSON"),
            SkipReason::UnexpectedShape => write!(f, "unexpected top-level shape"),
        }
    }
}

/// Result of decoding one buffer: either usable data or a reason to ignore it.
#[derive(Debug)]
pub enum BufferOutcome<T> {
    Parsed(T),
    Skipped(SkipReason),
}

fn decode_json(bytes: &[u8]) -> BufferOutcome<Value> {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return BufferOutcome::Skipped(SkipReason::InvalidUtf8);
    };

    match serde_json::from_str(text) {
        Ok(value) => BufferOutcome::Parsed(value),
        Err(_) => BufferOutcome::Skipped(SkipReason::InvalidJson),
    }
}

fn decode_followers_buffer(bytes: &[u8]) -> BufferOutcome<Vec<Value>> {
    match decode_json(bytes) {
        BufferOutcome::Parsed(Value::Array(entries)) => BufferOutcome::Parsed(entries),
        BufferOutcome::Parsed(_) => BufferOutcome::Skipped(SkipReason::UnexpectedShape),
        BufferOutcome::Skipped(reason) => BufferOutcome::Skipped(reason),
    }
}

fn decode_following_buffer(bytes: &[u8]) -> BufferOutcome<Vec<Value>> {
    let mut root = match decode_json(bytes) {
        BufferOutcome::Parsed(Value::Object(root)) => root,
        BufferOutcome::Parsed(_) => return BufferOutcome::Skipped(SkipReason::UnexpectedShape),
        BufferOutcome::Skipped(reason) => return BufferOutcome::Skipped(reason),
    };

    // A missing container means an export with nothing in it.
    match root.remove(FOLLOWING_CONTAINER_KEY) {
        None => BufferOutcome::Parsed(Vec::new()),
        Some(Value::Array(entries)) => BufferOutcome::Parsed(entries),
        Some(_) => BufferOutcome::Skipped(SkipReason::UnexpectedShape),
    }
}

fn timestamp_of(item: &Map<String, Value>) -> Option<i64> {
    item.get(TIMESTAMP_KEY)
        .and_then(Value::as_i64)
        .filter(|ts| *ts != 0)
}

fn identity_from(item: &Map<String, Value>, field: &str) -> Option<UserIdentity> {
    item.get(field)
        .and_then(Value::as_str)
        .and_then(UserIdentity::new)
}

fn record(outcome: &mut ParseOutcome, identity: UserIdentity, timestamp: Option<i64>) {
    if let Some(ts) = timestamp {
        outcome.timestamps.insert(identity.key().to_string(), ts);
    }
    outcome.identities.insert(identity);
}

fn collect_follower_entry(entry: &Value, outcome: &mut ParseOutcome) {
    let Some(items) = entry
        .as_object()
        .map(|entry| entry.get(STRING_LIST_KEY).and_then(Value::as_array))
    else {
        outcome.entries_skipped += 1;
        return;
    };

    // An entry without string_list_data carries no handles.
    let Some(items) = items else {
        return;
    };

    for item in items {
        let Some(item) = item.as_object() else {
            outcome.entries_skipped += 1;
            continue;
        };

        match identity_from(item, VALUE_KEY) {
            Some(identity) => record(outcome, identity, timestamp_of(item)),
            None => outcome.entries_skipped += 1,
        }
    }
}

fn collect_following_entry(entry: &Value, outcome: &mut ParseOutcome) {
    let Some(identity) = entry
        .as_object()
        .and_then(|entry| identity_from(entry, TITLE_KEY))
    else {
        outcome.entries_skipped += 1;
        return;
    };

    // Only the first sub-entry carries the follow date.
    let timestamp = entry
        .get(STRING_LIST_KEY)
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .and_then(Value::as_object)
        .and_then(timestamp_of);

    record(outcome, identity, timestamp);
}

/// Parses any number of followers export buffers into one deduplicated set.
///
/// Later buffers overwrite timestamps of handles already seen.
pub fn parse_followers_with_timestamps<B: AsRef<[u8]>>(buffers: &[B]) -> ParseOutcome {
    let start_time = Instant::now();
    let mut outcome = ParseOutcome::default();

    for (index, buffer) in buffers.iter().enumerate() {
        match decode_followers_buffer(buffer.as_ref()) {
            BufferOutcome::Parsed(entries) => {
                debug!(
                    action = "decode",
                    component = "followers_parser",
                    buffer = index,
                    entry_count = entries.len(),
                    "Decoded followers buffer"
                );
                for entry in &entries {
                    collect_follower_entry(entry, &mut outcome);
                }
            }
            BufferOutcome::Skipped(reason) => {
                outcome.buffers_skipped += 1;
                warn!(
                    action = "skip",
                    component = "followers_parser",
                    buffer = index,
                    reason = %reason,
                    "Skipping followers buffer"
                );
            }
        }
    }

    info!(
        action = "complete",
        component = "followers_parser",
        buffer_count = buffers.len(),
        identity_count = outcome.identities.len(),
        timestamp_count = outcome.timestamps.len(),
        buffers_skipped = outcome.buffers_skipped,
        entries_skipped = outcome.entries_skipped,
        duration_ms = start_time.elapsed().as_millis(),
        "Followers parsing completed"
    );

    outcome
}

pub fn parse_followers<B: AsRef<[u8]>>(buffers: &[B]) -> IdentitySet {
    parse_followers_with_timestamps(buffers).identities
}

/// Parses a single following export buffer.
pub fn parse_following_with_timestamps(buffer: &[u8]) -> ParseOutcome {
    let start_time = Instant::now();
    let mut outcome = ParseOutcome::default();

    match decode_following_buffer(buffer) {
        BufferOutcome::Parsed(entries) => {
            for entry in &entries {
                collect_following_entry(entry, &mut outcome);
            }
        }
        BufferOutcome::Skipped(reason) => {
            outcome.buffers_skipped += 1;
            warn!(
                action = "skip",
                component = "following_parser",
                reason = %reason,
                "Skipping following buffer"
            );
        }
    }

    info!(
        action = "complete",
        component = "following_parser",
        identity_count = outcome.identities.len(),
        timestamp_count = outcome.timestamps.len(),
        entries_skipped = outcome.entries_skipped,
        duration_ms = start_time.elapsed().as_millis(),
        "Following parsing completed"
    );

    outcome
}

pub fn parse_following(buffer: &[u8]) -> IdentitySet {
    parse_following_with_timestamps(buffer).identities
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOLLOWERS: &str = r#"[
        {"title": "", "media_list_data": [], "string_list_data": [
            {"href": "https://www.instagram.com/user1", "value": "user1", "timestamp": 123}]},
        {"title": "", "media_list_data": [], "string_list_data": [
            {"href": "https://www.instagram.com/user2", "value": "user2", "timestamp": 124}]},
        {"title": "", "media_list_data": [], "string_list_data": [
            {"href": "https://www.instagram.com/user3", "value": "user3", "timestamp": 125}]}
    ]"#;

    const FOLLOWING: &str = r#"{"relationships_following": [
        {"title": "user2", "string_list_data": [{"href": "https://www.instagram.com/_u/user2", "timestamp": 123}]},
        {"title": "user4", "string_list_data": [{"href": "https://www.instagram.com/_u/user4", "timestamp": 124}]}
    ]}"#;

    #[test]
    fn followers_extracts_handles_and_timestamps() {
        let outcome = parse_followers_with_timestamps(&[FOLLOWERS]);

        assert_eq!(outcome.identities.len(), 3);
        for handle in ["user1", "user2", "user3"] {
            assert!(outcome.identities.contains_handle(handle));
        }
        assert_eq!(outcome.timestamps.len(), 3);
        assert_eq!(outcome.timestamps["user1"], 123);
        assert_eq!(outcome.timestamps["user2"], 124);
        assert_eq!(outcome.timestamps["user3"], 125);
        assert_eq!(outcome.buffers_skipped, 0);
    }

    #[test]
    fn followers_deduplicates_across_buffers() {
        let users = parse_followers(&[FOLLOWERS, FOLLOWERS]);
        assert_eq!(users.len(), 3);
    }

    #[test]
    fn followers_skips_invalid_json() {
        let outcome = parse_followers_with_timestamps(&[b"not valid json at all".as_slice()]);
        assert!(outcome.identities.is_empty());
        assert!(outcome.timestamps.is_empty());
        assert_eq!(outcome.buffers_skipped, 1);
    }

    #[test]
    fn followers_skips_bad_buffer_but_keeps_good_ones() {
        let buffers: Vec<&[u8]> = vec![
            b"\xff\xfe\x00garbage".as_slice(),
            FOLLOWERS.as_bytes(),
            br#"{"relationships_following": []}"#.as_slice(),
        ];
        let outcome = parse_followers_with_timestamps(&buffers);
        assert_eq!(outcome.identities.len(), 3);
        assert_eq!(outcome.buffers_skipped, 2);
    }

    #[test]
    fn followers_empty_inputs() {
        let none: [&[u8]; 0] = [];
        let outcome = parse_followers_with_timestamps(&none);
        assert!(outcome.identities.is_empty());
        assert!(outcome.timestamps.is_empty());

        let outcome = parse_followers_with_timestamps(&["[]"]);
        assert!(outcome.identities.is_empty());
        assert!(outcome.timestamps.is_empty());
        assert_eq!(outcome.buffers_skipped, 0);
    }

    #[test]
    fn followers_missing_timestamp_is_omitted() {
        let data = r#"[{"string_list_data": [{"value": "user1"}, {"value": "user2", "timestamp": 0}]}]"#;
        let outcome = parse_followers_with_timestamps(&[data]);
        assert_eq!(outcome.identities.len(), 2);
        assert!(outcome.timestamps.is_empty());
    }

    #[test]
    fn followers_skips_entries_without_value() {
        let data = r#"[
            {"string_list_data": [{"href": "x", "timestamp": 5}]},
            {"string_list_data": [{"value": 42}]},
            {"string_list_data": [{"value": "   "}]},
            {"media_list_data": []},
            "stray",
            {"string_list_data": [{"value": " Kept "}]}
        ]"#;
        let outcome = parse_followers_with_timestamps(&[data]);
        assert_eq!(outcome.identities.len(), 1);
        assert_eq!(outcome.identities.get("kept").unwrap().handle(), "Kept");
        assert_eq!(outcome.entries_skipped, 4);
    }

    #[test]
    fn followers_timestamps_are_keyed_lowercase() {
        let data = r#"[{"string_list_data": [{"value": "MiXeD", "timestamp": 7}]}]"#;
        let outcome = parse_followers_with_timestamps(&[data]);
        assert_eq!(outcome.timestamps.get("mixed"), Some(&7));
    }

    #[test]
    fn followers_rejects_object_top_level() {
        let outcome = parse_followers_with_timestamps(&[FOLLOWING]);
        assert!(outcome.identities.is_empty());
        assert_eq!(outcome.buffers_skipped, 1);
    }

    #[test]
    fn following_extracts_handles_and_timestamps() {
        let outcome = parse_following_with_timestamps(FOLLOWING.as_bytes());
        assert_eq!(outcome.identities.len(), 2);
        assert!(outcome.identities.contains_handle("user2"));
        assert!(outcome.identities.contains_handle("user4"));
        assert_eq!(outcome.timestamps["user2"], 123);
        assert_eq!(outcome.timestamps["user4"], 124);
    }

    #[test]
    fn following_only_reads_first_sub_entry() {
        let data = r#"{"relationships_following": [
            {"title": "a", "string_list_data": [{"href": "x"}, {"timestamp": 99}]},
            {"title": "b", "string_list_data": []},
            {"title": "c"},
            {"title": "d", "string_list_data": [{"timestamp": 10}, {"timestamp": 20}]}
        ]}"#;
        let outcome = parse_following_with_timestamps(data.as_bytes());
        assert_eq!(outcome.identities.len(), 4);
        assert_eq!(outcome.timestamps.len(), 1);
        assert_eq!(outcome.timestamps["d"], 10);
    }

    #[test]
    fn following_skips_entries_without_title() {
        let data = r#"{"relationships_following": [
            {"string_list_data": [{"timestamp": 1}]},
            {"title": ""},
            {"title": "kept"}
        ]}"#;
        let outcome = parse_following_with_timestamps(data.as_bytes());
        assert_eq!(outcome.identities.len(), 1);
        assert_eq!(outcome.entries_skipped, 2);
    }

    #[test]
    fn following_tolerates_malformed_input() {
        for data in [
            "not valid json at all",
            "[]",
            r#"{"relationships_following": "nope"}"#,
        ] {
            let outcome = parse_following_with_timestamps(data.as_bytes());
            assert!(outcome.identities.is_empty(), "input: {data}");
            assert!(outcome.timestamps.is_empty());
            assert_eq!(outcome.buffers_skipped, 1);
        }

        assert!(parse_following(b"\xc3\x28").is_empty());
    }

    #[test]
    fn following_empty_container() {
        let outcome = parse_following_with_timestamps(br#"{"relationships_following": []}"#);
        assert!(outcome.identities.is_empty());
        assert!(outcome.timestamps.is_empty());
        assert_eq!(outcome.buffers_skipped, 0);

        assert!(parse_following(b"{}").is_empty());
    }
}
