//! Property tests for parser totality, cursor monotonicity, and evaluator
//! idempotence.

use std::collections::BTreeMap;

use chrono::Utc;
use proptest::prelude::*;

use thermoguard::config::RelayConfig;
use thermoguard::reading::{self, Reading};
use thermoguard::safety;
use thermoguard::store::journal::Journal;

// ── Parser totality ───────────────────────────────────────────

proptest! {
    /// The block parser never panics and never fails a block, whatever the
    /// bridge prints.
    #[test]
    fn parser_is_total_on_arbitrary_lines(
        lines in proptest::collection::vec(".{0,80}", 0..12),
    ) {
        let _ = reading::parse_block(&lines);
    }

    /// Any parsed reading serializes to a single JSON line that parses back
    /// to the same record.
    #[test]
    fn parsed_readings_round_trip_json(
        channel in 0u32..=16,
        temp in -100i64..=200,
        hum in 0u64..=100,
    ) {
        let lines = [
            format!("channel={channel}"),
            format!("temperature={temp}.0F"),
            format!("humidity={hum}%"),
            "2025-09-14 12:00:00-0600".to_string(),
            "battery=OK".to_string(),
        ];
        let r = reading::parse_block(&lines);
        let json = serde_json::to_string(&r).unwrap();
        prop_assert!(!json.contains('\n'), "log records must be single lines");
        let back: Reading = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, r);
    }
}

// ── Cursor monotonicity ───────────────────────────────────────

proptest! {
    /// For any sequence of advance requests, the cursor is non-decreasing
    /// and never exceeds the log length.
    #[test]
    fn cursor_is_monotone_under_arbitrary_advances(
        offsets in proptest::collection::vec(0u64..=100_000, 1..32),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let mut journal = Journal::open(
            dir.path().join("readings.jsonl"),
            dir.path().join("forward.cursor"),
        )
        .unwrap();

        let r = Reading { channel: Some(1), ..Reading::empty() };
        for _ in 0..4 {
            journal.append(&r).unwrap();
        }

        let mut previous = journal.cursor();
        for offset in offsets {
            journal.advance_cursor(offset);
            let cursor = journal.cursor();
            prop_assert!(cursor >= previous, "cursor regressed");
            prop_assert!(cursor <= journal.len(), "cursor past end of log");
            previous = cursor;
        }
    }
}

// ── Evaluator idempotence ─────────────────────────────────────

fn arb_reading() -> impl Strategy<Value = Reading> {
    (
        proptest::option::of(1u32..=8),
        proptest::option::of(-100i32..=500),
        proptest::bool::ANY,
    )
        .prop_map(|(channel, temperature, fresh)| Reading {
            channel,
            temperature,
            timestamp: fresh.then(|| Utc::now().fixed_offset()),
            ..Reading::empty()
        })
}

proptest! {
    /// Evaluating twice over an unchanged snapshot yields the same decision.
    #[test]
    fn evaluator_is_idempotent(
        readings in proptest::collection::vec(arb_reading(), 0..8),
        occupied in proptest::bool::ANY,
    ) {
        let config = RelayConfig::default();
        let mut snapshot = BTreeMap::new();
        for r in readings {
            if let Some(ch) = r.channel {
                snapshot.insert(ch, r);
            }
        }

        let now = Utc::now();
        let first = safety::evaluate(occupied, &snapshot, &config, now);
        let second = safety::evaluate(occupied, &snapshot, &config, now);
        prop_assert_eq!(first, second);
    }
}
