//! Progression engine behaviour over several days

use chrono::{DateTime, Utc};

use mandala_core::ProgressionEngine;
use mandala_core::progression::XP_PER_COMPLETION;
use mandala_types::{ActivityTracking, ProgressionSettings, ProgressionState};

use crate::common::at;

fn engine() -> ProgressionEngine {
    ProgressionEngine::new(ProgressionSettings::from_minutes(ActivityTracking::Full, 0).unwrap())
}

fn day(n: u32) -> DateTime<Utc> {
    at(&format!("2026-04-{n:02}T08:00:00Z"))
}

#[test]
fn uncomplete_restores_xp_but_not_level_streak_or_behavior() {
    let engine = engine();
    let mut state = ProgressionState {
        xp: 95,
        ..ProgressionState::default()
    };
    let before = state.clone();

    let report = engine.complete(&mut state, "Health", day(1));
    assert_eq!(report.new_level, Some(2));
    let after_complete = state.clone();

    let refunded = engine.record_uncompletion(&mut state, day(1));

    assert_eq!(refunded, XP_PER_COMPLETION);
    assert_eq!(state.xp, before.xp);
    assert_eq!(state.xp_on(day(1).date_naive()), 0);
    assert_eq!(state.level, after_complete.level);
    assert_eq!(state.streak_days, after_complete.streak_days);
    assert_eq!(state.behavior_stats, after_complete.behavior_stats);
}

#[test]
fn consecutive_days_extend_streak_and_gap_resets_it() {
    let engine = engine();
    let mut state = ProgressionState::default();

    for (n, expected) in [(1, 1), (2, 2), (3, 3)] {
        engine.complete(&mut state, "Health", day(n));
        assert_eq!(state.streak_days, expected, "day {n}");
    }

    engine.complete(&mut state, "Health", at("2026-04-03T21:00:00Z"));
    assert_eq!(state.streak_days, 3);

    engine.complete(&mut state, "Health", day(6));
    assert_eq!(state.streak_days, 1);
    assert_eq!(state.xp, 5 * XP_PER_COMPLETION);
}

#[test]
fn xp_never_goes_negative() {
    let engine = engine();
    let mut state = ProgressionState::default();
    for _ in 0..3 {
        assert_eq!(engine.record_uncompletion(&mut state, day(1)), 0);
    }
    assert_eq!(state.xp, 0);
    assert!(state.xp_history.is_empty());
}

#[test]
fn history_keeps_one_entry_per_day_in_order() {
    let engine = engine();
    let mut state = ProgressionState::default();
    engine.complete(&mut state, "Health", day(3));
    engine.complete(&mut state, "Health", day(1));
    engine.complete(&mut state, "Health", day(3));

    let days: Vec<_> = state
        .xp_history
        .iter()
        .map(|entry| (entry.date, entry.xp_delta))
        .collect();
    assert_eq!(
        days,
        [
            (day(1).date_naive(), XP_PER_COMPLETION),
            (day(3).date_naive(), 2 * XP_PER_COMPLETION),
        ]
    );
}
