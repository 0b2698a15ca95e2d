//! The progression state machine.
//!
//! Every surface that marks work done (grid toggle, chat command, resolver
//! fallback) goes through [`ProgressionEngine::record_completion`] and
//! [`ProgressionEngine::record_uncompletion`]. Calendar days and hours are
//! taken in the configured offset, so the streak, the day's xp entry and
//! the hour bucket always agree on what "today" is.
//!
//! `uncomplete` refunds xp only. Level, streak and behavior stats keep
//! their post-completion values, so progress never visibly regresses.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use tracing::debug;

use mandala_types::{ActivityTracking, ProgressionSettings, ProgressionState};

pub const XP_PER_COMPLETION: u64 = 10;
pub const XP_PER_LEVEL: u64 = 100;
/// Weight kept by every existing behavior bucket on each new completion.
pub const BEHAVIOR_DECAY: f64 = 0.9;
pub const DEFAULT_CATEGORY: &str = "General";

/// What one completion changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionReport {
    pub xp_gained: u64,
    /// Set when this completion raised the level.
    pub new_level: Option<u32>,
    pub streak_days: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressionEngine {
    settings: ProgressionSettings,
}

impl ProgressionEngine {
    #[must_use]
    pub const fn new(settings: ProgressionSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub const fn settings(&self) -> ProgressionSettings {
        self.settings
    }

    /// Tracking policy for completions toggled directly on the grid.
    #[must_use]
    pub const fn toggle_tracking(&self) -> ActivityTracking {
        self.settings.toggle_tracking()
    }

    fn offset(&self) -> FixedOffset {
        self.settings.offset()
    }

    /// Calendar day of `at` in the configured offset.
    #[must_use]
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset()).date_naive()
    }

    fn local_hour(&self, at: DateTime<Utc>) -> u32 {
        at.with_timezone(&self.offset()).hour()
    }

    /// Full completion event: xp, history, level, streak and behavior stats.
    pub fn complete(
        &self,
        state: &mut ProgressionState,
        category: &str,
        now: DateTime<Utc>,
    ) -> CompletionReport {
        self.record_completion(state, category, now, ActivityTracking::Full)
    }

    pub fn record_completion(
        &self,
        state: &mut ProgressionState,
        category: &str,
        now: DateTime<Utc>,
        tracking: ActivityTracking,
    ) -> CompletionReport {
        let today = self.local_date(now);

        state.xp = state.xp.saturating_add(XP_PER_COMPLETION);
        let entry = state.history_entry_mut(today);
        entry.xp_delta = entry.xp_delta.saturating_add(XP_PER_COMPLETION);

        let new_level = raise_level(state);

        if tracking == ActivityTracking::Full {
            self.advance_streak(state, today);
            state.last_activity_at = Some(now);
            self.record_behavior(state, category, now);
        }

        debug!(
            xp = state.xp,
            level = state.level,
            streak_days = state.streak_days,
            ?tracking,
            "Recorded completion"
        );

        CompletionReport {
            xp_gained: XP_PER_COMPLETION,
            new_level,
            streak_days: state.streak_days,
        }
    }

    /// Refund one completion. Returns the xp actually removed.
    pub fn record_uncompletion(&self, state: &mut ProgressionState, now: DateTime<Utc>) -> u64 {
        let before = state.xp;
        state.xp = state.xp.saturating_sub(XP_PER_COMPLETION);

        if let Some(entry) = state.existing_history_entry_mut(self.local_date(now)) {
            entry.xp_delta = entry.xp_delta.saturating_sub(XP_PER_COMPLETION);
        }

        let refunded = before - state.xp;
        debug!(xp = state.xp, refunded, "Recorded uncompletion");
        refunded
    }

    fn advance_streak(&self, state: &mut ProgressionState, today: NaiveDate) {
        let Some(last) = state.last_activity_at else {
            state.streak_days = 1;
            return;
        };

        let diff_days = (today - self.local_date(last)).num_days();
        if diff_days == 1 {
            state.streak_days = state.streak_days.saturating_add(1);
        } else if diff_days > 1 {
            state.streak_days = 1;
        }
    }

    fn record_behavior(&self, state: &mut ProgressionState, category: &str, now: DateTime<Utc>) {
        let stats = &mut state.behavior_stats;
        for weight in stats
            .activity_by_hour
            .values_mut()
            .chain(stats.category_completions.values_mut())
        {
            *weight *= BEHAVIOR_DECAY;
        }

        *stats
            .activity_by_hour
            .entry(self.local_hour(now))
            .or_insert(0.0) += 1.0;

        let category = if category.is_empty() {
            DEFAULT_CATEGORY
        } else {
            category
        };
        *stats
            .category_completions
            .entry(category.to_string())
            .or_insert(0.0) += 1.0;

        stats.last_activity_at = Some(now);
    }
}

/// `floor(xp / 100) + 1`, applied only when it exceeds the current level.
fn raise_level(state: &mut ProgressionState) -> Option<u32> {
    let earned = u32::try_from(state.xp / XP_PER_LEVEL)
        .unwrap_or(u32::MAX)
        .saturating_add(1);
    if earned > state.level {
        state.level = earned;
        Some(earned)
    } else {
        None
    }
}
