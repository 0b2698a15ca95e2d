//! Gamified progress record: experience, level, streak and behavior signal.
//!
//! Only the data lives here. The transitions that change it are in
//! `mandala-core::progression`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const fn first_level() -> u32 {
    1
}

/// Experience gained on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpHistoryEntry {
    pub date: NaiveDate,
    pub xp_delta: u64,
}

/// Exponentially decayed histograms of completion activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorStats {
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Hour of day (0-23) to weighted completion count.
    #[serde(default)]
    pub activity_by_hour: BTreeMap<u32, f64>,
    /// Area theme title to weighted completion count.
    #[serde(default)]
    pub category_completions: BTreeMap<String, f64>,
}

impl BehaviorStats {
    /// The hour with the highest weight, if any activity was recorded.
    #[must_use]
    pub fn peak_hour(&self) -> Option<u32> {
        self.activity_by_hour
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(hour, _)| *hour)
    }

    #[must_use]
    pub fn top_category(&self) -> Option<&str> {
        self.category_completions
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(category, _)| category.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionState {
    #[serde(default)]
    pub xp: u64,
    /// Highest level reached. Never lowered, even when xp is refunded.
    #[serde(default = "first_level")]
    pub level: u32,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    /// Ordered by date, at most one entry per day.
    #[serde(default)]
    pub xp_history: Vec<XpHistoryEntry>,
    #[serde(default)]
    pub behavior_stats: BehaviorStats,
}

impl Default for ProgressionState {
    fn default() -> Self {
        Self {
            xp: 0,
            level: first_level(),
            streak_days: 0,
            last_activity_at: None,
            xp_history: Vec::new(),
            behavior_stats: BehaviorStats::default(),
        }
    }
}

impl ProgressionState {
    /// Experience recorded for `date`; zero when the day has no entry.
    #[must_use]
    pub fn xp_on(&self, date: NaiveDate) -> u64 {
        self.xp_history
            .binary_search_by_key(&date, |entry| entry.date)
            .map_or(0, |index| self.xp_history[index].xp_delta)
    }

    /// The entry for `date`, inserted in date order if the day has none yet.
    pub fn history_entry_mut(&mut self, date: NaiveDate) -> &mut XpHistoryEntry {
        let index = match self
            .xp_history
            .binary_search_by_key(&date, |entry| entry.date)
        {
            Ok(index) => index,
            Err(index) => {
                self.xp_history
                    .insert(index, XpHistoryEntry { date, xp_delta: 0 });
                index
            }
        };
        &mut self.xp_history[index]
    }

    /// The entry for `date` without creating one.
    pub fn existing_history_entry_mut(&mut self, date: NaiveDate) -> Option<&mut XpHistoryEntry> {
        self.xp_history
            .binary_search_by_key(&date, |entry| entry.date)
            .ok()
            .map(|index| &mut self.xp_history[index])
    }
}
