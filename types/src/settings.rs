//! Resolved configuration types shared across crates.
//!
//! These types represent fully-validated, resolved configuration state.
//! Raw TOML deserialization structs stay private in `mandala-config`; the
//! config loader resolves them into these types at the parse boundary.

use chrono::{FixedOffset, Offset, Utc, Weekday};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("reminder time must be HH:MM (got {0:?})")]
    InvalidTime(String),
    #[error("weekly_day must be 0 (Sunday) through 6 (got {0})")]
    InvalidWeekday(u8),
    #[error("utc offset must be within +/-23:59 (got {0} minutes)")]
    InvalidOffset(i32),
}

// ── Progression ──────────────────────────────────────────────

/// What a completion triggered from the goal grid itself records.
///
/// Chat and resolver completions always record everything; this only
/// governs toggles made directly on a sub-task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityTracking {
    /// xp, history, level, streak and behavior stats.
    #[default]
    Full,
    /// xp, history and level only.
    XpOnly,
}

impl ActivityTracking {
    #[must_use]
    pub const fn from_flag(tracks_activity: bool) -> Self {
        if tracks_activity {
            Self::Full
        } else {
            Self::XpOnly
        }
    }
}

/// Calendar interpretation and tracking policy for progression events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressionSettings {
    toggle_tracking: ActivityTracking,
    offset: FixedOffset,
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            toggle_tracking: ActivityTracking::default(),
            offset: utc(),
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

impl ProgressionSettings {
    #[must_use]
    pub const fn new(toggle_tracking: ActivityTracking, offset: FixedOffset) -> Self {
        Self {
            toggle_tracking,
            offset,
        }
    }

    /// Build from a minute offset east of UTC, as written in config files.
    pub fn from_minutes(
        toggle_tracking: ActivityTracking,
        minutes: i32,
    ) -> Result<Self, SettingsError> {
        let offset = FixedOffset::east_opt(minutes.saturating_mul(60))
            .ok_or(SettingsError::InvalidOffset(minutes))?;
        Ok(Self::new(toggle_tracking, offset))
    }

    #[must_use]
    pub const fn toggle_tracking(&self) -> ActivityTracking {
        self.toggle_tracking
    }

    /// Offset that decides where calendar days and hours begin.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }
}

// ── Reminders ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderFrequency {
    Daily,
    Weekdays,
    Weekly(Weekday),
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
enum RawFrequency {
    #[default]
    Daily,
    Weekdays,
    Weekly,
}

const fn default_weekly_day() -> u8 {
    1
}

fn default_time() -> String {
    "09:00".to_string()
}

#[derive(Deserialize)]
struct RawReminderSchedule {
    #[serde(default = "default_time")]
    time: String,
    #[serde(default)]
    frequency: RawFrequency,
    #[serde(default = "default_weekly_day")]
    weekly_day: u8,
}

/// Validated daily check-in schedule.
///
/// Invariant: `hour < 24` and `minute < 60` (enforced via `#[serde(try_from)]`
/// at the deserialization boundary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawReminderSchedule")]
pub struct ReminderSchedule {
    hour: u32,
    minute: u32,
    frequency: ReminderFrequency,
}

impl TryFrom<RawReminderSchedule> for ReminderSchedule {
    type Error = SettingsError;

    fn try_from(raw: RawReminderSchedule) -> Result<Self, Self::Error> {
        let (hour, minute) = parse_clock_time(&raw.time)?;
        let frequency = match raw.frequency {
            RawFrequency::Daily => ReminderFrequency::Daily,
            RawFrequency::Weekdays => ReminderFrequency::Weekdays,
            RawFrequency::Weekly => ReminderFrequency::Weekly(weekday_from_sunday(raw.weekly_day)?),
        };
        Ok(Self {
            hour,
            minute,
            frequency,
        })
    }
}

impl ReminderSchedule {
    pub fn new(time: &str, frequency: ReminderFrequency) -> Result<Self, SettingsError> {
        let (hour, minute) = parse_clock_time(time)?;
        Ok(Self {
            hour,
            minute,
            frequency,
        })
    }

    #[must_use]
    pub const fn hour(&self) -> u32 {
        self.hour
    }

    #[must_use]
    pub const fn minute(&self) -> u32 {
        self.minute
    }

    #[must_use]
    pub const fn frequency(&self) -> ReminderFrequency {
        self.frequency
    }
}

fn parse_clock_time(raw: &str) -> Result<(u32, u32), SettingsError> {
    let invalid = || SettingsError::InvalidTime(raw.to_string());
    let (hour, minute) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour >= 24 || minute >= 60 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

/// Day numbering with 0 = Sunday.
pub fn weekday_from_sunday(day: u8) -> Result<Weekday, SettingsError> {
    match day {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(SettingsError::InvalidWeekday(other)),
    }
}
