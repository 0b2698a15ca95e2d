//! Daily check-in schedule. Delivery is up to the caller.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc, Weekday};

use mandala_types::{ReminderFrequency, ReminderSchedule};

pub const REMINDER_TITLE: &str = "Daily Mandala Check-in";
pub const REMINDER_BODY: &str = "Review your goals and complete one small action today.";

/// Whether the schedule runs on the weekday of `now` in `offset`.
#[must_use]
pub fn runs_on(schedule: &ReminderSchedule, now: DateTime<Utc>, offset: FixedOffset) -> bool {
    let weekday = now.with_timezone(&offset).weekday();
    match schedule.frequency() {
        ReminderFrequency::Daily => true,
        ReminderFrequency::Weekdays => !matches!(weekday, Weekday::Sat | Weekday::Sun),
        ReminderFrequency::Weekly(day) => weekday == day,
    }
}

/// A reminder is due on a scheduled day, at exactly the configured minute,
/// unless one was already sent on the same calendar day.
#[must_use]
pub fn is_due(
    schedule: &ReminderSchedule,
    now: DateTime<Utc>,
    offset: FixedOffset,
    last_sent_at: Option<DateTime<Utc>>,
) -> bool {
    let local = now.with_timezone(&offset);
    if !runs_on(schedule, now, offset)
        || local.hour() != schedule.hour()
        || local.minute() != schedule.minute()
    {
        return false;
    }
    last_sent_at.is_none_or(|sent| sent.with_timezone(&offset).date_naive() != local.date_naive())
}
