use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, TimeDelta, Timelike, Utc, Weekday};

/// Next instant matching `weekday` at `time`, computed from an explicit `now`.
///
/// The result is `now` shifted forward by `target - today` days (plus a week
/// when the target weekday already passed this week) with the time of day
/// snapped to `time`. When today *is* the target weekday the returned instant
/// falls on today — even if that time of day has already gone by, so the
/// result can lie in the past. Callers must check.
pub fn next_occurrence_after(
    now: DateTime<FixedOffset>,
    weekday: Weekday,
    time: NaiveTime,
) -> DateTime<FixedOffset> {
    let today = now.weekday().num_days_from_monday() as i64;
    let target = weekday.num_days_from_monday() as i64;
    let days = target - today + if target < today { 7 } else { 0 };
    now + TimeDelta::days(days)
        + TimeDelta::hours(time.hour() as i64 - now.hour() as i64)
        + TimeDelta::minutes(time.minute() as i64 - now.minute() as i64)
        + TimeDelta::seconds(time.second() as i64 - now.second() as i64)
        - TimeDelta::nanoseconds(now.nanosecond() as i64)
}

/// [`next_occurrence_after`] evaluated at the current wall-clock time in `tz`.
pub fn next_occurrence(weekday: Weekday, time: NaiveTime, tz: FixedOffset) -> DateTime<FixedOffset> {
    next_occurrence_after(Utc::now().with_timezone(&tz), weekday, time)
}
