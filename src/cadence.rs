use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, Offset, TimeDelta, Utc, Weekday};

use crate::error::WeekloopError;

/// An immutable weekly cadence policy: which weekdays a loop wakes on, in
/// which fixed-offset timezone, at which time of day, with an optional
/// sub-day polling interval and an inter-cycle pause.
///
/// Built through [`Cadence::builder`]; validation happens once at
/// [`build`](CadenceBuilder::build) and a `Cadence` is valid by construction
/// after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cadence {
    timezone: FixedOffset,
    weekdays: Vec<Weekday>,
    wake: NaiveTime,
    pause: TimeDelta,
    sub_interval: Option<TimeDelta>,
}

impl Cadence {
    pub fn builder() -> CadenceBuilder {
        CadenceBuilder::new()
    }

    /// The weekdays of one cycle, sorted ascending from Monday, deduplicated.
    pub fn weekdays(&self) -> &[Weekday] {
        &self.weekdays
    }

    pub fn timezone(&self) -> FixedOffset {
        self.timezone
    }

    /// Time of day each occurrence wakes at.
    pub fn wake(&self) -> NaiveTime {
        self.wake
    }

    /// Dead time inserted around the wrap from the last weekday of a cycle to
    /// the first weekday of the next.
    pub fn pause(&self) -> Duration {
        self.pause.to_std().unwrap_or_default()
    }

    pub fn sub_interval(&self) -> Option<Duration> {
        self.sub_interval.map(|s| s.to_std().unwrap_or_default())
    }

    pub(crate) fn pause_delta(&self) -> TimeDelta {
        self.pause
    }

    pub(crate) fn sub_interval_delta(&self) -> Option<TimeDelta> {
        self.sub_interval
    }

    pub(crate) fn contains(&self, weekday: Weekday) -> bool {
        self.position(weekday).is_some()
    }

    pub(crate) fn position(&self, weekday: Weekday) -> Option<usize> {
        self.weekdays.iter().position(|w| *w == weekday)
    }

    pub(crate) fn last_index(&self) -> usize {
        self.weekdays.len() - 1
    }

    pub(crate) fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.timezone)
    }
}

/// Builder for [`Cadence`].
pub struct CadenceBuilder {
    weekdays: Vec<Weekday>,
    timezone: FixedOffset,
    wake: NaiveTime,
    pause: Duration,
    sub_interval: Option<Duration>,
}

impl CadenceBuilder {
    pub fn new() -> Self {
        Self {
            weekdays: Vec::new(),
            timezone: Utc.fix(),
            wake: NaiveTime::MIN,
            pause: Duration::ZERO,
            sub_interval: None,
        }
    }

    /// Weekdays to wake on. Duplicates are permitted and normalized away.
    pub fn weekdays(mut self, weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        self.weekdays = weekdays.into_iter().collect();
        self
    }

    /// Fixed UTC offset all wall-clock computations run in. Defaults to UTC.
    pub fn timezone(mut self, timezone: FixedOffset) -> Self {
        self.timezone = timezone;
        self
    }

    /// Time of day each occurrence wakes at. Defaults to midnight.
    pub fn at(mut self, wake: NaiveTime) -> Self {
        self.wake = wake;
        self
    }

    /// Dead time after the last weekday of a cycle. Defaults to zero.
    pub fn pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Interval between wake-ups within a matched weekday. Must be positive;
    /// values up to one day are the expected range, though longer ones are
    /// not rejected.
    pub fn sub_interval(mut self, sub_interval: Duration) -> Self {
        self.sub_interval = Some(sub_interval);
        self
    }

    pub fn build(self) -> Result<Cadence, WeekloopError> {
        let mut weekdays = self.weekdays;
        weekdays.sort_by_key(|w| w.num_days_from_monday());
        weekdays.dedup();
        if weekdays.is_empty() {
            return Err(WeekloopError::EmptyWeekdays);
        }
        let pause =
            TimeDelta::from_std(self.pause).map_err(|_| WeekloopError::PauseOutOfRange)?;
        let sub_interval = match self.sub_interval {
            Some(interval) if interval.is_zero() => return Err(WeekloopError::ZeroInterval),
            Some(interval) => Some(
                TimeDelta::from_std(interval).map_err(|_| WeekloopError::IntervalOutOfRange)?,
            ),
            None => None,
        };
        Ok(Cadence {
            timezone: self.timezone,
            weekdays,
            wake: self.wake,
            pause,
            sub_interval,
        })
    }
}

impl Default for CadenceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
