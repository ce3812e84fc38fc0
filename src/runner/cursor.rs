use std::time::Duration;

use chrono::{DateTime, Datelike, FixedOffset, TimeDelta};

use crate::cadence::Cadence;
use crate::occurrence::next_occurrence_after;

/// Mutable scheduling state of one running loop: which weekday of the cadence
/// the task is currently aimed at, and which index produced the most recent
/// wake-up. Owned exclusively by the worker task; never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cursor {
    index: usize,
    previous: Option<usize>,
}

impl Cursor {
    /// Cursor for a loop (re)started at `now`: aims at the weekday whose
    /// occurrence is closest. A same-day occurrence wins even when its time
    /// of day has passed, so a restart mid-cycle resumes on today.
    pub(crate) fn starting(cadence: &Cadence, now: DateTime<FixedOffset>) -> Self {
        let index = cadence
            .weekdays()
            .iter()
            .enumerate()
            .min_by_key(|(_, weekday)| next_occurrence_after(now, **weekday, cadence.wake()) - now)
            .map(|(index, _)| index)
            .unwrap_or(0);
        Self {
            index,
            previous: None,
        }
    }

    /// How long to sleep before the next invocation.
    ///
    /// On a matched weekday with a sub-interval configured, the very first
    /// computation wakes immediately and later ones return the sub-interval
    /// for as long as the next step still lands on a configured weekday.
    /// Otherwise the delay runs to the target weekday's occurrence, with the
    /// inter-cycle pause applied on the last index (or, on the sub-interval
    /// path, when the exhausted day wraps the cursor); an occurrence that is
    /// already behind us rolls forward one week.
    pub(crate) fn next_delay(&mut self, cadence: &Cadence, now: DateTime<FixedOffset>) -> Duration {
        let today = now.weekday();
        let first = self.previous.is_none();

        if let Some(sub) = cadence.sub_interval_delta() {
            if let Some(today_index) = cadence.position(today) {
                // The wake landed on a cadence day; re-aim the cursor at it
                // so polling engages even when the sleep was computed against
                // an earlier index (startup from an off day, or a polling run
                // that crossed midnight into an adjacent configured day).
                self.index = today_index;
                if first {
                    self.previous = Some(self.index);
                    return Duration::ZERO;
                }
                if cadence.contains((now + sub).weekday()) {
                    self.previous = Some(self.index);
                    return sub.to_std().unwrap_or_default();
                }
                return self.step_past_exhausted_day(cadence, now);
            }
        }

        let target = cadence.weekdays()[self.index];
        let occurrence = next_occurrence_after(now, target, cadence.wake());
        let mut delta = occurrence - now;
        if self.index == cadence.last_index() && !first {
            delta += cadence.pause_delta();
        }
        if delta < TimeDelta::zero() {
            // today's occurrence has already gone by; next week's it is
            delta += TimeDelta::days(7);
        }
        self.previous = Some(self.index);
        self.index = (self.index + 1) % cadence.weekdays().len();
        to_whole_seconds(delta)
    }

    /// The matched day has no sub-interval wake-ups left: aim the cursor at
    /// the next weekday of the cycle and sleep to its occurrence. The cursor
    /// stays on that weekday so polling resumes there after the wake-up.
    fn step_past_exhausted_day(
        &mut self,
        cadence: &Cadence,
        now: DateTime<FixedOffset>,
    ) -> Duration {
        let wrapped = self.index == cadence.last_index();
        self.previous = Some(self.index);
        self.index = (self.index + 1) % cadence.weekdays().len();
        let target = cadence.weekdays()[self.index];
        let mut delta = next_occurrence_after(now, target, cadence.wake()) - now;
        if wrapped {
            delta += cadence.pause_delta();
        }
        if delta <= TimeDelta::zero() {
            // single-weekday cadence: the only later occurrence is next week
            delta += TimeDelta::days(7);
        }
        to_whole_seconds(delta)
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

fn to_whole_seconds(delta: TimeDelta) -> Duration {
    let secs = (delta.num_milliseconds() + 500).div_euclid(1000).max(0);
    Duration::from_secs(secs as u64)
}
