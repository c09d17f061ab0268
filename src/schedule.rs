/*!
 # Wake-period scheduling

 This module decides whether the lights should currently be running,
 given an ordered list of daily wake/sleep periods and the current
 day-of-month and time-of-day.

 Periods are scoped to a day of the month only (no month or year), so a
 schedule is only meaningful within a single month. Times are minutes
 since midnight.
*/

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use tracing::trace;

/// Converts an hour and minute to minutes since midnight
pub const fn minutes_since_midnight(hour: u32, minute: u32) -> u32 {
    hour * 60 + minute
}

/// One scheduling entry: on `day`, the lights wake at `wake` and go
/// back to sleep at `sleep` (both minutes since midnight).
///
/// Entries with `wake >= sleep` are tolerated but can never match as
/// awake. Schedules are expected to be sorted ascending by `day`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakePeriod {
    /// Day of the month (1-31) this period applies to
    pub day: u32,
    /// Minutes since midnight at which the lights become active
    pub wake: u32,
    /// Minutes since midnight at which the lights become inactive
    pub sleep: u32,
}

/// Whether the lights should currently be running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeState {
    /// Outside every wake period
    Asleep,
    /// Inside a wake period
    Awake,
}

impl WakeState {
    /// Returns true for [`WakeState::Awake`]
    pub fn is_awake(&self) -> bool {
        matches!(self, WakeState::Awake)
    }
}

impl std::fmt::Display for WakeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WakeState::Asleep => write!(f, "asleep"),
            WakeState::Awake => write!(f, "awake"),
        }
    }
}

/// The bench lighting periods this controller ships with
///
/// Two windows on the same day, with a quarter-hour gap between them.
pub const BENCH_PERIODS: &[WakePeriod] = &[
    WakePeriod {
        day: 29,
        wake: minutes_since_midnight(11, 0),
        sleep: minutes_since_midnight(14, 59),
    },
    WakePeriod {
        day: 29,
        wake: minutes_since_midnight(15, 15),
        sleep: minutes_since_midnight(16, 59),
    },
];

/// Evaluates a day-ordered list of [`WakePeriod`]s with a resumable
/// forward-only scan.
///
/// The evaluator keeps a cursor into the period list and permanently
/// skips entries whose day has passed, so repeated queries are O(1)
/// amortized as long as the query day never decreases. Querying with a
/// day earlier than a previously seen one is out of contract: periods
/// the cursor has already skipped are never found again, and the
/// evaluator silently reports asleep for them. The cursor does not
/// survive a restart; a fresh evaluator rescans from the earliest
/// period.
pub struct WakeSchedule<'a> {
    /// The ordered period list, owned by the caller
    periods: &'a [WakePeriod],
    /// Scan position; only ever moves forward
    cursor: usize,
}

impl<'a> WakeSchedule<'a> {
    /// Creates an evaluator over a day-sorted period list
    pub fn new(periods: &'a [WakePeriod]) -> Self {
        Self { periods, cursor: 0 }
    }

    /// Returns the wake state for the given day-of-month and minutes
    /// since midnight
    ///
    /// Periods whose day is behind `day` are skipped for good by
    /// advancing the stored cursor. A same-day period whose sleep time
    /// has already passed is stepped over without moving the cursor, so
    /// a later period on the same day stays reachable on this and
    /// subsequent calls.
    pub fn check(&mut self, day: u32, minutes: u32) -> WakeState {
        while let Some(period) = self.periods.get(self.cursor) {
            if day <= period.day {
                break;
            }
            trace!(cursor = self.cursor, period_day = period.day, "skipping stale period");
            self.cursor += 1;
        }

        for period in &self.periods[self.cursor..] {
            if day > period.day {
                continue;
            }
            if day < period.day {
                return WakeState::Asleep;
            }
            if minutes < period.wake {
                return WakeState::Asleep;
            }
            if minutes < period.sleep {
                return WakeState::Awake;
            }
        }
        WakeState::Asleep
    }

    /// Returns the wake state for a full timestamp, reading the
    /// day-of-month, hour and minute fields
    pub fn check_datetime<Tz: TimeZone>(&mut self, dt: &DateTime<Tz>) -> WakeState {
        self.check(dt.day(), minutes_since_midnight(dt.hour(), dt.minute()))
    }

    /// True once every period's day has passed; the evaluator reports
    /// asleep forever after
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.periods.len()
    }
}
