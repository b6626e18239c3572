//! The fixed scheduling grid: one 365-slot annual cycle anchored on a Monday.
//!
//! Day 0 is the epoch date. Weekday position is `day % 7`, so Saturdays and
//! Sundays sit at positions 5 and 6 and are permanently blocked.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::constants::{BLOCKED_WEEKDAYS, DAYS_PER_WEEK, DEFAULT_EPOCH, GRID_DAYS};
use crate::error::{LabCalError, LabCalResult, StartDayError};

/// Index of a slot in the grid, in `0..GRID_DAYS`.
pub type Day = usize;

/// True iff `day` falls on a weekend relative to the epoch.
pub fn is_blocked(day: Day) -> bool {
    BLOCKED_WEEKDAYS.contains(&(day % DAYS_PER_WEEK))
}

/// All blocked days of the grid in increasing order.
pub fn blocked_days() -> impl Iterator<Item = Day> {
    (0..GRID_DAYS).filter(|&day| is_blocked(day))
}

pub fn default_epoch() -> NaiveDate {
    NaiveDate::parse_from_str(DEFAULT_EPOCH, "%Y-%m-%d").expect("DEFAULT_EPOCH is a valid date")
}

/// Maps calendar dates onto grid days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayGrid {
    epoch: NaiveDate,
}

impl Default for DayGrid {
    fn default() -> Self {
        DayGrid {
            epoch: default_epoch(),
        }
    }
}

impl DayGrid {
    pub fn new(epoch: NaiveDate) -> LabCalResult<Self> {
        if epoch.weekday() != Weekday::Mon {
            return Err(LabCalError::Config(format!(
                "Epoch {} is a {}, it must be a Monday",
                epoch,
                epoch.weekday()
            )));
        }
        Ok(DayGrid { epoch })
    }

    pub fn epoch(&self) -> NaiveDate {
        self.epoch
    }

    pub fn date_of(&self, day: Day) -> NaiveDate {
        self.epoch + Duration::days(day as i64)
    }

    /// Grid day for a date, or None when the date lies outside the cycle.
    pub fn day_of(&self, date: NaiveDate) -> Option<Day> {
        let offset = (date - self.epoch).num_days();
        usize::try_from(offset).ok().filter(|&day| day < GRID_DAYS)
    }

    /// Check a requested start date and convert it to a grid day.
    ///
    /// Past dates are rejected first, then weekends, then dates the grid
    /// cannot represent.
    pub fn validate_start(&self, date: NaiveDate, today: NaiveDate) -> LabCalResult<Day> {
        if date < today {
            return Err(LabCalError::InvalidStartDay(StartDayError::InThePast {
                date,
                today,
            }));
        }

        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return Err(LabCalError::InvalidStartDay(StartDayError::OnBlockedDay(
                date,
            )));
        }

        self.day_of(date)
            .ok_or(LabCalError::InvalidStartDay(StartDayError::OutsideGrid(date)))
    }
}
