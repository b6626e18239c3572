//! Cadence specifications and their expansion into day masks.
//!
//! A cadence runs in up to three phases: daily measurements for the first
//! `initial_days`, then `weekly_count` weekly measurements, then monthly
//! measurements either for a fixed count or until the end of the grid.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DAYS_PER_MONTH, DAYS_PER_WEEK, GRID_DAYS};
use crate::day_grid::{Day, is_blocked};
use crate::error::{LabCalError, LabCalResult};
use crate::mask::DayMask;

/// How the monthly phase runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyMode {
    #[default]
    None,
    Count(usize),
    /// Every four weeks through the end of the grid.
    Indefinite,
}

impl FromStr for MonthlyMode {
    type Err = LabCalError;

    /// Accepts a blank string, a non-negative integer, or `end`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(MonthlyMode::None);
        }
        if s.eq_ignore_ascii_case("end") {
            return Ok(MonthlyMode::Indefinite);
        }
        s.parse::<usize>().map(MonthlyMode::Count).map_err(|_| {
            LabCalError::InvalidCadence(format!(
                "'{s}' is not a month count; enter either an integer or 'end'"
            ))
        })
    }
}

impl fmt::Display for MonthlyMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MonthlyMode::None => write!(f, "none"),
            MonthlyMode::Count(n) => write!(f, "{n}"),
            MonthlyMode::Indefinite => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CadenceSpec {
    pub initial_days: usize,
    pub weekly_count: usize,
    pub monthly: MonthlyMode,
}

impl CadenceSpec {
    pub fn new(initial_days: usize, weekly_count: usize, monthly: MonthlyMode) -> Self {
        CadenceSpec {
            initial_days,
            weekly_count,
            monthly,
        }
    }

    /// A single measurement on the start day.
    pub fn one_off() -> Self {
        Self::new(1, 0, MonthlyMode::None)
    }

    fn validate(&self, start_day: Day) -> LabCalResult<()> {
        let end = start_day.checked_add(self.initial_days);
        if start_day >= GRID_DAYS || end.is_none_or(|end| end > GRID_DAYS) {
            return Err(LabCalError::InvalidCadence(format!(
                "{} daily measurements from day {} run past the end of the grid ({} days)",
                self.initial_days, start_day, GRID_DAYS
            )));
        }

        if is_blocked(start_day) {
            return Err(LabCalError::InvalidCadence(format!(
                "start day {start_day} falls on a blocked day"
            )));
        }

        if self.monthly == MonthlyMode::Indefinite && self.initial_days == 0 {
            return Err(LabCalError::InvalidCadence(
                "indefinite monthly measurements need at least one daily measurement".into(),
            ));
        }

        Ok(())
    }

    /// Expand this cadence from `start_day` into the candidate days of one
    /// experiment.
    ///
    /// Blocked days are only removed from the initial phase. Weekly and
    /// monthly occurrences may land on a blocked day; the collision resolver
    /// moves them off it when the experiment is inserted.
    pub fn expand(&self, start_day: Day) -> LabCalResult<DayMask> {
        self.validate(start_day)?;

        let mut mask = DayMask::empty();

        // Days lost to the weekend are dropped, not rescheduled.
        for day in start_day..start_day + self.initial_days {
            if !is_blocked(day) {
                mask.set(day);
            }
        }

        if self.weekly_count > 0 {
            let last = mask.last_active().unwrap_or(start_day);
            // A Friday finish restarts the weekly run a week after the start
            let anchor = if last % DAYS_PER_WEEK == 4 {
                start_day + DAYS_PER_WEEK
            } else {
                last
            };
            mark_every(&mut mask, anchor, DAYS_PER_WEEK, self.weekly_count);
        }

        match self.monthly {
            MonthlyMode::None => {}
            MonthlyMode::Count(months) => {
                let last = mask.last_active().unwrap_or(start_day);
                mark_every(&mut mask, last, DAYS_PER_MONTH, months);
            }
            MonthlyMode::Indefinite => {
                // Offset by the initial phase length, not the start day
                let first = self.initial_days - 1;
                for day in (first..GRID_DAYS).step_by(DAYS_PER_MONTH) {
                    mask.set(day);
                }
            }
        }

        if mask.is_empty() {
            return Err(LabCalError::InvalidCadence(
                "cadence produces no measurement days".into(),
            ));
        }

        Ok(mask)
    }
}

/// Mark `anchor` and the next `count` days spaced `step` apart, stopping at
/// the end of the grid.
fn mark_every(mask: &mut DayMask, anchor: Day, step: usize, count: usize) {
    for day in (anchor..GRID_DAYS).step_by(step).take(count.saturating_add(1)) {
        mask.set(day);
    }
}
