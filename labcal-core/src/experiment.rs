//! A labelled experiment and its measurement days.

use std::fmt;

use crate::cadence::CadenceSpec;
use crate::day_grid::Day;
use crate::error::LabCalResult;
use crate::mask::DayMask;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Experiment {
    label: String,
    start_day: Day,
    mask: DayMask,
}

impl Experiment {
    pub fn new(label: &str, start_day: Day, mask: DayMask) -> Self {
        Experiment {
            label: label.to_string(),
            start_day,
            mask,
        }
    }

    /// Expand `cadence` from `start_day` into a new experiment.
    pub fn from_cadence(label: &str, cadence: &CadenceSpec, start_day: Day) -> LabCalResult<Self> {
        let mask = cadence.expand(start_day)?;
        Ok(Self::new(label, start_day, mask))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start_day(&self) -> Day {
        self.start_day
    }

    pub fn mask(&self) -> &DayMask {
        &self.mask
    }

    /// Measurement days in increasing order.
    pub fn active_days(&self) -> Vec<Day> {
        self.mask.days()
    }

    pub(crate) fn replace_mask(&mut self, mask: DayMask) -> bool {
        let changed = self.mask != mask;
        self.mask = mask;
        changed
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
