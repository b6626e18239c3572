//! Per-experiment occupancy over the grid.

use std::fmt;

use crate::constants::GRID_DAYS;
use crate::day_grid::Day;

/// Which grid days an experiment occupies.
#[derive(Clone, PartialEq, Eq)]
pub struct DayMask(Vec<bool>);

impl Default for DayMask {
    fn default() -> Self {
        DayMask(vec![false; GRID_DAYS])
    }
}

impl DayMask {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a mask from day indices. Days outside the grid are ignored.
    pub fn from_days<I: IntoIterator<Item = Day>>(days: I) -> Self {
        let mut mask = Self::empty();
        for day in days {
            mask.set(day);
        }
        mask
    }

    pub fn is_active(&self, day: Day) -> bool {
        self.0.get(day).copied().unwrap_or(false)
    }

    pub fn set(&mut self, day: Day) {
        if let Some(slot) = self.0.get_mut(day) {
            *slot = true;
        }
    }

    pub fn clear(&mut self, day: Day) {
        if let Some(slot) = self.0.get_mut(day) {
            *slot = false;
        }
    }

    /// Active days in increasing order.
    pub fn days(&self) -> Vec<Day> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(day, &active)| active.then_some(day))
            .collect()
    }

    pub fn first_active(&self) -> Option<Day> {
        self.0.iter().position(|&active| active)
    }

    pub fn last_active(&self) -> Option<Day> {
        self.0.iter().rposition(|&active| active)
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|&&active| active).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.0.contains(&true)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl fmt::Debug for DayMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("DayMask").field(&self.days()).finish()
    }
}
