//! Working occupancy table used while resolving collisions.
//!
//! Conceptually a `day × (1 + N)` table: a synthetic blocked column worth 1
//! on every weekend, followed by one column per experiment in rank order.
//! The blocked column is derived from the day index and never stored.
//!
//! Experiment cells are counts rather than flags. A one-day move can stack
//! two occurrences of the same experiment on one day; the stack counts as a
//! collision until it is spread out again.

use std::ops::Range;

use crate::constants::GRID_DAYS;
use crate::day_grid::{Day, is_blocked};
use crate::mask::DayMask;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// One occupancy column per experiment, indexed by rank.
    columns: Vec<Vec<u32>>,
    /// Blocked weight plus every experiment column, per day.
    totals: Vec<u32>,
}

impl Grid {
    /// Build a grid from experiment masks ordered by rank.
    pub fn from_masks<'a, I>(masks: I) -> Self
    where
        I: IntoIterator<Item = &'a DayMask>,
    {
        let columns: Vec<Vec<u32>> = masks
            .into_iter()
            .map(|mask| mask.as_slice().iter().map(|&a| u32::from(a)).collect())
            .collect();

        let totals = (0..GRID_DAYS)
            .map(|day| {
                Self::blocked_weight(day) + columns.iter().map(|col| col[day]).sum::<u32>()
            })
            .collect();

        Grid { columns, totals }
    }

    /// Value of the synthetic blocked column on `day`.
    pub fn blocked_weight(day: Day) -> u32 {
        u32::from(is_blocked(day))
    }

    /// Number of experiment columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn occupancy(&self, day: Day, rank: usize) -> u32 {
        self.columns
            .get(rank)
            .and_then(|col| col.get(day))
            .copied()
            .unwrap_or(0)
    }

    /// Experiment occurrences on `day`, excluding the blocked column.
    pub fn experiment_count(&self, day: Day) -> u32 {
        self.day_total(day) - Self::blocked_weight(day)
    }

    /// Blocked weight plus experiment occurrences on `day`.
    pub fn day_total(&self, day: Day) -> u32 {
        self.totals.get(day).copied().unwrap_or(0)
    }

    /// A day claimed more than once, counting the blocked column as a claim.
    pub fn is_collision(&self, day: Day) -> bool {
        self.day_total(day) > 1
    }

    /// An unblocked day with no experiment on it.
    pub fn is_free(&self, day: Day) -> bool {
        self.day_total(day) == 0
    }

    pub fn collisions(&self, scope: Range<Day>) -> impl Iterator<Item = Day> + '_ {
        scope.filter(|&day| self.is_collision(day))
    }

    pub fn free_days(&self, scope: Range<Day>) -> impl Iterator<Item = Day> + '_ {
        scope.filter(|&day| self.is_free(day))
    }

    /// True when no day anywhere holds more than one claim.
    pub fn is_resolved(&self) -> bool {
        self.collisions(0..GRID_DAYS).next().is_none()
    }

    /// Rank of the lowest-priority experiment among those with the highest
    /// occupancy on `day`. The blocked column is never chosen.
    pub(crate) fn lowest_priority_at(&self, day: Day) -> Option<usize> {
        let max = self.columns.iter().map(|col| col[day]).max()?;
        if max == 0 {
            return None;
        }
        self.columns.iter().rposition(|col| col[day] == max)
    }

    /// Move one occurrence of experiment `rank` from `from` to `to`.
    pub(crate) fn shift(&mut self, rank: usize, from: Day, to: Day) {
        let Some(col) = self.columns.get_mut(rank) else {
            return;
        };
        if from >= GRID_DAYS || to >= GRID_DAYS || col[from] == 0 {
            return;
        }
        col[from] -= 1;
        col[to] += 1;
        self.totals[from] -= 1;
        self.totals[to] += 1;
    }

    /// Collapse the table back into masks, one per rank.
    pub fn into_masks(self) -> Vec<DayMask> {
        self.columns
            .into_iter()
            .map(|col| {
                DayMask::from_days(
                    col.iter()
                        .enumerate()
                        .filter_map(|(day, &count)| (count > 0).then_some(day)),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_include_blocked_column() {
        let a = DayMask::from_days([0, 5]);
        let b = DayMask::from_days([0]);
        let grid = Grid::from_masks([&a, &b]);

        assert_eq!(grid.width(), 2);
        assert_eq!(grid.day_total(0), 2);
        assert_eq!(grid.experiment_count(0), 2);
        assert_eq!(grid.day_total(5), 2);
        assert_eq!(grid.experiment_count(5), 1);
        assert_eq!(grid.day_total(6), 1);
        assert!(grid.is_collision(0));
        assert!(grid.is_collision(5));
        assert!(!grid.is_collision(6));
        assert!(!grid.is_free(6));
        assert!(grid.is_free(1));
    }

    #[test]
    fn test_lowest_priority_prefers_highest_rank_on_tie() {
        let a = DayMask::from_days([3]);
        let b = DayMask::from_days([3]);
        let c = DayMask::from_days([4]);
        let grid = Grid::from_masks([&a, &b, &c]);
        assert_eq!(grid.lowest_priority_at(3), Some(1));
        assert_eq!(grid.lowest_priority_at(10), None);
    }

    #[test]
    fn test_lowest_priority_prefers_stacked_occupancy() {
        let a = DayMask::from_days([1, 2]);
        let b = DayMask::from_days([2]);
        let mut grid = Grid::from_masks([&a, &b]);
        grid.shift(0, 1, 2);
        assert_eq!(grid.occupancy(2, 0), 2);
        assert_eq!(grid.lowest_priority_at(2), Some(0));
    }

    #[test]
    fn test_shift_keeps_totals() {
        let a = DayMask::from_days([1]);
        let mut grid = Grid::from_masks([&a]);
        grid.shift(0, 1, 2);
        assert_eq!(grid.day_total(1), 0);
        assert_eq!(grid.day_total(2), 1);
        assert_eq!(grid.into_masks()[0].days(), vec![2]);
    }

    #[test]
    fn test_shift_ignores_empty_cell() {
        let a = DayMask::from_days([1]);
        let mut grid = Grid::from_masks([&a]);
        grid.shift(0, 3, 4);
        assert_eq!(grid.day_total(4), 0);
        assert_eq!(grid.day_total(1), 1);
    }
}
