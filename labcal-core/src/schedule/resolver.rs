//! Greedy collision repair.
//!
//! Each step takes the earliest collision in scope, picks the lowest
//! priority experiment on that day and moves one of its occurrences a single
//! day toward the nearest free day. Collisions and free days are re-derived
//! after every move, so a displacement can ripple through neighbouring days
//! before it settles.

use std::ops::Range;

use tracing::{debug, trace, warn};

use crate::constants::{DEFAULT_MAX_ITERATIONS, GRID_DAYS};
use crate::day_grid::Day;
use crate::error::{Infeasibility, LabCalError, LabCalResult};
use crate::schedule::grid::Grid;

/// Outcome of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    /// Single-day moves performed.
    pub steps: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionResolver {
    max_iterations: u64,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        CollisionResolver {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl CollisionResolver {
    pub fn new(max_iterations: u64) -> Self {
        CollisionResolver { max_iterations }
    }

    pub fn max_iterations(&self) -> u64 {
        self.max_iterations
    }

    /// Repair `grid` over `scope_start..GRID_DAYS` in place.
    ///
    /// Days before `scope_start` are neither inspected nor used as free
    /// days. On error the grid is left in an intermediate state and must be
    /// discarded by the caller.
    pub fn resolve(&self, grid: &mut Grid, scope_start: Day) -> LabCalResult<Resolution> {
        let scope = scope_start.min(GRID_DAYS)..GRID_DAYS;
        let mut steps: u64 = 0;

        loop {
            let Some(day) = grid.collisions(scope.clone()).next() else {
                break;
            };

            if steps >= self.max_iterations {
                warn!(steps, "collision resolution did not converge");
                return Err(LabCalError::Infeasible(Infeasibility::IterationLimit {
                    iterations: steps,
                }));
            }

            // A collision always has an experiment on it: the blocked
            // column alone can only reach 1.
            let Some(rank) = grid.lowest_priority_at(day) else {
                break;
            };

            let Some(target) = nearest_free_day(grid, scope.clone(), day) else {
                warn!(day, "no free day left for displaced experiment");
                return Err(LabCalError::Infeasible(Infeasibility::NoFreeDay { day }));
            };

            let next = if target > day { day + 1 } else { day - 1 };
            trace!(day, rank, target, next, "displacing one occurrence");
            grid.shift(rank, day, next);
            steps += 1;
        }

        debug!(steps, scope_start, "collisions resolved");
        Ok(Resolution { steps })
    }
}

/// Closest free day to `day` within `scope`; ties go to the earlier day.
fn nearest_free_day(grid: &Grid, scope: Range<Day>, day: Day) -> Option<Day> {
    let mut best: Option<Day> = None;
    for free in grid.free_days(scope) {
        if best.is_none_or(|b| free.abs_diff(day) < b.abs_diff(day)) {
            best = Some(free);
        }
    }
    best
}
