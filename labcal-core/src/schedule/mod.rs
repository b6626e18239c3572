//! Priority-ordered experiment calendar.
//!
//! Experiments are kept newest first: rank 0 has the highest priority.
//! Inserting always happens at rank 0, after which the collision resolver
//! displaces older experiments out of the new one's way. The calendar only
//! changes once resolution has fully succeeded.

pub mod grid;
pub mod resolver;

use std::collections::HashSet;

use tracing::info;

use crate::cadence::CadenceSpec;
use crate::constants::GRID_DAYS;
use crate::day_grid::{Day, is_blocked};
use crate::error::{LabCalError, LabCalResult};
use crate::experiment::Experiment;
use crate::mask::DayMask;
use crate::schedule::grid::Grid;
use crate::schedule::resolver::CollisionResolver;

/// What an insert did to the rest of the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Single-day moves made by the resolver.
    pub steps: u64,
    /// Labels whose days changed, the new experiment included.
    pub displaced: Vec<String>,
}

impl InsertOutcome {
    pub fn had_collisions(&self) -> bool {
        self.steps > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityCalendar {
    experiments: Vec<Experiment>,
    resolver: CollisionResolver,
}

impl PriorityCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver(resolver: CollisionResolver) -> Self {
        PriorityCalendar {
            experiments: Vec::new(),
            resolver,
        }
    }

    /// Rebuild a calendar from experiments already in rank order.
    ///
    /// Used when hydrating from storage, so the grid invariants are checked
    /// rather than re-resolved.
    pub fn restore(experiments: Vec<Experiment>, resolver: CollisionResolver) -> LabCalResult<Self> {
        let mut seen = HashSet::new();
        for experiment in &experiments {
            if !seen.insert(experiment.label()) {
                return Err(LabCalError::Store(format!(
                    "experiment '{}' is listed more than once",
                    experiment.label()
                )));
            }
        }

        let grid = Grid::from_masks(experiments.iter().map(Experiment::mask));
        if let Some(day) = (0..GRID_DAYS).find(|&day| grid.is_collision(day)) {
            let reason = if is_blocked(day) {
                "an experiment occupies a weekend"
            } else {
                "more than one experiment is scheduled"
            };
            return Err(LabCalError::Store(format!("day {day}: {reason}")));
        }

        Ok(PriorityCalendar {
            experiments,
            resolver,
        })
    }

    pub fn resolver(&self) -> &CollisionResolver {
        &self.resolver
    }

    pub fn set_resolver(&mut self, resolver: CollisionResolver) {
        self.resolver = resolver;
    }

    /// Experiments in rank order, highest priority first.
    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.experiments.iter().map(Experiment::label)
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.label() == label)
    }

    pub fn rank_of(&self, label: &str) -> Option<usize> {
        self.experiments.iter().position(|e| e.label() == label)
    }

    /// Fails with `DuplicateLabel` when `label` is taken (exact match).
    pub fn ensure_label_available(&self, label: &str) -> LabCalResult<()> {
        if self.get(label).is_some() {
            return Err(LabCalError::DuplicateLabel(label.to_string()));
        }
        Ok(())
    }

    /// Measurement days of one experiment in increasing order.
    pub fn active_days(&self, label: &str) -> Option<Vec<Day>> {
        self.get(label).map(Experiment::active_days)
    }

    /// The experiment scheduled on `day`, if any.
    pub fn occupant(&self, day: Day) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.mask().is_active(day))
    }

    /// Resolved occupancy table of the whole calendar.
    pub fn grid(&self) -> Grid {
        Grid::from_masks(self.experiments.iter().map(Experiment::mask))
    }

    /// Expand `cadence` and insert the result under `label`.
    pub fn schedule(
        &mut self,
        label: &str,
        cadence: &CadenceSpec,
        start_day: Day,
    ) -> LabCalResult<InsertOutcome> {
        self.ensure_label_available(label)?;
        let mask = cadence.expand(start_day)?;
        self.insert(label, start_day, mask)
    }

    /// Insert a new experiment at rank 0 and displace older experiments
    /// around it.
    ///
    /// Resolution covers the grid from the start day onward, widened to the
    /// new experiment's first day if its mask reaches further back. On any
    /// error the calendar is left untouched.
    pub fn insert(
        &mut self,
        label: &str,
        start_day: Day,
        mask: DayMask,
    ) -> LabCalResult<InsertOutcome> {
        self.ensure_label_available(label)?;

        let scope_start = mask
            .first_active()
            .map_or(start_day, |first| first.min(start_day));

        let experiment = Experiment::new(label, start_day, mask);
        let mut grid = Grid::from_masks(
            std::iter::once(experiment.mask()).chain(self.experiments.iter().map(Experiment::mask)),
        );
        let resolution = self.resolver.resolve(&mut grid, scope_start)?;

        let mut experiments = Vec::with_capacity(self.experiments.len() + 1);
        experiments.push(experiment);
        experiments.extend(self.experiments.iter().cloned());

        let mut displaced = Vec::new();
        for (experiment, mask) in experiments.iter_mut().zip(grid.into_masks()) {
            if experiment.replace_mask(mask) {
                displaced.push(experiment.label().to_string());
            }
        }

        self.experiments = experiments;

        info!(
            label,
            start_day,
            steps = resolution.steps,
            displaced = displaced.len(),
            "experiment inserted"
        );

        Ok(InsertOutcome {
            steps: resolution.steps,
            displaced,
        })
    }

    /// Remove an experiment. Lower-priority experiments move up one rank and
    /// keep their days.
    pub fn delete(&mut self, label: &str) -> LabCalResult<Experiment> {
        let rank = self
            .rank_of(label)
            .ok_or_else(|| LabCalError::ExperimentNotFound(label.to_string()))?;
        let removed = self.experiments.remove(rank);
        info!(label, rank, "experiment deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::MonthlyMode;
    use crate::error::Infeasibility;

    fn days_only(initial: usize) -> CadenceSpec {
        CadenceSpec::new(initial, 0, MonthlyMode::None)
    }

    #[test]
    fn test_insert_goes_to_rank_zero() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(1), 0).unwrap();
        calendar.schedule("B", &days_only(1), 1).unwrap();
        calendar.schedule("C", &days_only(1), 2).unwrap();

        let labels: Vec<&str> = calendar.labels().collect();
        assert_eq!(labels, vec!["C", "B", "A"]);
        assert_eq!(calendar.rank_of("A"), Some(2));
    }

    #[test]
    fn test_insert_without_overlap_is_plain_union() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(3), 0).unwrap();
        let outcome = calendar.schedule("B", &days_only(2), 3).unwrap();

        assert_eq!(outcome.steps, 0);
        assert!(outcome.displaced.is_empty());
        assert!(!outcome.had_collisions());
        assert_eq!(calendar.active_days("A").unwrap(), vec![0, 1, 2]);
        assert_eq!(calendar.active_days("B").unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_newer_experiment_displaces_older() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(3), 0).unwrap();
        let outcome = calendar.schedule("B", &days_only(5), 0).unwrap();

        assert!(outcome.had_collisions());
        assert_eq!(outcome.displaced, vec!["A".to_string()]);
        assert_eq!(calendar.active_days("B").unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(calendar.active_days("A").unwrap(), vec![7, 8, 9]);
        assert!(calendar.grid().is_resolved());
    }

    #[test]
    fn test_duplicate_label_leaves_calendar_unchanged() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(3), 0).unwrap();
        let before = calendar.clone();

        let err = calendar.schedule("A", &days_only(5), 0).unwrap_err();
        assert!(matches!(err, LabCalError::DuplicateLabel(ref l) if l == "A"));
        assert_eq!(calendar, before);

        let err = calendar
            .insert("A", 10, DayMask::from_days([10]))
            .unwrap_err();
        assert!(matches!(err, LabCalError::DuplicateLabel(_)));
        assert_eq!(calendar, before);
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(1), 0).unwrap();
        assert!(calendar.schedule("a", &days_only(1), 1).is_ok());
    }

    #[test]
    fn test_infeasible_insert_leaves_calendar_unchanged() {
        let mut calendar = PriorityCalendar::new();
        let weekdays = DayMask::from_days((0..GRID_DAYS).filter(|&d| !is_blocked(d)));
        calendar.insert("full", 0, weekdays).unwrap();
        let before = calendar.clone();

        let err = calendar
            .insert("extra", 0, DayMask::from_days([0]))
            .unwrap_err();
        assert!(matches!(
            err,
            LabCalError::Infeasible(Infeasibility::NoFreeDay { .. })
        ));
        assert_eq!(calendar, before);
    }

    #[test]
    fn test_iteration_limit_leaves_calendar_unchanged() {
        let mut calendar = PriorityCalendar::with_resolver(CollisionResolver::new(2));
        calendar.schedule("A", &days_only(3), 0).unwrap();
        let before = calendar.clone();

        let err = calendar.schedule("B", &days_only(5), 0).unwrap_err();
        assert!(matches!(
            err,
            LabCalError::Infeasible(Infeasibility::IterationLimit { iterations: 2 })
        ));
        assert_eq!(calendar, before);
    }

    #[test]
    fn test_scope_starts_at_new_start_day() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(5), 7).unwrap();
        calendar.schedule("B", &days_only(1), 9).unwrap();

        // A's clash on day 9 must move forward, not back into days 7-8
        assert_eq!(calendar.active_days("B").unwrap(), vec![9]);
        assert_eq!(calendar.active_days("A").unwrap(), vec![7, 8, 10, 11, 14]);
    }

    #[test]
    fn test_delete_compacts_ranks() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(1), 0).unwrap();
        calendar.schedule("B", &days_only(1), 1).unwrap();
        calendar.schedule("C", &days_only(1), 2).unwrap();

        let removed = calendar.delete("B").unwrap();
        assert_eq!(removed.label(), "B");
        assert_eq!(calendar.rank_of("C"), Some(0));
        assert_eq!(calendar.rank_of("A"), Some(1));
        assert_eq!(calendar.active_days("A").unwrap(), vec![0]);
        assert!(calendar.get("B").is_none());
    }

    #[test]
    fn test_delete_unknown_label() {
        let mut calendar = PriorityCalendar::new();
        let err = calendar.delete("missing").unwrap_err();
        assert!(matches!(err, LabCalError::ExperimentNotFound(_)));
    }

    #[test]
    fn test_occupant() {
        let mut calendar = PriorityCalendar::new();
        calendar.schedule("A", &days_only(2), 0).unwrap();
        assert_eq!(calendar.occupant(1).map(Experiment::label), Some("A"));
        assert!(calendar.occupant(2).is_none());
    }

    #[test]
    fn test_restore_rejects_duplicates_and_overlaps() {
        let a = Experiment::new("A", 0, DayMask::from_days([0]));
        let a2 = Experiment::new("A", 1, DayMask::from_days([1]));
        let err = PriorityCalendar::restore(vec![a.clone(), a2], CollisionResolver::default())
            .unwrap_err();
        assert!(matches!(err, LabCalError::Store(_)));

        let b = Experiment::new("B", 0, DayMask::from_days([0]));
        let err = PriorityCalendar::restore(vec![a.clone(), b], CollisionResolver::default())
            .unwrap_err();
        assert!(matches!(err, LabCalError::Store(_)));

        let weekend = Experiment::new("W", 5, DayMask::from_days([5]));
        let err =
            PriorityCalendar::restore(vec![weekend], CollisionResolver::default()).unwrap_err();
        assert!(matches!(err, LabCalError::Store(_)));

        let calendar = PriorityCalendar::restore(vec![a], CollisionResolver::default()).unwrap();
        assert_eq!(calendar.len(), 1);
    }
}
