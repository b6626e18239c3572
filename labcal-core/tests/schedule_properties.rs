//! Whole-calendar properties of scheduling and collision resolution.

use labcal_core::constants::GRID_DAYS;
use labcal_core::day_grid::is_blocked;
use labcal_core::error::Infeasibility;
use labcal_core::schedule::resolver::CollisionResolver;
use labcal_core::{CadenceSpec, DayMask, LabCalError, MonthlyMode, PriorityCalendar};

fn assert_invariants(calendar: &PriorityCalendar) {
    let grid = calendar.grid();
    for day in 0..GRID_DAYS {
        let occupied = grid.experiment_count(day);
        assert!(occupied <= 1, "day {day} holds {occupied} experiments");
        if is_blocked(day) {
            assert_eq!(occupied, 0, "blocked day {day} is occupied");
        }
    }
    assert!(grid.is_resolved());
}

fn mixed_workload() -> Vec<(&'static str, CadenceSpec, usize)> {
    vec![
        ("weekly", CadenceSpec::new(1, 10, MonthlyMode::None), 14),
        ("monthly", CadenceSpec::new(2, 0, MonthlyMode::Count(5)), 15),
        ("burst", CadenceSpec::new(10, 0, MonthlyMode::None), 14),
        ("standing", CadenceSpec::new(3, 2, MonthlyMode::Indefinite), 21),
        ("spot check", CadenceSpec::one_off(), 16),
        ("friday start", CadenceSpec::new(1, 4, MonthlyMode::Count(2)), 18),
        ("long run", CadenceSpec::new(30, 0, MonthlyMode::None), 28),
    ]
}

#[test]
fn test_invariants_hold_after_every_insert() {
    let mut calendar = PriorityCalendar::new();
    for (label, cadence, start) in mixed_workload() {
        calendar.schedule(label, &cadence, start).unwrap();
        assert_invariants(&calendar);
    }
    assert_eq!(calendar.len(), 7);
}

#[test]
fn test_invariants_hold_after_deletes() {
    let mut calendar = PriorityCalendar::new();
    for (label, cadence, start) in mixed_workload() {
        calendar.schedule(label, &cadence, start).unwrap();
    }

    for label in ["burst", "weekly", "long run"] {
        let before: Vec<_> = calendar
            .experiments()
            .iter()
            .filter(|e| e.label() != label)
            .cloned()
            .collect();
        calendar.delete(label).unwrap();
        assert_eq!(calendar.experiments(), before.as_slice());
        assert_invariants(&calendar);
    }
}

#[test]
fn test_newest_unblocked_experiment_never_moves() {
    let mut calendar = PriorityCalendar::new();
    for (label, cadence, start) in mixed_workload() {
        let mask = cadence.expand(start).unwrap();
        let touches_weekend = mask.days().into_iter().any(is_blocked);

        calendar.schedule(label, &cadence, start).unwrap();

        assert_eq!(calendar.rank_of(label), Some(0));
        if !touches_weekend {
            assert_eq!(calendar.get(label).unwrap().mask(), &mask);
        }
    }
}

#[test]
fn test_insert_without_overlap_is_naive_union() {
    let mut calendar = PriorityCalendar::new();
    calendar
        .schedule("A", &CadenceSpec::new(3, 0, MonthlyMode::None), 0)
        .unwrap();
    calendar
        .schedule("B", &CadenceSpec::new(1, 3, MonthlyMode::None), 7)
        .unwrap();
    let before = calendar.clone();

    let mask = DayMask::from_days([3, 4, 10]);
    let outcome = calendar.insert("C", 3, mask.clone()).unwrap();

    assert_eq!(outcome.steps, 0);
    assert!(outcome.displaced.is_empty());
    assert_eq!(calendar.get("C").unwrap().mask(), &mask);
    for experiment in before.experiments() {
        assert_eq!(calendar.get(experiment.label()), Some(experiment));
    }
}

#[test]
fn test_displacement_scenario() {
    let mut calendar = PriorityCalendar::new();
    let a = calendar
        .schedule("A", &CadenceSpec::new(3, 0, MonthlyMode::None), 0)
        .unwrap();
    assert_eq!(a.steps, 0);
    assert_eq!(calendar.active_days("A").unwrap(), vec![0, 1, 2]);

    let b = calendar
        .schedule("B", &CadenceSpec::new(5, 0, MonthlyMode::None), 0)
        .unwrap();
    assert_eq!(b.steps, 21);
    assert_eq!(b.displaced, vec!["A".to_string()]);

    let labels: Vec<&str> = calendar.labels().collect();
    assert_eq!(labels, vec!["B", "A"]);
    assert_eq!(calendar.active_days("B").unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(calendar.active_days("A").unwrap(), vec![7, 8, 9]);
    assert_invariants(&calendar);
}

#[test]
fn test_duplicate_label_changes_nothing() {
    let mut calendar = PriorityCalendar::new();
    for (label, cadence, start) in mixed_workload() {
        calendar.schedule(label, &cadence, start).unwrap();
    }
    let before = calendar.clone();

    let err = calendar
        .schedule("burst", &CadenceSpec::one_off(), 100)
        .unwrap_err();
    assert!(matches!(err, LabCalError::DuplicateLabel(_)));
    assert_eq!(calendar, before);
}

#[test]
fn test_indefinite_without_initial_days_is_invalid() {
    let mut calendar = PriorityCalendar::new();
    let err = calendar
        .schedule("forever", &CadenceSpec::new(0, 0, MonthlyMode::Indefinite), 0)
        .unwrap_err();
    assert!(matches!(err, LabCalError::InvalidCadence(_)));
    assert!(calendar.is_empty());
}

#[test]
fn test_full_calendar_is_infeasible_and_unchanged() {
    let mut calendar = PriorityCalendar::new();
    let weekdays = DayMask::from_days((0..GRID_DAYS).filter(|&d| !is_blocked(d)));
    calendar.insert("everything", 0, weekdays).unwrap();
    let before = calendar.clone();

    let err = calendar
        .schedule("one more", &CadenceSpec::one_off(), 200)
        .unwrap_err();
    assert!(matches!(
        err,
        LabCalError::Infeasible(Infeasibility::NoFreeDay { .. })
    ));
    assert_eq!(calendar, before);
}

#[test]
fn test_iteration_ceiling_is_distinguishable() {
    let mut calendar = PriorityCalendar::with_resolver(CollisionResolver::new(1));
    calendar
        .schedule("A", &CadenceSpec::new(3, 0, MonthlyMode::None), 0)
        .unwrap();

    let err = calendar
        .schedule("B", &CadenceSpec::new(5, 0, MonthlyMode::None), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        LabCalError::Infeasible(Infeasibility::IterationLimit { iterations: 1 })
    ));
    assert_eq!(calendar.labels().collect::<Vec<_>>(), vec!["A"]);
}
