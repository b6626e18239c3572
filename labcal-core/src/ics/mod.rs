//! Offline reference files.
//!
//! Each experiment gets `experiments/<slug>.ics` listing its measurement
//! events, so the schedule stays readable without the remote.

mod generate;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::EventTemplate;
use crate::day_grid::DayGrid;
use crate::error::LabCalResult;
use crate::event::MeasurementEvent;
use crate::experiment::Experiment;
use crate::schedule::PriorityCalendar;

pub use generate::generate_ics;

pub const REFERENCE_DIR: &str = "experiments";

fn base_slug(label: &str) -> String {
    let slug = slug::slugify(label);
    if slug.is_empty() {
        "experiment".to_string()
    } else {
        slug
    }
}

/// Reference events use stable ids so rewriting a file does not change them.
fn reference_events(
    experiment: &Experiment,
    slug: &str,
    grid: &DayGrid,
    template: &EventTemplate,
) -> LabCalResult<Vec<MeasurementEvent>> {
    experiment
        .active_days()
        .into_iter()
        .map(|day| {
            let date = grid.date_of(day);
            let event = MeasurementEvent::new(experiment.label(), date, template)?
                .with_id(format!("{}-{}@labcal", slug, date.format("%Y%m%d")));
            Ok(event)
        })
        .collect()
}

/// Rewrite every reference file in `dir` and remove those of experiments
/// no longer in the calendar. Returns the files written.
pub fn write_references(
    dir: &Path,
    calendar: &PriorityCalendar,
    grid: &DayGrid,
    template: &EventTemplate,
) -> LabCalResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut used = HashSet::new();
    let mut written = Vec::new();

    for experiment in calendar.experiments() {
        let base = base_slug(experiment.label());
        let mut slug = base.clone();
        let mut n = 2;
        while !used.insert(slug.clone()) {
            slug = format!("{base}-{n}");
            n += 1;
        }

        let events = reference_events(experiment, &slug, grid, template)?;
        let content = generate_ics(experiment.label(), &events)?;
        let path = dir.join(format!("{slug}.ics"));
        std::fs::write(&path, content)?;
        written.push(path);
    }

    for entry in std::fs::read_dir(dir)?.filter_map(|entry| entry.ok()) {
        let path = entry.path();
        if path.extension().is_some_and(|e| e == "ics") && !written.contains(&path) {
            debug!(path = %path.display(), "removing stale reference");
            std::fs::remove_file(&path)?;
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::{CadenceSpec, MonthlyMode};

    #[test]
    fn test_write_references_and_remove_stale() {
        let dir = tempfile::tempdir().unwrap();
        let grid = DayGrid::default();
        let template = EventTemplate::default();

        let mut calendar = PriorityCalendar::new();
        let cadence = CadenceSpec::new(2, 0, MonthlyMode::None);
        calendar.schedule("Cell Growth", &cadence, 0).unwrap();
        calendar.schedule("cell growth", &cadence, 2).unwrap();

        let written = write_references(dir.path(), &calendar, &grid, &template).unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("cell-growth.ics"),
                dir.path().join("cell-growth-2.ics"),
            ]
        );

        let content = std::fs::read_to_string(&written[1]).unwrap();
        assert!(content.contains("UID:cell-growth-2-20180101@labcal"));

        calendar.delete("Cell Growth").unwrap();
        write_references(dir.path(), &calendar, &grid, &template).unwrap();
        assert!(dir.path().join("cell-growth.ics").exists());
        assert!(!dir.path().join("cell-growth-2.ics").exists());
    }
}
