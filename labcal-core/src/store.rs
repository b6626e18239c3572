//! Persistence of the resolved calendar.
//!
//! The schedule is stored as a JSON array in rank order, so priority is
//! recovered from position on load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::GRID_DAYS;
use crate::day_grid::Day;
use crate::error::{LabCalError, LabCalResult};
use crate::experiment::Experiment;
use crate::mask::DayMask;
use crate::schedule::PriorityCalendar;
use crate::schedule::resolver::CollisionResolver;

pub const SCHEDULE_FILE: &str = "schedule.json";

pub trait ScheduleStore {
    /// The stored calendar, or None when nothing has been saved yet.
    fn load(&self) -> LabCalResult<Option<PriorityCalendar>>;

    fn save(&self, calendar: &PriorityCalendar) -> LabCalResult<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredExperiment {
    label: String,
    start_day: Day,
    days: Vec<Day>,
}

impl From<&Experiment> for StoredExperiment {
    fn from(experiment: &Experiment) -> Self {
        StoredExperiment {
            label: experiment.label().to_string(),
            start_day: experiment.start_day(),
            days: experiment.active_days(),
        }
    }
}

impl StoredExperiment {
    fn into_experiment(self) -> LabCalResult<Experiment> {
        if let Some(day) = self
            .days
            .iter()
            .copied()
            .chain(std::iter::once(self.start_day))
            .find(|&day| day >= GRID_DAYS)
        {
            return Err(LabCalError::Store(format!(
                "experiment '{}' references day {day}, outside the grid",
                self.label
            )));
        }

        Ok(Experiment::new(
            &self.label,
            self.start_day,
            DayMask::from_days(self.days),
        ))
    }
}

/// Schedule kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    /// Store at `schedule.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SCHEDULE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScheduleStore for JsonStore {
    fn load(&self) -> LabCalResult<Option<PriorityCalendar>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let stored: Vec<StoredExperiment> = serde_json::from_str(&content).map_err(|e| {
            LabCalError::Store(format!("{} is not a valid schedule: {e}", self.path.display()))
        })?;

        let experiments = stored
            .into_iter()
            .map(StoredExperiment::into_experiment)
            .collect::<LabCalResult<Vec<_>>>()?;

        debug!(path = %self.path.display(), experiments = experiments.len(), "schedule loaded");
        PriorityCalendar::restore(experiments, CollisionResolver::default()).map(Some)
    }

    fn save(&self, calendar: &PriorityCalendar) -> LabCalResult<()> {
        let stored: Vec<StoredExperiment> = calendar
            .experiments()
            .iter()
            .map(StoredExperiment::from)
            .collect();
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| LabCalError::Serialization(e.to_string()))?;

        write_atomic(&self.path, &content)?;
        debug!(path = %self.path.display(), experiments = stored.len(), "schedule saved");
        Ok(())
    }
}

/// Write through a sibling temp file so readers never see a partial file.
pub(crate) fn write_atomic(path: &Path, content: &str) -> LabCalResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(".tmp");
    let temp = PathBuf::from(temp);

    std::fs::write(&temp, content)?;
    std::fs::rename(&temp, path)?;
    Ok(())
}
