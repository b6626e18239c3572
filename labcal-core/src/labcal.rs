//! Labcal root directory management.

use std::path::PathBuf;

use chrono::NaiveDate;
use config::{Config, File};
use tracing::debug;

use crate::config::{EventTemplate, LabcalConfig};
use crate::day_grid::DayGrid;
use crate::error::{LabCalError, LabCalResult};
use crate::ics::{REFERENCE_DIR, write_references};
use crate::remote::Remote;
use crate::schedule::PriorityCalendar;
use crate::schedule::resolver::CollisionResolver;
use crate::store::{JsonStore, ScheduleStore};
use crate::sync::SyncState;

#[derive(Debug, Clone)]
pub struct Labcal {
    config: LabcalConfig,
    grid: DayGrid,
}

impl Labcal {
    pub fn load() -> LabCalResult<Self> {
        let config_path = LabcalConfig::config_path()?;

        if !config_path.exists() {
            LabcalConfig::create_default_config(&config_path)?;
        }

        let config: LabcalConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .build()
            .map_err(|e| LabCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| LabCalError::Config(e.to_string()))?;

        Self::from_config(config)
    }

    /// Use an already parsed config. The epoch and event template are
    /// checked here so bad values fail before any scheduling.
    pub fn from_config(config: LabcalConfig) -> LabCalResult<Self> {
        let grid = DayGrid::new(config.epoch)?;
        config.event.validate()?;
        Ok(Labcal { config, grid })
    }

    pub fn config(&self) -> &LabcalConfig {
        &self.config
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.config.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Returns the data directory in display-friendly form, keeping `~`.
    pub fn display_path(&self) -> PathBuf {
        self.config.data_dir.clone()
    }

    pub fn grid(&self) -> &DayGrid {
        &self.grid
    }

    pub fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub fn resolver(&self) -> CollisionResolver {
        CollisionResolver::new(self.config.max_iterations)
    }

    pub fn event_template(&self) -> &EventTemplate {
        &self.config.event
    }

    pub fn store(&self) -> JsonStore {
        JsonStore::in_dir(&self.data_path())
    }

    pub fn sync_state(&self) -> LabCalResult<SyncState> {
        SyncState::load(&self.data_path())
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.data_path().join(REFERENCE_DIR)
    }

    pub fn remote(&self) -> LabCalResult<&Remote> {
        self.config
            .remote
            .as_ref()
            .ok_or(LabCalError::NoRemoteConfigured)
    }

    /// The stored calendar, or an empty one on first use.
    pub fn load_calendar(&self) -> LabCalResult<PriorityCalendar> {
        let mut calendar = self.store().load()?.unwrap_or_default();
        calendar.set_resolver(self.resolver());
        debug!(experiments = calendar.len(), "calendar loaded");
        Ok(calendar)
    }

    /// Persist a committed calendar and refresh the offline references.
    pub fn save_calendar(&self, calendar: &PriorityCalendar) -> LabCalResult<()> {
        self.store().save(calendar)?;
        write_references(
            &self.reference_dir(),
            calendar,
            &self.grid,
            self.event_template(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cadence::{CadenceSpec, MonthlyMode};

    fn labcal_in(dir: &std::path::Path) -> Labcal {
        Labcal::from_config(LabcalConfig {
            data_dir: dir.to_path_buf(),
            max_iterations: 50,
            ..LabcalConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_epoch_not_on_monday() {
        let config = LabcalConfig {
            epoch: NaiveDate::from_ymd_opt(2018, 1, 2).unwrap(),
            ..LabcalConfig::default()
        };
        assert!(matches!(
            Labcal::from_config(config).unwrap_err(),
            LabCalError::Config(_)
        ));
    }

    #[test]
    fn test_first_load_is_empty_and_uses_configured_resolver() {
        let dir = tempfile::tempdir().unwrap();
        let labcal = labcal_in(dir.path());

        let calendar = labcal.load_calendar().unwrap();
        assert!(calendar.is_empty());
        assert_eq!(calendar.resolver().max_iterations(), 50);
    }

    #[test]
    fn test_save_calendar_writes_schedule_and_references() {
        let dir = tempfile::tempdir().unwrap();
        let labcal = labcal_in(dir.path());

        let mut calendar = labcal.load_calendar().unwrap();
        calendar
            .schedule("Growth", &CadenceSpec::new(2, 0, MonthlyMode::None), 0)
            .unwrap();
        labcal.save_calendar(&calendar).unwrap();

        assert!(dir.path().join("schedule.json").exists());
        assert!(dir.path().join("experiments/growth.ics").exists());

        let reloaded = labcal.load_calendar().unwrap();
        assert_eq!(reloaded.active_days("Growth").unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_remote_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            labcal_in(dir.path()).remote().unwrap_err(),
            LabCalError::NoRemoteConfigured
        ));
    }
}
