//! Global labcal configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EPOCH, DEFAULT_MAX_ITERATIONS};
use crate::day_grid::default_epoch;
use crate::error::{LabCalError, LabCalResult};
use crate::remote::Remote;

static DEFAULT_DATA_PATH: &str = "~/labcal";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn is_default_data_dir(p: &PathBuf) -> bool {
    *p == default_data_dir()
}

fn default_max_iterations() -> u64 {
    DEFAULT_MAX_ITERATIONS
}

/// Global configuration at ~/.config/labcal/config.toml
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LabcalConfig {
    #[serde(default = "default_data_dir", skip_serializing_if = "is_default_data_dir")]
    pub data_dir: PathBuf,

    /// Calendar date of grid day 0. Must be a Monday.
    #[serde(default = "default_epoch")]
    pub epoch: NaiveDate,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,

    #[serde(default)]
    pub event: EventTemplate,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<Remote>,
}

impl Default for LabcalConfig {
    fn default() -> Self {
        LabcalConfig {
            data_dir: default_data_dir(),
            epoch: default_epoch(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            event: EventTemplate::default(),
            remote: None,
        }
    }
}

impl LabcalConfig {
    pub fn config_path() -> LabCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| LabCalError::Config("Could not determine config directory".into()))?
            .join("labcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> LabCalResult<()> {
        let contents = format!(
            "\
# labcal configuration

# Where the schedule, sync state and offline references live:
# data_dir = \"{DEFAULT_DATA_PATH}\"

# Date of the first day of the scheduling year (must be a Monday):
# epoch = \"{DEFAULT_EPOCH}\"

# Resolver steps allowed before a schedule is declared infeasible:
# max_iterations = {DEFAULT_MAX_ITERATIONS}

# Details used for every measurement event:
# [event]
# start_time = \"09:00\"
# end_time = \"17:00\"
# timezone = \"Europe/London\"
# location = \"Lab 1\"

# Remote calendar to push measurement events to:
# [remote]
# provider = \"google\"
# google_calendar_id = \"...\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LabCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| LabCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn default_start_time() -> String {
    "09:00".to_string()
}

fn default_end_time() -> String {
    "17:00".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

/// Fields shared by every measurement event pushed to the remote.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EventTemplate {
    #[serde(default = "default_start_time")]
    pub start_time: String,

    #[serde(default = "default_end_time")]
    pub end_time: String,

    /// IANA timezone name
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for EventTemplate {
    fn default() -> Self {
        EventTemplate {
            start_time: default_start_time(),
            end_time: default_end_time(),
            timezone: default_timezone(),
            location: None,
            description: None,
        }
    }
}

impl EventTemplate {
    /// Parsed (start, end) times of day. End must come after start.
    pub fn times(&self) -> LabCalResult<(NaiveTime, NaiveTime)> {
        let start = parse_time(&self.start_time)?;
        let end = parse_time(&self.end_time)?;

        if end <= start {
            return Err(LabCalError::Config(format!(
                "event end_time {} must be after start_time {}",
                self.end_time, self.start_time
            )));
        }

        Ok((start, end))
    }

    pub fn tz(&self) -> LabCalResult<Tz> {
        Tz::from_str(&self.timezone)
            .map_err(|_| LabCalError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    pub fn validate(&self) -> LabCalResult<()> {
        self.times()?;
        self.tz()?;
        Ok(())
    }
}

fn parse_time(s: &str) -> LabCalResult<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| LabCalError::Config(format!("Invalid time '{s}'. Expected HH:MM")))
}
