//! Error types for labcal.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

use crate::day_grid::Day;

/// Why a requested start date was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartDayError {
    InThePast { date: NaiveDate, today: NaiveDate },
    OnBlockedDay(NaiveDate),
    OutsideGrid(NaiveDate),
}

impl fmt::Display for StartDayError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StartDayError::InThePast { date, today } => {
                write!(f, "{date} is in the past (today is {today})")
            }
            StartDayError::OnBlockedDay(date) => write!(f, "{date} is on the weekend"),
            StartDayError::OutsideGrid(date) => {
                write!(f, "{date} is outside the scheduling year")
            }
        }
    }
}

/// Why collision resolution gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Infeasibility {
    /// A collision was found but no free day remains anywhere in scope.
    NoFreeDay { day: Day },
    /// The resolver did not settle within the iteration ceiling.
    IterationLimit { iterations: u64 },
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Infeasibility::NoFreeDay { day } => write!(
                f,
                "no free days left to move the collision on day {day}; \
                 delete or downsample lower priority experiments"
            ),
            Infeasibility::IterationLimit { iterations } => write!(
                f,
                "no stable schedule found after {iterations} steps; \
                 too many experiments are currently listed"
            ),
        }
    }
}

/// Errors that can occur in labcal operations.
#[derive(Error, Debug)]
pub enum LabCalError {
    #[error("Experiment with label '{0}' already exists")]
    DuplicateLabel(String),

    #[error("Invalid start date: {0}")]
    InvalidStartDay(StartDayError),

    #[error("Invalid cadence: {0}")]
    InvalidCadence(String),

    #[error("Cannot schedule experiment: {0}")]
    Infeasible(Infeasibility),

    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schedule store error: {0}")]
    Store(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("No remote calendar configured")]
    NoRemoteConfigured,

    #[error("ICS generation error: {0}")]
    IcsGenerate(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for labcal operations.
pub type LabCalResult<T> = Result<T, LabCalError>;
