//! Core library for labcal.
//!
//! Schedules recurring lab experiments on a shared one-year calendar, where
//! the newest experiment has right of way and older ones are displaced
//! around it. Also holds the persistence, configuration and remote calendar
//! plumbing used by the `labcal` CLI:
//! - `schedule` for the priority calendar and collision resolver
//! - `cadence` for expanding an experiment's cadence into grid days
//! - `sync` and `remote` for mirroring the schedule to a remote calendar

pub mod cadence;
pub mod config;
pub mod constants;
pub mod day_grid;
pub mod error;
pub mod event;
pub mod experiment;
pub mod ics;
pub mod labcal;
pub mod mask;
pub mod remote;
pub mod schedule;
pub mod store;
pub mod sync;

pub use cadence::{CadenceSpec, MonthlyMode};
pub use day_grid::{Day, DayGrid};
pub use error::{LabCalError, LabCalResult};
pub use experiment::Experiment;
pub use labcal::Labcal;
pub use mask::DayMask;
pub use schedule::PriorityCalendar;
