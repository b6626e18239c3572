//! Pushing the resolved schedule to a remote calendar.
//!
//! Local state records which remote event stands for which experiment day.
//! A diff against that state yields the events to delete and to create.

mod diff_kind;
mod schedule_diff;
mod state;

pub use diff_kind::DiffKind;
pub use schedule_diff::{EventDiff, ScheduleDiff};
pub use state::{SyncState, SyncedEvent};
