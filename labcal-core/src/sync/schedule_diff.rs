//! Diff between the resolved schedule and the events already on the remote.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::EventTemplate;
use crate::day_grid::DayGrid;
use crate::error::LabCalResult;
use crate::event::MeasurementEvent;
use crate::remote::RemoteCalendar;
use crate::schedule::PriorityCalendar;
use crate::sync::{DiffKind, SyncState, SyncedEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDiff {
    Create {
        label: String,
        event: MeasurementEvent,
    },
    Delete {
        label: String,
        synced: SyncedEvent,
    },
}

impl EventDiff {
    pub fn kind(&self) -> DiffKind {
        match self {
            EventDiff::Create { .. } => DiffKind::Create,
            EventDiff::Delete { .. } => DiffKind::Delete,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            EventDiff::Create { label, .. } | EventDiff::Delete { label, .. } => label,
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            EventDiff::Create { event, .. } => event.date,
            EventDiff::Delete { synced, .. } => synced.date,
        }
    }
}

/// Remote changes needed to mirror a calendar. Deletes come before creates.
#[derive(Debug, Clone, Default)]
pub struct ScheduleDiff {
    pub diffs: Vec<EventDiff>,
}

impl ScheduleDiff {
    /// Incremental diff: create events for active days nobody has synced
    /// yet, delete synced events whose day is no longer active.
    pub fn compute(
        calendar: &PriorityCalendar,
        state: &SyncState,
        grid: &DayGrid,
        template: &EventTemplate,
    ) -> LabCalResult<Self> {
        let mut deletes = Vec::new();
        let mut creates = Vec::new();

        for experiment in calendar.experiments() {
            let label = experiment.label();
            let dates: BTreeSet<NaiveDate> = experiment
                .active_days()
                .into_iter()
                .map(|day| grid.date_of(day))
                .collect();

            let mut covered = HashSet::new();
            for synced in state.events_for(label) {
                // A second event on the same date is a leftover and goes too
                if dates.contains(&synced.date) && covered.insert(synced.date) {
                    continue;
                }
                deletes.push(EventDiff::Delete {
                    label: label.to_string(),
                    synced: synced.clone(),
                });
            }

            for &date in dates.iter().filter(|date| !covered.contains(*date)) {
                creates.push(EventDiff::Create {
                    label: label.to_string(),
                    event: MeasurementEvent::new(label, date, template)?,
                });
            }
        }

        for label in state.labels().filter(|l| calendar.get(l).is_none()) {
            deletes.extend(state.events_for(label).iter().map(|synced| EventDiff::Delete {
                label: label.to_string(),
                synced: synced.clone(),
            }));
        }

        Ok(Self::ordered(deletes, creates))
    }

    /// Full rebuild: every synced event is deleted and every active day is
    /// created again.
    pub fn rebuild(
        calendar: &PriorityCalendar,
        state: &SyncState,
        grid: &DayGrid,
        template: &EventTemplate,
    ) -> LabCalResult<Self> {
        let deletes = state
            .labels()
            .flat_map(|label| {
                state.events_for(label).iter().map(|synced| EventDiff::Delete {
                    label: label.to_string(),
                    synced: synced.clone(),
                })
            })
            .collect();

        let mut creates = Vec::new();
        for experiment in calendar.experiments() {
            for day in experiment.active_days() {
                creates.push(EventDiff::Create {
                    label: experiment.label().to_string(),
                    event: MeasurementEvent::new(experiment.label(), grid.date_of(day), template)?,
                });
            }
        }

        Ok(Self::ordered(deletes, creates))
    }

    fn ordered(mut deletes: Vec<EventDiff>, mut creates: Vec<EventDiff>) -> Self {
        deletes.sort_by_key(EventDiff::date);
        creates.sort_by_key(EventDiff::date);
        deletes.extend(creates);
        ScheduleDiff { diffs: deletes }
    }

    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty()
    }

    /// (created, deleted)
    pub fn counts(&self) -> (usize, usize) {
        let created = self
            .diffs
            .iter()
            .filter(|d| d.kind() == DiffKind::Create)
            .count();
        (created, self.diffs.len() - created)
    }

    /// Push every change to `remote`, recording each success in `state`.
    ///
    /// State is saved even when a change fails, so the next sync resumes
    /// from where this one stopped.
    pub async fn apply<R: RemoteCalendar>(
        &self,
        remote: &R,
        state: &mut SyncState,
        mut on_applied: impl FnMut(&EventDiff),
    ) -> LabCalResult<()> {
        let result = self.apply_each(remote, state, &mut on_applied).await;
        state.save()?;

        match &result {
            Ok(()) => {
                let (created, deleted) = self.counts();
                info!(created, deleted, "schedule pushed to remote");
            }
            Err(e) => warn!(error = %e, "sync stopped early"),
        }

        result
    }

    async fn apply_each<R: RemoteCalendar>(
        &self,
        remote: &R,
        state: &mut SyncState,
        on_applied: &mut impl FnMut(&EventDiff),
    ) -> LabCalResult<()> {
        for diff in &self.diffs {
            match diff {
                EventDiff::Create { label, event } => {
                    let event_id = remote.create_event(event).await?;
                    state.record(
                        label,
                        SyncedEvent {
                            date: event.date,
                            event_id,
                        },
                    );
                }
                EventDiff::Delete { label, synced } => {
                    remote.delete_event(&synced.event_id).await?;
                    state.forget(label, &synced.event_id);
                }
            }
            on_applied(diff);
        }
        Ok(())
    }
}
