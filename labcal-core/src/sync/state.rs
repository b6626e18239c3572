//! Sync state tracking: which remote events exist for each experiment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{LabCalError, LabCalResult};
use crate::store::write_atomic;

const STATE_DIR: &str = "state";
const EVENTS_FILE: &str = "events.json";

/// A measurement event known to exist on the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedEvent {
    pub date: NaiveDate,
    pub event_id: String,
}

#[derive(Debug, Clone)]
pub struct SyncState {
    path: PathBuf,
    events: BTreeMap<String, Vec<SyncedEvent>>,
}

impl SyncState {
    /// Load `state/events.json` under `data_dir`. A missing file is an
    /// empty state.
    pub fn load(data_dir: &Path) -> LabCalResult<Self> {
        let path = data_dir.join(STATE_DIR).join(EVENTS_FILE);

        let events = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                LabCalError::Store(format!("{} is not valid sync state: {e}", path.display()))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(SyncState { path, events })
    }

    pub fn save(&self) -> LabCalResult<()> {
        let content = serde_json::to_string_pretty(&self.events)
            .map_err(|e| LabCalError::Serialization(e.to_string()))?;
        write_atomic(&self.path, &content)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn events_for(&self, label: &str) -> &[SyncedEvent] {
        self.events.get(label).map_or(&[], Vec::as_slice)
    }

    pub fn event_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }

    pub fn record(&mut self, label: &str, event: SyncedEvent) {
        let events = self.events.entry(label.to_string()).or_default();
        events.push(event);
        events.sort_by_key(|e| e.date);
    }

    /// Forget one event. Labels with no events left are dropped.
    pub fn forget(&mut self, label: &str, event_id: &str) {
        if let Some(events) = self.events.get_mut(label) {
            events.retain(|e| e.event_id != event_id);
            if events.is_empty() {
                self.events.remove(label);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synced(day: u32, id: &str) -> SyncedEvent {
        SyncedEvent {
            date: NaiveDate::from_ymd_opt(2018, 1, day).unwrap(),
            event_id: id.to_string(),
        }
    }

    #[test]
    fn test_empty_state_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let state = SyncState::load(dir.path()).unwrap();
        assert!(state.is_empty());
        assert!(state.events_for("A").is_empty());
        assert_eq!(state.path(), dir.path().join("state/events.json"));
    }

    #[test]
    fn test_record_forget_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = SyncState::load(dir.path()).unwrap();

        state.record("A", synced(3, "b"));
        state.record("A", synced(2, "a"));
        state.record("B", synced(4, "c"));
        state.save().unwrap();

        let mut reloaded = SyncState::load(dir.path()).unwrap();
        assert_eq!(reloaded.events_for("A"), &[synced(2, "a"), synced(3, "b")]);
        assert_eq!(reloaded.event_count(), 3);

        reloaded.forget("B", "c");
        let labels: Vec<&str> = reloaded.labels().collect();
        assert_eq!(labels, vec!["A"]);
    }

    #[test]
    fn test_corrupt_state_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("state")).unwrap();
        std::fs::write(dir.path().join("state/events.json"), "[1,2").unwrap();
        assert!(matches!(
            SyncState::load(dir.path()).unwrap_err(),
            LabCalError::Store(_)
        ));
    }
}
