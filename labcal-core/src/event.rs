//! Provider-neutral measurement events.
//!
//! Every active day of an experiment becomes one event on the remote
//! calendar. Providers convert these into their own API types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::config::EventTemplate;
use crate::error::LabCalResult;

/// One measurement session of an experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementEvent {
    pub id: String,
    /// Experiment label
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: NaiveDate,
    /// Local start, interpreted in `timezone`
    pub start: NaiveDateTime,
    /// Local end, interpreted in `timezone`
    pub end: NaiveDateTime,
    /// IANA timezone name
    pub timezone: String,
}

impl MeasurementEvent {
    /// Build the event for `label` on `date` with a fresh id.
    pub fn new(label: &str, date: NaiveDate, template: &EventTemplate) -> LabCalResult<Self> {
        let (start_time, end_time) = template.times()?;
        template.tz()?;

        Ok(MeasurementEvent {
            id: new_event_id(),
            summary: label.to_string(),
            description: template.description.clone(),
            location: template.location.clone(),
            date,
            start: date.and_time(start_time),
            end: date.and_time(end_time),
            timezone: template.timezone.clone(),
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// 32 lowercase hex characters. Valid for providers that restrict ids to
/// the base32hex alphabet.
pub fn new_event_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
