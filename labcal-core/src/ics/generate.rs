//! ICS file generation.

use icalendar::{Calendar, Component, EventLike, Property};

use crate::error::{LabCalError, LabCalResult};
use crate::event::MeasurementEvent;

/// Generate .ics content holding every event of one experiment.
pub fn generate_ics(name: &str, events: &[MeasurementEvent]) -> LabCalResult<String> {
    if events.is_empty() {
        return Err(LabCalError::IcsGenerate(format!(
            "experiment '{name}' has no events to export"
        )));
    }

    let mut cal = Calendar::new();
    cal.name(name);

    let dtstamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string();

    for event in events {
        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&event.id);
        ics_event.summary(&event.summary);
        ics_event.add_property("DTSTAMP", &dtstamp);

        add_zoned_property(&mut ics_event, "DTSTART", event.start, &event.timezone);
        add_zoned_property(&mut ics_event, "DTEND", event.end, &event.timezone);

        if let Some(ref desc) = event.description {
            ics_event.description(desc);
        }

        if let Some(ref loc) = event.location {
            ics_event.location(loc);
        }

        cal.push(ics_event.done());
    }

    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with LABCAL
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:LABCAL\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

fn add_zoned_property(
    ics_event: &mut icalendar::Event,
    name: &str,
    datetime: chrono::NaiveDateTime,
    tzid: &str,
) {
    let mut prop = Property::new(name, datetime.format("%Y%m%dT%H%M%S").to_string());
    prop.add_parameter("TZID", tzid);
    ics_event.append_property(prop);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventTemplate;
    use chrono::NaiveDate;

    fn event(day: u32) -> MeasurementEvent {
        let template = EventTemplate {
            location: Some("Room 116A".into()),
            ..EventTemplate::default()
        };
        MeasurementEvent::new(
            "Calibration",
            NaiveDate::from_ymd_opt(2018, 1, day).unwrap(),
            &template,
        )
        .unwrap()
        .with_id(format!("calibration-{day}@labcal"))
    }

    #[test]
    fn test_generate_ics_one_vevent_per_day() {
        let ics = generate_ics("Calibration", &[event(1), event(2)]).unwrap();

        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("UID:calibration-1@labcal"));
        assert!(ics.contains("DTSTART;TZID=Europe/London:20180102T090000"));
        assert!(ics.contains("DTEND;TZID=Europe/London:20180102T170000"));
        assert!(ics.contains("LOCATION:Room 116A"));
        assert!(ics.contains("PRODID:LABCAL"));
        assert!(!ics.contains("CALSCALE:GREGORIAN"));
    }

    #[test]
    fn test_generate_ics_requires_events() {
        assert!(matches!(
            generate_ics("Empty", &[]).unwrap_err(),
            LabCalError::IcsGenerate(_)
        ));
    }
}
