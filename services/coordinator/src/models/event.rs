//! Event model and related functionality

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::{changed, write_json};

/// Format the console accepts for event start and end times
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an operator supplied `YYYY-MM-DD HH:MM:SS` timestamp
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(input.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| format!("'{}' is not a valid timestamp (YYYY-MM-DD HH:MM:SS): {}", input, e))
}

/// Event entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    /// Intended upper bound on registrants, never enforced
    pub capacity: i32,
    /// Id of the user who created the event
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}

/// New event creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: NaiveDateTime,
    pub ends_at: NaiveDateTime,
    pub capacity: i32,
    pub created_by: i64,
}

impl NewEvent {
    /// Presence check on the required fields
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        Ok(())
    }
}

/// Event update payload; `None` leaves the stored value untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<NaiveDateTime>,
    pub ends_at: Option<NaiveDateTime>,
    pub capacity: Option<i32>,
}

impl EventUpdate {
    /// Build an update from raw operator input, where an empty string means
    /// "leave this field unchanged". Non-empty timestamps and capacity must
    /// parse.
    pub fn from_input(
        title: &str,
        description: &str,
        location: &str,
        starts_at: &str,
        ends_at: &str,
        capacity: &str,
    ) -> Result<Self, String> {
        let starts_at = changed(starts_at).map(|s| parse_timestamp(&s)).transpose()?;
        let ends_at = changed(ends_at).map(|s| parse_timestamp(&s)).transpose()?;
        let capacity = changed(capacity)
            .map(|s| {
                s.trim()
                    .parse::<i32>()
                    .map_err(|_| format!("'{}' is not a valid capacity", s))
            })
            .transpose()?;

        Ok(Self {
            title: changed(title),
            description: changed(description),
            location: changed(location),
            starts_at,
            ends_at,
            capacity,
        })
    }

    /// Overwrite the fields present in this update
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(starts_at) = self.starts_at {
            event.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            event.ends_at = ends_at;
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Event {
        Event {
            id: 1,
            title: "Park cleanup".to_string(),
            description: "Pick up litter".to_string(),
            location: "Riverside".to_string(),
            starts_at: parse_timestamp("2024-07-01 10:00:00").unwrap(),
            ends_at: parse_timestamp("2024-07-01 12:00:00").unwrap(),
            capacity: 50,
            created_by: 3,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn parses_console_timestamps() {
        let ts = parse_timestamp("2024-07-01 10:30:00").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-07-01 10:30:00");
        assert!(parse_timestamp("2024-07-01").is_err());
        assert!(parse_timestamp("tomorrow").is_err());
    }

    #[test]
    fn update_only_touches_non_empty_fields() {
        let mut event = event();
        let update = EventUpdate::from_input("", "", "Hilltop", "", "2024-07-01 13:00:00", "75")
            .unwrap();
        update.apply(&mut event);

        assert_eq!(event.title, "Park cleanup");
        assert_eq!(event.description, "Pick up litter");
        assert_eq!(event.location, "Hilltop");
        assert_eq!(event.starts_at, parse_timestamp("2024-07-01 10:00:00").unwrap());
        assert_eq!(event.ends_at, parse_timestamp("2024-07-01 13:00:00").unwrap());
        assert_eq!(event.capacity, 75);
    }

    #[test]
    fn all_empty_update_is_a_no_op() {
        let mut event = event();
        let before = event.clone();
        EventUpdate::from_input("", "", "", "", "", "")
            .unwrap()
            .apply(&mut event);
        assert_eq!(event, before);
    }

    #[test]
    fn invalid_capacity_is_rejected() {
        let err = EventUpdate::from_input("", "", "", "", "", "many").unwrap_err();
        assert!(err.contains("capacity"));
    }

    #[test]
    fn new_event_requires_title() {
        let mut new_event = NewEvent {
            title: String::new(),
            description: String::new(),
            location: String::new(),
            starts_at: parse_timestamp("2024-07-01 10:00:00").unwrap(),
            ends_at: parse_timestamp("2024-07-01 12:00:00").unwrap(),
            capacity: 10,
            created_by: 1,
        };
        assert!(new_event.validate().is_err());
        new_event.title = "Food drive".to_string();
        assert!(new_event.validate().is_ok());
    }
}
