use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle;
use crate::utils::error::EventError;

/// Wire and form format for event dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventStatus::Pending => "PENDING",
            EventStatus::Approved => "APPROVED",
            EventStatus::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

/// The editable fields of an event, named the way the form names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    Title,
    Description,
    Date,
    Location,
    ContactNumber,
    OrganizerName,
}

impl EventField {
    pub const ALL: [EventField; 6] = [
        EventField::Title,
        EventField::Description,
        EventField::Date,
        EventField::Location,
        EventField::ContactNumber,
        EventField::OrganizerName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventField::Title => "title",
            EventField::Description => "description",
            EventField::Date => "date",
            EventField::Location => "location",
            EventField::ContactNumber => "contactNumber",
            EventField::OrganizerName => "organizerName",
        }
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown event field '{}'", s))
    }
}

/// Validated, well-formed event attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub location: String,
    pub contact_number: String,
    pub organizer_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[serde(flatten)]
    pub details: EventDetails,
    pub status: EventStatus,
}

impl Event {
    /// A freshly created event always starts out `PENDING`.
    pub fn new(id: Uuid, details: EventDetails) -> Self {
        Self {
            id,
            details,
            status: EventStatus::Pending,
        }
    }

    /// Applies an edited draft to this event.
    ///
    /// The status is kept unless the draft names a different one, in which
    /// case the move has to be a legal lifecycle transition.
    pub fn revise(&self, draft: &EventDraft) -> Result<Event, EventError> {
        let details = draft.validate()?;
        let status = match draft.status {
            Some(requested) if requested != self.status => {
                lifecycle::transition(self.status, requested)?
            }
            _ => self.status,
        };

        Ok(Event {
            id: self.id,
            details,
            status,
        })
    }
}

/// Unvalidated field values as typed into the create or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub contact_number: String,
    pub organizer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}

impl EventDraft {
    pub fn get(&self, field: EventField) -> &str {
        match field {
            EventField::Title => &self.title,
            EventField::Description => &self.description,
            EventField::Date => &self.date,
            EventField::Location => &self.location,
            EventField::ContactNumber => &self.contact_number,
            EventField::OrganizerName => &self.organizer_name,
        }
    }

    pub fn set(&mut self, field: EventField, value: impl Into<String>) {
        let slot = match field {
            EventField::Title => &mut self.title,
            EventField::Description => &mut self.description,
            EventField::Date => &mut self.date,
            EventField::Location => &mut self.location,
            EventField::ContactNumber => &mut self.contact_number,
            EventField::OrganizerName => &mut self.organizer_name,
        };
        *slot = value.into();
    }

    /// Checks every required field and parses the date.
    ///
    /// Fields are checked in form order and the first failure is reported.
    /// Text is trimmed; the date is not coerced in any way.
    pub fn validate(&self) -> Result<EventDetails, EventError> {
        for field in EventField::ALL {
            if self.get(field).trim().is_empty() {
                return Err(EventError::validation(field, "must not be empty"));
            }
        }

        let date = NaiveDate::parse_from_str(&self.date, DATE_FORMAT).map_err(|_| {
            EventError::validation(EventField::Date, "must be a calendar date (YYYY-MM-DD)")
        })?;

        Ok(EventDetails {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date,
            location: self.location.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            organizer_name: self.organizer_name.trim().to_string(),
        })
    }
}

impl From<&Event> for EventDraft {
    fn from(event: &Event) -> Self {
        Self {
            title: event.details.title.clone(),
            description: event.details.description.clone(),
            date: event.details.date.format(DATE_FORMAT).to_string(),
            location: event.details.location.clone(),
            contact_number: event.details.contact_number.clone(),
            organizer_name: event.details.organizer_name.clone(),
            status: Some(event.status),
        }
    }
}
