use chrono::{DateTime, Utc};
use derive_new::new;
use garde::Validate;
use kernel::model::{
    event::{
        event::{CreateEvent, UpdateEvent},
        Event, EventLocation,
    },
    id::{EventId, UserId},
};
use kernel::repository::event::ListEventsOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum LocationName {
    Online,
    #[serde(rename = "In-Person")]
    InPerson,
}

impl From<EventLocation> for LocationName {
    fn from(value: EventLocation) -> Self {
        match value {
            EventLocation::Online => Self::Online,
            EventLocation::InPerson => Self::InPerson,
        }
    }
}

impl From<LocationName> for EventLocation {
    fn from(value: LocationName) -> Self {
        match value {
            LocationName::Online => Self::Online,
            LocationName::InPerson => Self::InPerson,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(length(min = 1))]
    pub category: String,
    #[garde(skip)]
    pub location: LocationName,
    #[garde(skip)]
    pub date: DateTime<Utc>,
    #[garde(range(min = 1))]
    pub capacity: i32,
}

impl From<CreateEventRequest> for CreateEvent {
    fn from(value: CreateEventRequest) -> Self {
        let CreateEventRequest {
            title,
            description,
            category,
            location,
            date,
            capacity,
        } = value;
        CreateEvent {
            title,
            description,
            category,
            location: location.into(),
            event_date: date,
            capacity,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    #[garde(inner(length(min = 1)))]
    pub title: Option<String>,
    #[garde(skip)]
    pub description: Option<String>,
    #[garde(inner(length(min = 1)))]
    pub category: Option<String>,
    #[garde(skip)]
    pub location: Option<LocationName>,
    #[garde(skip)]
    pub date: Option<DateTime<Utc>>,
    #[garde(inner(range(min = 1)))]
    pub capacity: Option<i32>,
}

#[derive(new)]
pub struct UpdateEventRequestWithIds(EventId, UserId, UpdateEventRequest);

impl From<UpdateEventRequestWithIds> for UpdateEvent {
    fn from(value: UpdateEventRequestWithIds) -> Self {
        let UpdateEventRequestWithIds(
            event_id,
            requested_user,
            UpdateEventRequest {
                title,
                description,
                category,
                location,
                date,
                capacity,
            },
        ) = value;
        UpdateEvent {
            event_id,
            title,
            description,
            category,
            location: location.map(EventLocation::from),
            event_date: date,
            capacity,
            requested_user,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub category: Option<String>,
    pub location: Option<LocationName>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl From<ListEventsQuery> for ListEventsOptions {
    fn from(value: ListEventsQuery) -> Self {
        let ListEventsQuery {
            category,
            location,
            start_date,
            end_date,
        } = value;
        ListEventsOptions {
            category,
            location: location.map(EventLocation::from),
            start_date,
            end_date,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsResponse {
    pub items: Vec<EventResponse>,
}

impl From<Vec<Event>> for EventsResponse {
    fn from(value: Vec<Event>) -> Self {
        Self {
            items: value.into_iter().map(EventResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_id: EventId,
    pub event_code: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub location: LocationName,
    pub date: DateTime<Utc>,
    pub capacity: i32,
    pub attendees: Vec<UserId>,
    // どちらも読み出し時に予約行から計算された値
    pub total_seats_booked: i32,
    pub remaining_seats: i32,
}

impl From<Event> for EventResponse {
    fn from(value: Event) -> Self {
        let remaining_seats = value.remaining_seats();
        let Event {
            event_id,
            event_code,
            title,
            description,
            category,
            location,
            event_date,
            capacity,
            attendees,
            total_seats_booked,
        } = value;
        Self {
            event_id,
            event_code,
            title,
            description,
            category,
            location: location.into(),
            date: event_date,
            capacity,
            attendees,
            total_seats_booked,
            remaining_seats,
        }
    }
}
