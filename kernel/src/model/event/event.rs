use super::EventLocation;
use crate::model::id::{EventId, UserId};
use chrono::{DateTime, Utc};

pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub location: EventLocation,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
}

#[derive(Debug)]
pub struct UpdateEvent {
    pub event_id: EventId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub location: Option<EventLocation>,
    pub event_date: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub requested_user: UserId,
}

#[derive(Debug)]
pub struct DeleteEvent {
    pub event_id: EventId,
    pub requested_user: UserId,
}
