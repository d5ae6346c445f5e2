use super::event::LocationName;
use chrono::{DateTime, Utc};
use kernel::model::{
    booking::{Booking, BookingEvent},
    id::{BookingId, EventId, UserId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    // 座席数の検査は kernel の ledger 側で行う（1〜2席のみ）
    pub seats: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub booked_by: UserId,
    pub seats: i32,
    pub booked_at: DateTime<Utc>,
    pub event: BookingEventResponse,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            booked_by,
            seats,
            booked_at,
            event,
        } = value;
        Self {
            booking_id,
            booked_by,
            seats,
            booked_at,
            event: event.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEventResponse {
    pub event_id: EventId,
    pub event_code: String,
    pub title: String,
    pub category: String,
    pub location: LocationName,
    pub date: DateTime<Utc>,
    pub capacity: i32,
}

impl From<BookingEvent> for BookingEventResponse {
    fn from(value: BookingEvent) -> Self {
        let BookingEvent {
            event_id,
            event_code,
            title,
            category,
            location,
            event_date,
            capacity,
        } = value;
        Self {
            event_id,
            event_code,
            title,
            category,
            location: location.into(),
            date: event_date,
            capacity,
        }
    }
}
