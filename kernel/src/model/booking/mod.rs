use crate::model::event::EventLocation;
use crate::model::id::{BookingId, EventId, UserId};
use chrono::{DateTime, Utc};

pub mod event;
pub mod ledger;

#[derive(Debug)]
pub struct Booking {
    pub booking_id: BookingId,
    pub booked_by: UserId,
    pub seats: i32,
    pub booked_at: DateTime<Utc>,
    pub event: BookingEvent,
}

// 予約一覧でイベントの概要も返すための埋め込み型
#[derive(Debug)]
pub struct BookingEvent {
    pub event_id: EventId,
    pub event_code: String,
    pub title: String,
    pub category: String,
    pub location: EventLocation,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
}
