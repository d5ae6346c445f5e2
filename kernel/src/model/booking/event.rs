use crate::model::id::{BookingId, EventId, UserId};
use chrono::{DateTime, Utc};
use derive_new::new;

#[derive(new)]
pub struct CreateBooking {
    pub event_id: EventId,
    pub booked_by: UserId,
    pub seats: i32,
    pub booked_at: DateTime<Utc>,
}

#[derive(new)]
pub struct CancelBooking {
    pub booking_id: BookingId,
    pub requested_user: UserId,
    pub cancelled_at: DateTime<Utc>,
}
