use kernel::model::{
    booking::{Booking, BookingEvent},
    event::EventLocation,
    id::{BookingId, EventId, UserId},
};
use sqlx::types::chrono::{DateTime, Utc};

// 予約一覧の取得に使う型。events テーブルと INNER JOIN した結果がはまる
#[derive(sqlx::FromRow)]
pub struct BookingRow {
    pub booking_id: BookingId,
    pub user_id: UserId,
    pub seats: i32,
    pub booked_at: DateTime<Utc>,
    pub event_id: EventId,
    pub event_code: String,
    pub title: String,
    pub category: String,
    pub location: EventLocation,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
}

impl From<BookingRow> for Booking {
    fn from(value: BookingRow) -> Self {
        let BookingRow {
            booking_id,
            user_id,
            seats,
            booked_at,
            event_id,
            event_code,
            title,
            category,
            location,
            event_date,
            capacity,
        } = value;
        Booking {
            booking_id,
            booked_by: user_id,
            seats,
            booked_at,
            event: BookingEvent {
                event_id,
                event_code,
                title,
                category,
                location,
                event_date,
                capacity,
            },
        }
    }
}
