use kernel::model::{
    event::{Event, EventLocation},
    id::{EventId, UserId},
};
use sqlx::types::chrono::{DateTime, Utc};

// イベント一覧・詳細の取得に使う型。
// total_seats_booked は予約行の SUM から毎回計算された値で、
// events テーブルには保存されない
#[derive(sqlx::FromRow)]
pub struct EventRow {
    pub event_id: EventId,
    pub event_code: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub location: EventLocation,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
    pub total_seats_booked: i32,
    pub attendees: Option<Vec<UserId>>,
}

impl From<EventRow> for Event {
    fn from(value: EventRow) -> Self {
        let EventRow {
            event_id,
            event_code,
            title,
            description,
            category,
            location,
            event_date,
            capacity,
            total_seats_booked,
            attendees,
        } = value;
        Event {
            event_id,
            event_code,
            title,
            description,
            category,
            location,
            event_date,
            capacity,
            total_seats_booked,
            attendees: attendees.unwrap_or_default(),
        }
    }
}
