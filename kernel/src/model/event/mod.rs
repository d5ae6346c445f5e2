use crate::model::id::{EventId, UserId};
use chrono::{DateTime, Utc};
use strum::{AsRefStr, EnumString};

pub mod code;
pub mod event;

#[derive(Debug)]
pub struct Event {
    pub event_id: EventId,
    // 保存用の主キーとは別に生成される、人が読めるイベントコード
    pub event_code: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub location: EventLocation,
    pub event_date: DateTime<Utc>,
    pub capacity: i32,
    // 参考情報のみ。座席数の計算には絶対に使わない
    pub attendees: Vec<UserId>,
    // 予約行から読み出しごとに再計算される値
    pub total_seats_booked: i32,
}

impl Event {
    pub fn remaining_seats(&self) -> i32 {
        self.capacity - self.total_seats_booked
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        has_started(self.event_date, now)
    }
}

// 開始時刻ちょうども「開始済み」として扱う。
// 予約のキャンセル可否の判定にも使われる
pub fn has_started(event_date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    event_date <= now
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString, sqlx::Type)]
#[sqlx(type_name = "event_location")]
pub enum EventLocation {
    Online,
    #[strum(serialize = "In-Person")]
    #[sqlx(rename = "In-Person")]
    InPerson,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::id::EventId;

    fn event(capacity: i32, total_booked: i32, date: DateTime<Utc>) -> Event {
        Event {
            event_id: EventId::new(),
            event_code: "EVT-JAN2026-ABC".into(),
            title: "Test Event".into(),
            description: None,
            category: "Tech".into(),
            location: EventLocation::Online,
            event_date: date,
            capacity,
            attendees: vec![],
            total_seats_booked: total_booked,
        }
    }

    #[test]
    fn remaining_seats_is_capacity_minus_usage() {
        let e = event(10, 3, Utc::now());
        assert_eq!(e.remaining_seats(), 7);
    }

    #[test]
    fn event_is_started_at_and_after_its_date() {
        let now = Utc::now();
        assert!(event(1, 0, now).has_started(now));
        assert!(event(1, 0, now - chrono::Duration::minutes(1)).has_started(now));
        assert!(!event(1, 0, now + chrono::Duration::minutes(1)).has_started(now));

        // キャンセル可否の判定で使われる関数も同じ境界をもつ
        assert!(has_started(now, now));
        assert!(!has_started(now + chrono::Duration::seconds(1), now));
    }
}
