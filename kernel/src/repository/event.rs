use crate::model::{
    event::{
        event::{CreateEvent, DeleteEvent, UpdateEvent},
        Event, EventLocation,
    },
    id::EventId,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::error::AppResult;

#[derive(Debug, Default)]
pub struct ListEventsOptions {
    pub category: Option<String>,
    pub location: Option<EventLocation>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId>;
    // 読み出しごとに totalSeatsBooked を予約行から再計算して返す
    async fn find_all(&self, options: ListEventsOptions) -> AppResult<Vec<Event>>;
    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>>;
    // 主キーまたはイベントコードのどちらでも解決できるようにする
    async fn find_by_id_or_code(&self, event_ref: &str) -> AppResult<Option<Event>>;
    async fn update(&self, event: UpdateEvent) -> AppResult<()>;
    async fn delete(&self, event: DeleteEvent) -> AppResult<()>;
}
