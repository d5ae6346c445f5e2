use crate::model::{
    booking::{
        event::{CancelBooking, CreateBooking},
        Booking,
    },
    id::{BookingId, EventId, UserId},
};
use async_trait::async_trait;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約操作を行う。容量と一人あたり上限の検査は
    // 予約行の挿入と同じトランザクションで実行される
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;
    // キャンセル操作を行う（ハードデリート）
    async fn cancel(&self, event: CancelBooking) -> AppResult<()>;
    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Booking>;
    // ユーザーに紐づく予約一覧をイベント情報つきで取得する
    async fn find_all_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>>;
    // イベントの座席使用量を予約行の合計から計算する
    async fn find_usage_by_event_id(&self, event_id: EventId) -> AppResult<i32>;
}
