use async_trait::async_trait;
use shared::error::AppResult;

// 予約確認・キャンセル通知の送信先。送信はコミット後に行われ、
// 失敗しても予約やキャンセルの結果には影響させない
#[async_trait]
pub trait BookingNotifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()>;
}
