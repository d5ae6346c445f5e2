use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use kernel::notifier::BookingNotifier;
use shared::{config::MailConfig, error::AppError, error::AppResult};

const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

// Gmail API 経由でメールを送る実装。
// 送信はコミット後の後追い処理であり、呼び出し側が失敗をログに
// 落として握りつぶす前提になっている
pub struct GmailNotifier {
    client: reqwest::Client,
    access_token: String,
}

impl GmailNotifier {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: config.access_token.clone(),
        }
    }
}

#[async_trait]
impl BookingNotifier for GmailNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        // トークン未設定の環境（開発・テスト）では送信をスキップする
        if self.access_token.is_empty() {
            tracing::debug!(%to, %subject, "mail access token is not configured, skipping send");
            return Ok(());
        }

        let message_str = format!(
            "To: {to}\r\nSubject: {subject}\r\nContent-Type: text/plain; charset=UTF-8\r\n\r\n{body}"
        );
        let encoded_message = general_purpose::URL_SAFE_NO_PAD.encode(message_str.as_bytes());

        let res = self
            .client
            .post(GMAIL_SEND_URL)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({ "raw": encoded_message }))
            .send()
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Gmail error: {e}")))?;

        if !res.status().is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Gmail send failed with status {}",
                res.status()
            )));
        }

        Ok(())
    }
}
