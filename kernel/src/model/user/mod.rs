use crate::model::{id::UserId, role::Role};
pub mod event;

#[derive(Debug, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

// メールアドレスは小文字化と前後の空白除去をしてから保存・検索する
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
