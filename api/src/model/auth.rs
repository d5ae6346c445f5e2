use super::user::UserResponse;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// サインアップ・ログインはトークンと一緒にユーザー情報も返す
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenResponse {
    pub user: UserResponse,
    pub access_token: String,
}
