use crate::{
    extractor::AuthorizedUser,
    model::auth::{AccessTokenResponse, LoginRequest},
    model::user::CreateUserRequest,
};
use axum::{extract::State, http::StatusCode, Json};
use garde::Validate;
use kernel::model::auth::event::CreateToken;
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn signup(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<AccessTokenResponse>)> {
    req.validate()?;

    let user = registry.user_repository().create(req.into()).await?;

    // 登録後はそのままログイン済みにする
    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user.user_id))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccessTokenResponse {
            user: user.into(),
            access_token: access_token.0,
        }),
    ))
}

pub async fn login(
    State(registry): State<AppRegistry>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AccessTokenResponse>> {
    let user_id = registry
        .auth_repository()
        .verify_user(&req.email, &req.password)
        .await?;

    let user = registry
        .user_repository()
        .find_current_user(user_id)
        .await?
        .ok_or(AppError::UnauthenticatedError)?;

    let access_token = registry
        .auth_repository()
        .create_token(CreateToken::new(user_id))
        .await?;

    Ok(Json(AccessTokenResponse {
        user: user.into(),
        access_token: access_token.0,
    }))
}

pub async fn logout(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    registry
        .auth_repository()
        .delete_token(user.access_token)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
