use kernel::model::{id::UserId, role::Role, user::User};

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: String,
}

impl From<UserRow> for User {
    fn from(value: UserRow) -> Self {
        let UserRow {
            user_id,
            user_name,
            email,
            role,
        } = value;
        User {
            user_id,
            user_name,
            email,
            // 不明なロールは user 扱いにする
            role: Role::from_text(&role),
        }
    }
}
