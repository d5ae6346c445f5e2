use crate::database::{model::user::UserRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::UserId;
use kernel::model::user::{event::CreateUser, normalize_email, User};
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn create(&self, event: CreateUser) -> AppResult<User> {
        let user_id = UserId::new();
        let email = normalize_email(&event.email);
        let hashed_password = bcrypt::hash(&event.password, bcrypt::DEFAULT_COST)?;

        let res = sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user_id)
        .bind(&event.user_name)
        .bind(&email)
        .bind(hashed_password)
        .bind(event.role.as_ref())
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                AppError::ConflictError("user already exists".into())
            }
            _ => AppError::SpecificOperationError(e),
        })?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No user record has been created".into(),
            ));
        }

        Ok(User {
            user_id,
            user_name: event.user_name,
            email,
            role: event.role,
        })
    }

    async fn find_current_user(&self, current_user_id: UserId) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
                SELECT user_id, user_name, email, role
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(current_user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::role::Role;

    #[sqlx::test(migrations = "../migrations")]
    async fn email_is_normalized_and_unique(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let user = repo
            .create(CreateUser {
                user_name: "Alice".into(),
                email: "  Alice@Example.COM ".into(),
                password: "passwd".into(),
                role: Role::User,
            })
            .await?;
        assert_eq!(user.email, "alice@example.com");

        let found = repo.find_current_user(user.user_id).await?;
        assert_eq!(found, Some(user));

        // 大文字小文字違いの同じアドレスは重複として弾かれる
        let res = repo
            .create(CreateUser {
                user_name: "Alice2".into(),
                email: "alice@example.com".into(),
                password: "passwd".into(),
                role: Role::User,
            })
            .await;
        assert!(matches!(res, Err(AppError::ConflictError(_))));

        Ok(())
    }
}
