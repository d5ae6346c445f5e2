use crate::database::{model::booking::BookingRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::booking::{
    event::{CancelBooking, CreateBooking},
    ledger::{self, SeatUsage},
    Booking,
};
use kernel::model::event::has_started;
use kernel::model::id::{BookingId, EventId, UserId};
use kernel::repository::booking::BookingRepository;
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    // 予約操作を行う
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let mut tx = self.db.begin().await?;

        // 検査と挿入を同じ直列化可能トランザクションで行い、
        // 最後の座席をめぐる同時予約で容量超過が起きないようにする
        self.set_transaction_serializable(&mut tx).await?;

        // 事前のチェックとして、以下を調べる。
        // - 指定のイベント ID をもつイベントが存在するか
        // - 存在した場合、容量と一人あたり上限に収まるか
        //
        // 上記がすべて Yes だった場合、このブロック以降の処理に進む
        {
            let event_row: Option<(EventId, i32)> =
                sqlx::query_as("SELECT event_id, capacity FROM events WHERE event_id = $1")
                    .bind(event.event_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?;

            let Some((_, capacity)) = event_row else {
                return Err(AppError::EntityNotFound(format!(
                    "event ({}) not found",
                    event.event_id
                )));
            };

            // 座席使用量はカウンタではなく予約行の合計から毎回計算する
            let total_booked: i32 = sqlx::query_scalar(
                "SELECT CAST(COALESCE(SUM(seats), 0) AS INT) FROM bookings WHERE event_id = $1",
            )
            .bind(event.event_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let user_booked: i32 = sqlx::query_scalar(
                "SELECT CAST(COALESCE(SUM(seats), 0) AS INT) FROM bookings \
                 WHERE event_id = $1 AND user_id = $2",
            )
            .bind(event.event_id)
            .bind(event.booked_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            ledger::validate_booking(
                SeatUsage::new(total_booked, user_booked),
                capacity,
                event.seats,
            )?;
        }

        // 予約処理を行う、すなわち bookings テーブルにレコードを追加する
        let booking_id = BookingId::new();
        let res = sqlx::query(
            r#"
                INSERT INTO bookings (booking_id, event_id, user_id, seats, booked_at)
                VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(booking_id)
        .bind(event.event_id)
        .bind(event.booked_by)
        .bind(event.seats)
        .bind(event.booked_at)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        // 参加者リストは参考情報。座席数の真実のソースには使わない
        sqlx::query(
            r#"
                INSERT INTO event_attendees (event_id, user_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
            "#,
        )
        .bind(event.event_id)
        .bind(event.booked_by)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking_id)
    }

    // キャンセル操作を行う。予約行のハードデリートであり、
    // cancelled のような状態は保存しない
    async fn cancel(&self, event: CancelBooking) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        self.set_transaction_serializable(&mut tx).await?;

        // キャンセル時は事前のチェックとして、以下を調べる。
        // - 指定の予約 ID をもつ予約が存在するか
        // - 存在した場合、
        // - 予約の持ち主がリクエストしたユーザーと同じか
        // - かつ、イベントがまだ開始していないか
        let event_id = {
            let row: Option<(UserId, EventId, DateTime<Utc>)> = sqlx::query_as(
                r#"
                    SELECT b.user_id, b.event_id, e.event_date
                    FROM bookings AS b
                    INNER JOIN events AS e ON b.event_id = e.event_id
                    WHERE b.booking_id = $1
                "#,
            )
            .bind(event.booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let Some((owner_id, event_id, event_date)) = row else {
                return Err(AppError::EntityNotFound(format!(
                    "booking ({}) not found",
                    event.booking_id
                )));
            };

            if owner_id != event.requested_user {
                return Err(AppError::ForbiddenOperation);
            }

            // イベント開始前のみキャンセルできる
            if has_started(event_date, event.cancelled_at) {
                return Err(AppError::EventAlreadyStarted);
            }

            event_id
        };

        let res = sqlx::query("DELETE FROM bookings WHERE booking_id = $1")
            .bind(event.booking_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been deleted".into(),
            ));
        }

        // 同じイベントに他の予約が残っていない場合のみ参加者リストから外す
        sqlx::query(
            r#"
                DELETE FROM event_attendees AS a
                WHERE a.event_id = $1
                  AND a.user_id = $2
                  AND NOT EXISTS (
                      SELECT 1 FROM bookings AS b
                      WHERE b.event_id = $1 AND b.user_id = $2
                  )
            "#,
        )
        .bind(event_id)
        .bind(event.requested_user)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(())
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Booking> {
        sqlx::query_as::<_, BookingRow>(
            r#"
                SELECT
                b.booking_id,
                b.user_id,
                b.seats,
                b.booked_at,
                e.event_id,
                e.event_code,
                e.title,
                e.category,
                e.location,
                e.event_date,
                e.capacity
                FROM bookings AS b
                INNER JOIN events AS e ON b.event_id = e.event_id
                WHERE b.booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Booking::from)
        .ok_or_else(|| AppError::EntityNotFound(format!("booking ({booking_id}) not found")))
    }

    // ユーザー ID に紐づく予約一覧をイベント情報つきで取得する
    async fn find_all_by_user_id(&self, user_id: UserId) -> AppResult<Vec<Booking>> {
        sqlx::query_as::<_, BookingRow>(
            r#"
                SELECT
                b.booking_id,
                b.user_id,
                b.seats,
                b.booked_at,
                e.event_id,
                e.event_code,
                e.title,
                e.category,
                e.location,
                e.event_date,
                e.capacity
                FROM bookings AS b
                INNER JOIN events AS e ON b.event_id = e.event_id
                WHERE b.user_id = $1
                ORDER BY b.booked_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Booking::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_usage_by_event_id(&self, event_id: EventId) -> AppResult<i32> {
        sqlx::query_scalar(
            "SELECT CAST(COALESCE(SUM(seats), 0) AS INT) FROM bookings WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)
    }
}

impl BookingRepositoryImpl {
    // create, cancel でのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn insert_user(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<UserId> {
        let user_id = UserId::new();
        sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role)
                VALUES ($1, $2, $3, 'dummy', 'user')
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(format!("{name}@example.com"))
        .execute(pool)
        .await?;
        Ok(user_id)
    }

    async fn insert_event(
        pool: &sqlx::PgPool,
        capacity: i32,
        event_date: DateTime<Utc>,
    ) -> anyhow::Result<EventId> {
        let event_id = EventId::new();
        sqlx::query(
            r#"
                INSERT INTO events
                (event_id, event_code, title, category, location, event_date, capacity)
                VALUES ($1, $2, 'Test Event', 'Tech', 'Online', $3, $4)
            "#,
        )
        .bind(event_id)
        .bind(format!("EVT-TEST-{}", &event_id.raw().simple().to_string()[..6]))
        .bind(event_date)
        .bind(capacity)
        .execute(pool)
        .await?;
        Ok(event_id)
    }

    async fn attendee_count(pool: &sqlx::PgPool, event_id: EventId) -> anyhow::Result<i64> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM event_attendees WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(pool)
                .await?,
        )
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn capacity_is_recovered_by_cancellation(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let user_a = insert_user(&pool, "usera").await?;
        let user_b = insert_user(&pool, "userb").await?;
        let event_id = insert_event(&pool, 2, Utc::now() + Duration::days(7)).await?;

        // A が2席予約して満席になる
        let booking_a = repo
            .create(CreateBooking::new(event_id, user_a, 2, Utc::now()))
            .await?;
        assert_eq!(repo.find_usage_by_event_id(event_id).await?, 2);

        // B の1席は容量エラーで弾かれる
        let res = repo
            .create(CreateBooking::new(event_id, user_b, 1, Utc::now()))
            .await;
        assert!(matches!(res, Err(AppError::CapacityExceeded)));

        // A がキャンセルすると席が戻る
        repo.cancel(CancelBooking::new(booking_a, user_a, Utc::now()))
            .await?;
        assert_eq!(repo.find_usage_by_event_id(event_id).await?, 0);

        // B の1席が通るようになる
        repo.create(CreateBooking::new(event_id, user_b, 1, Utc::now()))
            .await?;
        assert_eq!(repo.find_usage_by_event_id(event_id).await?, 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn user_seat_limit_holds_across_bookings(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let user_id = insert_user(&pool, "usera").await?;
        let event_id = insert_event(&pool, 100, Utc::now() + Duration::days(7)).await?;

        repo.create(CreateBooking::new(event_id, user_id, 1, Utc::now()))
            .await?;

        // 合計3席になる要求は一人あたり上限で弾かれる
        let res = repo
            .create(CreateBooking::new(event_id, user_id, 2, Utc::now()))
            .await;
        assert!(matches!(
            res,
            Err(AppError::SeatLimitExceeded { limit: 2, booked: 1 })
        ));

        // 合計2席までは許可される
        repo.create(CreateBooking::new(event_id, user_id, 1, Utc::now()))
            .await?;
        assert_eq!(repo.find_usage_by_event_id(event_id).await?, 2);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn cancel_is_owner_only_and_before_event_start(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let owner = insert_user(&pool, "owner").await?;
        let other = insert_user(&pool, "other").await?;

        let future_event = insert_event(&pool, 10, Utc::now() + Duration::days(1)).await?;
        let booking_id = repo
            .create(CreateBooking::new(future_event, owner, 1, Utc::now()))
            .await?;

        // 持ち主以外のキャンセルは拒否される
        let res = repo
            .cancel(CancelBooking::new(booking_id, other, Utc::now()))
            .await;
        assert!(matches!(res, Err(AppError::ForbiddenOperation)));

        // 開始済みイベントのキャンセルは拒否され、予約は残る
        let started_event = insert_event(&pool, 10, Utc::now() - Duration::hours(1)).await?;
        let started_booking = BookingId::new();
        sqlx::query(
            r#"
                INSERT INTO bookings (booking_id, event_id, user_id, seats, booked_at)
                VALUES ($1, $2, $3, 1, $4)
            "#,
        )
        .bind(started_booking)
        .bind(started_event)
        .bind(owner)
        .bind(Utc::now() - Duration::days(1))
        .execute(&pool)
        .await?;
        let res = repo
            .cancel(CancelBooking::new(started_booking, owner, Utc::now()))
            .await;
        assert!(matches!(res, Err(AppError::EventAlreadyStarted)));
        assert_eq!(repo.find_usage_by_event_id(started_event).await?, 1);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn attendee_list_follows_active_bookings(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let user_id = insert_user(&pool, "usera").await?;
        let event_id = insert_event(&pool, 10, Utc::now() + Duration::days(7)).await?;

        // 2件予約しても参加者リストには1回しか現れない
        let first = repo
            .create(CreateBooking::new(event_id, user_id, 1, Utc::now()))
            .await?;
        let second = repo
            .create(CreateBooking::new(event_id, user_id, 1, Utc::now()))
            .await?;
        assert_eq!(attendee_count(&pool, event_id).await?, 1);

        // もう一方の予約が残っている間は参加者リストから外れない
        repo.cancel(CancelBooking::new(first, user_id, Utc::now()))
            .await?;
        assert_eq!(attendee_count(&pool, event_id).await?, 1);

        repo.cancel(CancelBooking::new(second, user_id, Utc::now()))
            .await?;
        assert_eq!(attendee_count(&pool, event_id).await?, 0);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn concurrent_bookings_never_exceed_capacity(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo_a = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let repo_b = BookingRepositoryImpl::new(ConnectionPool::new(pool.clone()));
        let user_a = insert_user(&pool, "usera").await?;
        let user_b = insert_user(&pool, "userb").await?;

        // 残り1席の状態で、2席の要求が同時に2つ届く
        let event_id = insert_event(&pool, 3, Utc::now() + Duration::days(7)).await?;
        let seeder = insert_user(&pool, "seeder").await?;
        repo_a
            .create(CreateBooking::new(event_id, seeder, 2, Utc::now()))
            .await?;

        let (res_a, res_b) = tokio::join!(
            repo_a.create(CreateBooking::new(event_id, user_a, 2, Utc::now())),
            repo_b.create(CreateBooking::new(event_id, user_b, 2, Utc::now())),
        );

        // どちらも成功してはならない（直列化可能性により少なくとも一方は失敗する）
        assert!(res_a.is_err() || res_b.is_err());

        let usage = repo_a.find_usage_by_event_id(event_id).await?;
        assert!(usage <= 3, "ledger reflects over-capacity: {usage}");

        Ok(())
    }
}
