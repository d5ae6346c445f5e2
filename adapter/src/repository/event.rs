use crate::database::{model::event::EventRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    event::{
        code,
        event::{CreateEvent, DeleteEvent, UpdateEvent},
        Event,
    },
    id::EventId,
};
use kernel::repository::event::{EventRepository, ListEventsOptions};
use shared::error::{AppError, AppResult};
use sqlx::QueryBuilder;
use uuid::Uuid;

// totalSeatsBooked と attendees は読み出しごとにサブクエリで計算する。
// events テーブル側にカウンタは持たない
const SELECT_EVENT: &str = r#"
    SELECT
    e.event_id,
    e.event_code,
    e.title,
    e.description,
    e.category,
    e.location,
    e.event_date,
    e.capacity,
    (SELECT CAST(COALESCE(SUM(b.seats), 0) AS INT)
       FROM bookings AS b WHERE b.event_id = e.event_id) AS total_seats_booked,
    (SELECT ARRAY_AGG(a.user_id)
       FROM event_attendees AS a WHERE a.event_id = e.event_id) AS attendees
    FROM events AS e
"#;

#[derive(new)]
pub struct EventRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl EventRepository for EventRepositoryImpl {
    async fn create(&self, event: CreateEvent) -> AppResult<EventId> {
        // イベントコードの一意性は一意制約に任せる。
        // 衝突した場合はリトライせず競合エラーを返す
        let event_code = code::generate(chrono::Utc::now());
        self.create_with_code(event, event_code).await
    }

    async fn find_all(&self, options: ListEventsOptions) -> AppResult<Vec<Event>> {
        let mut query = QueryBuilder::new(SELECT_EVENT);
        query.push(" WHERE 1 = 1");
        if let Some(category) = options.category {
            query.push(" AND e.category = ").push_bind(category);
        }
        if let Some(location) = options.location {
            query.push(" AND e.location = ").push_bind(location);
        }
        if let Some(start_date) = options.start_date {
            query.push(" AND e.event_date >= ").push_bind(start_date);
        }
        if let Some(end_date) = options.end_date {
            query.push(" AND e.event_date <= ").push_bind(end_date);
        }
        query.push(" ORDER BY e.event_date ASC");

        query
            .build_query_as::<EventRow>()
            .fetch_all(self.db.inner_ref())
            .await
            .map(|rows| rows.into_iter().map(Event::from).collect())
            .map_err(AppError::SpecificOperationError)
    }

    async fn find_by_id(&self, event_id: EventId) -> AppResult<Option<Event>> {
        let row: Option<EventRow> =
            sqlx::query_as(&format!("{SELECT_EVENT} WHERE e.event_id = $1"))
                .bind(event_id)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Event::from))
    }

    // 主キーまたはイベントコードのどちらでも解決する
    async fn find_by_id_or_code(&self, event_ref: &str) -> AppResult<Option<Event>> {
        let id = Uuid::parse_str(event_ref).ok();

        let row: Option<EventRow> = sqlx::query_as(&format!(
            "{SELECT_EVENT} WHERE e.event_id = $1 OR e.event_code = $2"
        ))
        .bind(id)
        .bind(event_ref)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Event::from))
    }

    async fn update(&self, event: UpdateEvent) -> AppResult<()> {
        let res = sqlx::query(
            r#"
                UPDATE events
                SET
                    title = COALESCE($1, title),
                    description = COALESCE($2, description),
                    category = COALESCE($3, category),
                    location = COALESCE($4, location),
                    event_date = COALESCE($5, event_date),
                    capacity = COALESCE($6, capacity)
                WHERE event_id = $7
            "#,
        )
        .bind(event.title)
        .bind(event.description)
        .bind(event.category)
        .bind(event.location)
        .bind(event.event_date)
        .bind(event.capacity)
        .bind(event.event_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified event not found".into()));
        }

        Ok(())
    }

    async fn delete(&self, event: DeleteEvent) -> AppResult<()> {
        // 予約と参加者リストは外部キーの ON DELETE CASCADE で消える
        let res = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event.event_id)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound("specified event not found".into()));
        }

        Ok(())
    }
}

impl EventRepositoryImpl {
    async fn create_with_code(&self, event: CreateEvent, event_code: String) -> AppResult<EventId> {
        let event_id = EventId::new();
        sqlx::query(
            r#"
                INSERT INTO events
                (event_id, event_code, title, description, category, location, event_date, capacity)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event_id)
        .bind(&event_code)
        .bind(event.title)
        .bind(event.description)
        .bind(event.category)
        .bind(event.location)
        .bind(event.event_date)
        .bind(event.capacity)
        .execute(self.db.inner_ref())
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                AppError::ConflictError(format!("event code ({event_code}) already exists"))
            }
            _ => AppError::SpecificOperationError(e),
        })?;

        Ok(event_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use kernel::model::event::EventLocation;
    use kernel::model::id::UserId;

    fn create_event(
        title: &str,
        category: &str,
        location: EventLocation,
        days_ahead: i64,
    ) -> CreateEvent {
        CreateEvent {
            title: title.into(),
            description: Some("Test Description".into()),
            category: category.into(),
            location,
            event_date: Utc::now() + Duration::days(days_ahead),
            capacity: 50,
        }
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn created_event_is_enriched_on_read(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let event_id = repo
            .create(create_event("RustConf", "Tech", EventLocation::Online, 7))
            .await?;

        let event = repo.find_by_id(event_id).await?.expect("event not found");
        assert_eq!(event.title, "RustConf");
        assert_eq!(event.total_seats_booked, 0);
        assert_eq!(event.remaining_seats(), 50);
        assert!(event.attendees.is_empty());
        assert!(event.event_code.starts_with("EVT-"));

        // 予約が入ると読み出しごとに再計算される
        let user_id = UserId::new();
        sqlx::query(
            r#"
                INSERT INTO users (user_id, user_name, email, password_hash, role)
                VALUES ($1, 'usera', 'usera@example.com', 'dummy', 'user')
            "#,
        )
        .bind(user_id)
        .execute(&pool)
        .await?;
        sqlx::query(
            r#"
                INSERT INTO bookings (booking_id, event_id, user_id, seats, booked_at)
                VALUES ($1, $2, $3, 2, $4)
            "#,
        )
        .bind(kernel::model::id::BookingId::new())
        .bind(event_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&pool)
        .await?;
        sqlx::query("INSERT INTO event_attendees (event_id, user_id) VALUES ($1, $2)")
            .bind(event_id)
            .bind(user_id)
            .execute(&pool)
            .await?;

        let event = repo.find_by_id(event_id).await?.expect("event not found");
        assert_eq!(event.total_seats_booked, 2);
        assert_eq!(event.remaining_seats(), 48);
        assert_eq!(event.attendees, vec![user_id]);

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn event_resolves_by_id_and_by_code(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool));

        let event_id = repo
            .create(create_event("RustConf", "Tech", EventLocation::Online, 7))
            .await?;
        let event = repo.find_by_id(event_id).await?.expect("event not found");

        let by_id = repo.find_by_id_or_code(&event_id.to_string()).await?;
        assert_eq!(by_id.map(|e| e.event_id), Some(event_id));

        let by_code = repo.find_by_id_or_code(&event.event_code).await?;
        assert_eq!(by_code.map(|e| e.event_id), Some(event_id));

        assert!(repo.find_by_id_or_code("EVT-XXX0000-???").await?.is_none());

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn events_are_filterable(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create(create_event("A", "Tech", EventLocation::Online, 1))
            .await?;
        repo.create(create_event("B", "Tech", EventLocation::InPerson, 10))
            .await?;
        repo.create(create_event("C", "Music", EventLocation::Online, 20))
            .await?;

        let all = repo.find_all(ListEventsOptions::default()).await?;
        assert_eq!(all.len(), 3);
        // 日付の昇順で返る
        assert_eq!(
            all.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );

        let tech = repo
            .find_all(ListEventsOptions {
                category: Some("Tech".into()),
                ..Default::default()
            })
            .await?;
        assert_eq!(tech.len(), 2);

        let online_tech = repo
            .find_all(ListEventsOptions {
                category: Some("Tech".into()),
                location: Some(EventLocation::Online),
                ..Default::default()
            })
            .await?;
        assert_eq!(online_tech.len(), 1);
        assert_eq!(online_tech[0].title, "A");

        // 日付範囲は独立して指定できる
        let from_day5 = repo
            .find_all(ListEventsOptions {
                start_date: Some(Utc::now() + Duration::days(5)),
                ..Default::default()
            })
            .await?;
        assert_eq!(from_day5.len(), 2);

        let until_day15 = repo
            .find_all(ListEventsOptions {
                start_date: Some(Utc::now() + Duration::days(5)),
                end_date: Some(Utc::now() + Duration::days(15)),
                ..Default::default()
            })
            .await?;
        assert_eq!(until_day15.len(), 1);
        assert_eq!(until_day15[0].title, "B");

        Ok(())
    }

    #[sqlx::test(migrations = "../migrations")]
    async fn duplicate_event_code_is_a_conflict(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = EventRepositoryImpl::new(ConnectionPool::new(pool));

        repo.create_with_code(
            create_event("A", "Tech", EventLocation::Online, 1),
            "EVT-AUG2026-AAA".into(),
        )
        .await?;

        let res = repo
            .create_with_code(
                create_event("B", "Tech", EventLocation::Online, 2),
                "EVT-AUG2026-AAA".into(),
            )
            .await;
        assert!(matches!(res, Err(AppError::ConflictError(_))));

        Ok(())
    }
}
