//! MySQL implementation of the persistence gateway

use std::collections::HashMap;

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{FromRow, MySql, MySqlPool, pool::PoolConnection};
use tracing::{debug, instrument};

use super::PersistenceGateway;
use crate::models::{Event, NewEvent, NewUser, Registration, RegistrationStatus, User};

const SELECT_ALL_USERS: &str = r#"
    SELECT id, full_name, email, phone, role, created_at
    FROM users
    ORDER BY id
"#;

const SELECT_USER_BY_ID: &str = r#"
    SELECT id, full_name, email, phone, role, created_at
    FROM users
    WHERE id = ?
"#;

const SELECT_ALL_EVENTS: &str = r#"
    SELECT id, title, description, location, starts_at, ends_at, capacity, created_by, created_at
    FROM events
    ORDER BY id
"#;

const SELECT_EVENT_BY_ID: &str = r#"
    SELECT id, title, description, location, starts_at, ends_at, capacity, created_by, created_at
    FROM events
    WHERE id = ?
"#;

const SELECT_REGISTERED_EVENTS_FOR_USER_ID: &str = r#"
    SELECT e.id, e.title, e.description, e.location, e.starts_at, e.ends_at,
           e.capacity, e.created_by, e.created_at
    FROM events e
    JOIN volunteer_shift_xref x ON e.id = x.event_id
    WHERE x.user_id = ?
    ORDER BY e.starts_at, e.id
"#;

const SELECT_ALL_REGISTERED_EVENTS: &str = r#"
    SELECT x.user_id, e.id, e.title, e.description, e.location, e.starts_at, e.ends_at,
           e.capacity, e.created_by, e.created_at
    FROM events e
    JOIN volunteer_shift_xref x ON e.id = x.event_id
    ORDER BY x.user_id, e.starts_at, e.id
"#;

const INSERT_USER: &str = r#"
    INSERT INTO users (full_name, email, phone, role)
    VALUES (?, ?, ?, ?)
"#;

const INSERT_EVENT: &str = r#"
    INSERT INTO events (title, description, location, starts_at, ends_at, capacity, created_by)
    VALUES (?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_USER: &str = r#"
    UPDATE users
    SET full_name = ?, email = ?, phone = ?, role = ?
    WHERE id = ?
"#;

const UPDATE_EVENT: &str = r#"
    UPDATE events
    SET title = ?, description = ?, location = ?, starts_at = ?, ends_at = ?, capacity = ?
    WHERE id = ?
"#;

const DELETE_USER: &str = "DELETE FROM users WHERE id = ?";

const DELETE_EVENT: &str = "DELETE FROM events WHERE id = ?";

const SELECT_REGISTRATION: &str = r#"
    SELECT user_id, event_id, status
    FROM volunteer_shift_xref
    WHERE user_id = ? AND event_id = ?
"#;

const UPSERT_REGISTRATION: &str = r#"
    INSERT INTO volunteer_shift_xref (user_id, event_id, status)
    VALUES (?, ?, ?)
    ON DUPLICATE KEY UPDATE status = VALUES(status)
"#;

const UPDATE_REGISTRATION_STATUS: &str = r#"
    UPDATE volunteer_shift_xref
    SET status = ?
    WHERE user_id = ? AND event_id = ?
"#;

const DELETE_REGISTRATION: &str =
    "DELETE FROM volunteer_shift_xref WHERE user_id = ? AND event_id = ?";

/// Event row tagged with the user registered for it
#[derive(FromRow)]
struct RegisteredEventRow {
    user_id: i64,
    #[sqlx(flatten)]
    event: Event,
}

/// Persistence gateway backed by a MySQL connection pool
#[derive(Clone)]
pub struct MySqlGateway {
    pool: MySqlPool,
}

impl MySqlGateway {
    /// Create a new gateway over an initialized pool
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn acquire(&self) -> DatabaseResult<PoolConnection<MySql>> {
        self.pool.acquire().await.map_err(DatabaseError::Connection)
    }
}

#[async_trait]
impl PersistenceGateway for MySqlGateway {
    #[instrument(skip(self), err)]
    async fn select_all_users(&self) -> DatabaseResult<Vec<User>> {
        let mut conn = self.acquire().await?;

        let mut users = sqlx::query_as::<_, User>(SELECT_ALL_USERS)
            .fetch_all(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        // One join for every user instead of one per user
        let rows = sqlx::query_as::<_, RegisteredEventRow>(SELECT_ALL_REGISTERED_EVENTS)
            .fetch_all(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        let mut events_by_user: HashMap<i64, Vec<Event>> = HashMap::new();
        for row in rows {
            events_by_user.entry(row.user_id).or_default().push(row.event);
        }
        for user in &mut users {
            user.events = events_by_user.remove(&user.id).unwrap_or_default();
        }

        debug!(count = users.len(), "Retrieved users");
        Ok(users)
    }

    #[instrument(skip(self), err)]
    async fn select_all_events(&self) -> DatabaseResult<Vec<Event>> {
        let mut conn = self.acquire().await?;

        let events = sqlx::query_as::<_, Event>(SELECT_ALL_EVENTS)
            .fetch_all(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        debug!(count = events.len(), "Retrieved events");
        Ok(events)
    }

    #[instrument(skip(self), err)]
    async fn select_user_by_id(&self, user_id: i64) -> DatabaseResult<Option<User>> {
        let mut conn = self.acquire().await?;

        let user = sqlx::query_as::<_, User>(SELECT_USER_BY_ID)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        let Some(mut user) = user else {
            return Ok(None);
        };

        user.events = sqlx::query_as::<_, Event>(SELECT_REGISTERED_EVENTS_FOR_USER_ID)
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(Some(user))
    }

    #[instrument(skip(self), err)]
    async fn select_event_by_id(&self, event_id: i64) -> DatabaseResult<Option<Event>> {
        let mut conn = self.acquire().await?;

        sqlx::query_as::<_, Event>(SELECT_EVENT_BY_ID)
            .bind(event_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)
    }

    #[instrument(skip(self), err)]
    async fn select_events_for_user(&self, user_id: i64) -> DatabaseResult<Vec<Event>> {
        let mut conn = self.acquire().await?;

        sqlx::query_as::<_, Event>(SELECT_REGISTERED_EVENTS_FOR_USER_ID)
            .bind(user_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)
    }

    #[instrument(skip(self, user), err)]
    async fn insert_user(&self, user: &NewUser) -> DatabaseResult<User> {
        let mut conn = self.acquire().await?;

        let result = sqlx::query(INSERT_USER)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.role)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        let id = result.last_insert_id() as i64;

        let inserted = sqlx::query_as::<_, User>(SELECT_USER_BY_ID)
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        debug!(user_id = id, "Inserted user");
        Ok(inserted)
    }

    #[instrument(skip(self, event), fields(title = %event.title, created_by = event.created_by), err)]
    async fn insert_event(&self, event: &NewEvent) -> DatabaseResult<Event> {
        let mut conn = self.acquire().await?;

        let result = sqlx::query(INSERT_EVENT)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.starts_at)
            .bind(event.ends_at)
            .bind(event.capacity)
            .bind(event.created_by)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        let id = result.last_insert_id() as i64;

        let inserted = sqlx::query_as::<_, Event>(SELECT_EVENT_BY_ID)
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        debug!(event_id = id, "Inserted event");
        Ok(inserted)
    }

    #[instrument(skip(self, user), fields(user_id = user.id), err)]
    async fn update_user(&self, user: &User) -> DatabaseResult<()> {
        let mut conn = self.acquire().await?;

        sqlx::query(UPDATE_USER)
            .bind(&user.full_name)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.role)
            .bind(user.id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    #[instrument(skip(self, event), fields(event_id = event.id), err)]
    async fn update_event(&self, event: &Event) -> DatabaseResult<()> {
        let mut conn = self.acquire().await?;

        sqlx::query(UPDATE_EVENT)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.starts_at)
            .bind(event.ends_at)
            .bind(event.capacity)
            .bind(event.id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, user_id: i64) -> DatabaseResult<bool> {
        let mut conn = self.acquire().await?;

        let result = sqlx::query(DELETE_USER)
            .bind(user_id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn delete_event(&self, event_id: i64) -> DatabaseResult<bool> {
        let mut conn = self.acquire().await?;

        let result = sqlx::query(DELETE_EVENT)
            .bind(event_id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn select_registration(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> DatabaseResult<Option<Registration>> {
        let mut conn = self.acquire().await?;

        sqlx::query_as::<_, Registration>(SELECT_REGISTRATION)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)
    }

    #[instrument(
        skip(self, registration),
        fields(
            user_id = registration.user_id,
            event_id = registration.event_id,
            status = %registration.status
        ),
        err
    )]
    async fn upsert_registration(&self, registration: &Registration) -> DatabaseResult<()> {
        let mut conn = self.acquire().await?;

        sqlx::query(UPSERT_REGISTRATION)
            .bind(registration.user_id)
            .bind(registration.event_id)
            .bind(registration.status.as_str())
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn update_registration_status(
        &self,
        user_id: i64,
        event_id: i64,
        status: RegistrationStatus,
    ) -> DatabaseResult<()> {
        let mut conn = self.acquire().await?;

        sqlx::query(UPDATE_REGISTRATION_STATUS)
            .bind(status.as_str())
            .bind(user_id)
            .bind(event_id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_registration(&self, user_id: i64, event_id: i64) -> DatabaseResult<bool> {
        let mut conn = self.acquire().await?;

        let result = sqlx::query(DELETE_REGISTRATION)
            .bind(user_id)
            .bind(event_id)
            .execute(&mut *conn)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(result.rows_affected() > 0)
    }
}
