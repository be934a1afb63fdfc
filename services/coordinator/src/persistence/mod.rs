//! Persistence gateway: the only component issuing relational statements

use async_trait::async_trait;
use common::error::DatabaseResult;

use crate::models::{Event, NewEvent, NewUser, Registration, RegistrationStatus, User};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlGateway;

/// Storage operations for users, events and registrations.
///
/// Every call uses a single pooled connection which is released before the
/// call returns, whatever the outcome. Failures are logged with the operation
/// and the identifier involved, then returned to the caller.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// All users, each carrying the events it is registered for
    async fn select_all_users(&self) -> DatabaseResult<Vec<User>>;

    async fn select_all_events(&self) -> DatabaseResult<Vec<Event>>;

    /// One user with its registered events, `None` when the id is unknown
    async fn select_user_by_id(&self, user_id: i64) -> DatabaseResult<Option<User>>;

    async fn select_event_by_id(&self, event_id: i64) -> DatabaseResult<Option<Event>>;

    /// Events the user is registered for, whatever the registration status
    async fn select_events_for_user(&self, user_id: i64) -> DatabaseResult<Vec<Event>>;

    /// Insert a user and return it with its storage assigned id and timestamp
    async fn insert_user(&self, user: &NewUser) -> DatabaseResult<User>;

    /// Insert an event and return it with its storage assigned id and timestamp
    async fn insert_event(&self, event: &NewEvent) -> DatabaseResult<Event>;

    /// Overwrite every mutable column of the user row keyed by `user.id`
    async fn update_user(&self, user: &User) -> DatabaseResult<()>;

    /// Overwrite every mutable column of the event row keyed by `event.id`
    async fn update_event(&self, event: &Event) -> DatabaseResult<()>;

    /// Returns whether a row was removed
    async fn delete_user(&self, user_id: i64) -> DatabaseResult<bool>;

    /// Returns whether a row was removed
    async fn delete_event(&self, event_id: i64) -> DatabaseResult<bool>;

    async fn select_registration(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> DatabaseResult<Option<Registration>>;

    /// Insert the registration, or overwrite the status of an existing one
    async fn upsert_registration(&self, registration: &Registration) -> DatabaseResult<()>;

    async fn update_registration_status(
        &self,
        user_id: i64,
        event_id: i64,
        status: RegistrationStatus,
    ) -> DatabaseResult<()>;

    /// Returns whether a row was removed
    async fn delete_registration(&self, user_id: i64, event_id: i64) -> DatabaseResult<bool>;
}
