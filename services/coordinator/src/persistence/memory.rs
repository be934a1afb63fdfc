//! In-memory gateway used by the service and console tests

use std::error::Error as StdError;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::error::ErrorKind;
use thiserror::Error;

use super::PersistenceGateway;
use crate::models::{Event, NewEvent, NewUser, Registration, RegistrationStatus, User};

#[derive(Default)]
struct State {
    users: Vec<User>,
    events: Vec<Event>,
    registrations: Vec<Registration>,
    next_user_id: i64,
    next_event_id: i64,
    unavailable: bool,
    inserts: usize,
}

impl State {
    fn events_for(&self, user_id: i64) -> Vec<Event> {
        self.registrations
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| self.events.iter().find(|e| e.id == r.event_id).cloned())
            .collect()
    }
}

/// Server-side rejection of a delete that would orphan referencing rows
#[derive(Debug, Error)]
#[error("{message}")]
struct ForeignKeyViolation {
    message: String,
}

impl ForeignKeyViolation {
    fn parent_row(table: &str, constraint: &str) -> DatabaseError {
        let violation = ForeignKeyViolation {
            message: format!(
                "Cannot delete or update a parent row: a foreign key constraint fails ({}, CONSTRAINT {})",
                table, constraint
            ),
        };
        DatabaseError::Query(sqlx::Error::Database(Box::new(violation)))
    }
}

impl sqlx::error::DatabaseError for ForeignKeyViolation {
    fn message(&self) -> &str {
        &self.message
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::ForeignKeyViolation
    }
}

/// Gateway keeping rows in memory, with storage assigned ids and timestamps
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail as if the pool could not hand out a connection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().unwrap().unavailable = unavailable;
    }

    /// Number of successful insert statements so far
    pub fn insert_count(&self) -> usize {
        self.state.lock().unwrap().inserts
    }

    pub fn event_count(&self) -> usize {
        self.state.lock().unwrap().events.len()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> DatabaseResult<T> {
        let mut state = self.state.lock().unwrap();
        if state.unavailable {
            return Err(DatabaseError::Connection(sqlx::Error::PoolTimedOut));
        }
        Ok(f(&mut state))
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn select_all_users(&self) -> DatabaseResult<Vec<User>> {
        self.with_state(|state| {
            state
                .users
                .iter()
                .map(|user| User {
                    events: state.events_for(user.id),
                    ..user.clone()
                })
                .collect()
        })
    }

    async fn select_all_events(&self) -> DatabaseResult<Vec<Event>> {
        self.with_state(|state| state.events.clone())
    }

    async fn select_user_by_id(&self, user_id: i64) -> DatabaseResult<Option<User>> {
        self.with_state(|state| {
            state.users.iter().find(|u| u.id == user_id).map(|user| User {
                events: state.events_for(user_id),
                ..user.clone()
            })
        })
    }

    async fn select_event_by_id(&self, event_id: i64) -> DatabaseResult<Option<Event>> {
        self.with_state(|state| state.events.iter().find(|e| e.id == event_id).cloned())
    }

    async fn select_events_for_user(&self, user_id: i64) -> DatabaseResult<Vec<Event>> {
        self.with_state(|state| state.events_for(user_id))
    }

    async fn insert_user(&self, user: &NewUser) -> DatabaseResult<User> {
        self.with_state(|state| {
            state.next_user_id += 1;
            state.inserts += 1;
            let inserted = User {
                id: state.next_user_id,
                full_name: user.full_name.clone(),
                email: user.email.clone(),
                phone: user.phone.clone(),
                role: user.role.clone(),
                created_at: Utc::now(),
                events: Vec::new(),
            };
            state.users.push(inserted.clone());
            inserted
        })
    }

    async fn insert_event(&self, event: &NewEvent) -> DatabaseResult<Event> {
        self.with_state(|state| {
            state.next_event_id += 1;
            state.inserts += 1;
            let inserted = Event {
                id: state.next_event_id,
                title: event.title.clone(),
                description: event.description.clone(),
                location: event.location.clone(),
                starts_at: event.starts_at,
                ends_at: event.ends_at,
                capacity: event.capacity,
                created_by: event.created_by,
                created_at: Utc::now(),
            };
            state.events.push(inserted.clone());
            inserted
        })
    }

    async fn update_user(&self, user: &User) -> DatabaseResult<()> {
        self.with_state(|state| {
            if let Some(stored) = state.users.iter_mut().find(|u| u.id == user.id) {
                stored.full_name = user.full_name.clone();
                stored.email = user.email.clone();
                stored.phone = user.phone.clone();
                stored.role = user.role.clone();
            }
        })
    }

    async fn update_event(&self, event: &Event) -> DatabaseResult<()> {
        self.with_state(|state| {
            if let Some(stored) = state.events.iter_mut().find(|e| e.id == event.id) {
                stored.title = event.title.clone();
                stored.description = event.description.clone();
                stored.location = event.location.clone();
                stored.starts_at = event.starts_at;
                stored.ends_at = event.ends_at;
                stored.capacity = event.capacity;
            }
        })
    }

    async fn delete_user(&self, user_id: i64) -> DatabaseResult<bool> {
        self.with_state(|state| {
            // events.created_by has no ON DELETE rule
            if state.events.iter().any(|e| e.created_by == user_id) {
                return Err(ForeignKeyViolation::parent_row("events", "fk_events_created_by"));
            }
            let before = state.users.len();
            state.users.retain(|u| u.id != user_id);
            state.registrations.retain(|r| r.user_id != user_id);
            Ok(state.users.len() < before)
        })?
    }

    async fn delete_event(&self, event_id: i64) -> DatabaseResult<bool> {
        self.with_state(|state| {
            let before = state.events.len();
            state.events.retain(|e| e.id != event_id);
            state.registrations.retain(|r| r.event_id != event_id);
            state.events.len() < before
        })
    }

    async fn select_registration(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> DatabaseResult<Option<Registration>> {
        self.with_state(|state| {
            state
                .registrations
                .iter()
                .find(|r| r.user_id == user_id && r.event_id == event_id)
                .cloned()
        })
    }

    async fn upsert_registration(&self, registration: &Registration) -> DatabaseResult<()> {
        self.with_state(|state| {
            match state.registrations.iter_mut().find(|r| {
                r.user_id == registration.user_id && r.event_id == registration.event_id
            }) {
                Some(existing) => existing.status = registration.status,
                None => state.registrations.push(registration.clone()),
            }
        })
    }

    async fn update_registration_status(
        &self,
        user_id: i64,
        event_id: i64,
        status: RegistrationStatus,
    ) -> DatabaseResult<()> {
        self.with_state(|state| {
            if let Some(existing) = state
                .registrations
                .iter_mut()
                .find(|r| r.user_id == user_id && r.event_id == event_id)
            {
                existing.status = status;
            }
        })
    }

    async fn delete_registration(&self, user_id: i64, event_id: i64) -> DatabaseResult<bool> {
        self.with_state(|state| {
            let before = state.registrations.len();
            state
                .registrations
                .retain(|r| !(r.user_id == user_id && r.event_id == event_id));
            state.registrations.len() < before
        })
    }
}
