//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::{Event, changed, write_json};

/// User entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    /// `volunteer` or `organizer`, not enforced
    pub role: String,
    pub created_at: DateTime<Utc>,
    /// Events the user is registered for; filled by the gateway, never persisted
    #[sqlx(skip)]
    #[serde(default)]
    pub events: Vec<Event>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}

/// New user creation payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
}

impl NewUser {
    /// Presence check on the required fields
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("Full name is required".to_string());
        }
        if self.email.trim().is_empty() {
            return Err("Email is required".to_string());
        }
        Ok(())
    }
}

/// User update payload; `None` leaves the stored value untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UserUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

impl UserUpdate {
    /// Build an update from raw operator input, where an empty string means
    /// "leave this field unchanged"
    pub fn from_input(full_name: &str, email: &str, phone: &str, role: &str) -> Self {
        Self {
            full_name: changed(full_name),
            email: changed(email),
            phone: changed(phone),
            role: changed(role),
        }
    }

    /// Overwrite the fields present in this update
    pub fn apply(&self, user: &mut User) {
        if let Some(full_name) = &self.full_name {
            user.full_name = full_name.clone();
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone = phone.clone();
        }
        if let Some(role) = &self.role {
            user.role = role.clone();
        }
    }
}
