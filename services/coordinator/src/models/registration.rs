//! Registration model linking a user to an event

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::write_json;

/// State of a user's registration for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    Waitlist,
    Cancelled,
}

impl RegistrationStatus {
    #[cfg(test)]
    pub const ALL: [RegistrationStatus; 3] = [
        RegistrationStatus::Registered,
        RegistrationStatus::Waitlist,
        RegistrationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Waitlist => "waitlist",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised for a status outside `registered | waitlist | cancelled`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid registration status '{0}', expected registered, waitlist or cancelled")]
pub struct ParseStatusError(pub String);

impl FromStr for RegistrationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "registered" => Ok(RegistrationStatus::Registered),
            "waitlist" => Ok(RegistrationStatus::Waitlist),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

impl TryFrom<String> for RegistrationStatus {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Row of the `volunteer_shift_xref` join table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub user_id: i64,
    pub event_id: i64,
    #[sqlx(try_from = "String")]
    pub status: RegistrationStatus,
}

impl fmt::Display for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(self, f)
    }
}
