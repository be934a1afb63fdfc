//! Entity models for the coordination service

pub mod event;
pub mod registration;
pub mod user;

// Re-export for convenience
pub use event::{Event, EventUpdate, NewEvent, TIMESTAMP_FORMAT, parse_timestamp};
pub use registration::{Registration, RegistrationStatus};
pub use user::{NewUser, User, UserUpdate};

/// Render a serializable model as its JSON string representation
pub(crate) fn write_json<T: serde::Serialize>(
    value: &T,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    let json = serde_json::to_string(value).map_err(|_| std::fmt::Error)?;
    f.write_str(&json)
}

/// Keep `None` for the "leave unchanged" marker, an owned value otherwise
pub(crate) fn changed(input: &str) -> Option<String> {
    if input.is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}
