//! Application services orchestrating the persistence gateway

use tracing::{debug, error, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    Event, EventUpdate, NewEvent, NewUser, Registration, RegistrationStatus, User, UserUpdate,
};
use crate::persistence::PersistenceGateway;

/// Use cases offered to the console.
///
/// Compound operations such as fetch-then-update run as independent
/// auto-committed statements; with a single operator there is nobody to race.
pub struct AppServices<G> {
    gateway: G,
}

impl<G: PersistenceGateway> AppServices<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    #[cfg(test)]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Every user with the events it is registered for
    pub async fn get_all_users(&self) -> ServiceResult<Vec<User>> {
        debug!("Retrieving all users from database");
        Ok(self.gateway.select_all_users().await?)
    }

    pub async fn get_all_events(&self) -> ServiceResult<Vec<Event>> {
        debug!("Retrieving all events from database");
        Ok(self.gateway.select_all_events().await?)
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> ServiceResult<User> {
        debug!(user_id, "Retrieving user from database");
        self.gateway
            .select_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::user_not_found(user_id))
    }

    pub async fn get_event_by_id(&self, event_id: i64) -> ServiceResult<Event> {
        debug!(event_id, "Retrieving event from database");
        self.gateway
            .select_event_by_id(event_id)
            .await?
            .ok_or_else(|| ServiceError::event_not_found(event_id))
    }

    pub async fn get_registered_events_for_user(&self, user_id: i64) -> ServiceResult<Vec<Event>> {
        debug!(user_id, "Retrieving registered events for user");
        self.gateway
            .select_user_by_id(user_id)
            .await?
            .map(|user| user.events)
            .ok_or_else(|| ServiceError::user_not_found(user_id))
    }

    pub async fn create_user(&self, new_user: NewUser) -> ServiceResult<User> {
        debug!(full_name = %new_user.full_name, "Creating new user");
        new_user.validate().map_err(|msg| {
            warn!("Rejected new user: {}", msg);
            ServiceError::InvalidInput(msg)
        })?;

        Ok(self.gateway.insert_user(&new_user).await?)
    }

    /// Create an event once its creator is known to exist
    pub async fn create_event(&self, new_event: NewEvent) -> ServiceResult<Event> {
        debug!(title = %new_event.title, "Creating new event");
        new_event.validate().map_err(|msg| {
            warn!("Rejected new event: {}", msg);
            ServiceError::InvalidInput(msg)
        })?;

        let created_by = new_event.created_by;
        if self.gateway.select_user_by_id(created_by).await?.is_none() {
            error!(created_by, "Creator user id does not exist");
            return Err(ServiceError::ConstraintViolation(format!(
                "creator user id {} does not exist",
                created_by
            )));
        }

        Ok(self.gateway.insert_event(&new_event).await?)
    }

    /// Apply a partial update to a freshly fetched user and store every column
    pub async fn update_user(&self, user_id: i64, changes: UserUpdate) -> ServiceResult<User> {
        debug!(user_id, "Updating user");
        let Some(mut user) = self.gateway.select_user_by_id(user_id).await? else {
            error!(user_id, "User id does not exist");
            return Err(ServiceError::user_not_found(user_id));
        };

        changes.apply(&mut user);
        self.gateway.update_user(&user).await?;
        Ok(user)
    }

    /// Apply a partial update to a freshly fetched event and store every column
    pub async fn update_event(&self, event_id: i64, changes: EventUpdate) -> ServiceResult<Event> {
        debug!(event_id, "Updating event");
        let Some(mut event) = self.gateway.select_event_by_id(event_id).await? else {
            error!(event_id, "Event id does not exist");
            return Err(ServiceError::event_not_found(event_id));
        };

        changes.apply(&mut event);
        self.gateway.update_event(&event).await?;
        Ok(event)
    }

    pub async fn delete_user(&self, user_id: i64) -> ServiceResult<()> {
        debug!(user_id, "Deleting user");
        if self.gateway.select_user_by_id(user_id).await?.is_none() {
            error!(user_id, "User id does not exist");
            return Err(ServiceError::user_not_found(user_id));
        }

        if self.gateway.delete_user(user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::user_not_found(user_id))
        }
    }

    pub async fn delete_event(&self, event_id: i64) -> ServiceResult<()> {
        debug!(event_id, "Deleting event");
        if self.gateway.select_event_by_id(event_id).await?.is_none() {
            error!(event_id, "Event id does not exist");
            return Err(ServiceError::event_not_found(event_id));
        }

        if self.gateway.delete_event(event_id).await? {
            Ok(())
        } else {
            Err(ServiceError::event_not_found(event_id))
        }
    }

    /// Register a user for an event, or overwrite the status of an existing
    /// registration
    pub async fn register_user_to_event(
        &self,
        user_id: i64,
        event_id: i64,
        status: RegistrationStatus,
    ) -> ServiceResult<Registration> {
        debug!(user_id, event_id, %status, "Registering user to event");
        self.ensure_registration_targets(user_id, event_id).await?;

        let registration = Registration {
            user_id,
            event_id,
            status,
        };
        self.gateway.upsert_registration(&registration).await?;
        Ok(registration)
    }

    pub async fn update_registration_status(
        &self,
        user_id: i64,
        event_id: i64,
        status: RegistrationStatus,
    ) -> ServiceResult<Registration> {
        debug!(user_id, event_id, %status, "Updating registration status");
        self.ensure_registration_targets(user_id, event_id).await?;

        let Some(mut registration) = self.gateway.select_registration(user_id, event_id).await?
        else {
            error!(user_id, event_id, "Registration does not exist");
            return Err(ServiceError::registration_not_found(user_id, event_id));
        };

        self.gateway
            .update_registration_status(user_id, event_id, status)
            .await?;
        registration.status = status;
        Ok(registration)
    }

    pub async fn unregister_user_from_event(&self, user_id: i64, event_id: i64) -> ServiceResult<()> {
        debug!(user_id, event_id, "Unregistering user from event");
        self.ensure_registration_targets(user_id, event_id).await?;

        if self.gateway.delete_registration(user_id, event_id).await? {
            Ok(())
        } else {
            error!(user_id, event_id, "Registration does not exist");
            Err(ServiceError::registration_not_found(user_id, event_id))
        }
    }

    async fn ensure_registration_targets(&self, user_id: i64, event_id: i64) -> ServiceResult<()> {
        if self.gateway.select_user_by_id(user_id).await?.is_none() {
            error!(user_id, "Registration refers to unknown user");
            return Err(ServiceError::ConstraintViolation(format!(
                "user id {} does not exist",
                user_id
            )));
        }
        if self.gateway.select_event_by_id(event_id).await?.is_none() {
            error!(event_id, "Registration refers to unknown event");
            return Err(ServiceError::ConstraintViolation(format!(
                "event id {} does not exist",
                event_id
            )));
        }
        Ok(())
    }
}
