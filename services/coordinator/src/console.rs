//! Interactive menu driving the application services

use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::error::ServiceError;
use crate::models::{
    EventUpdate, NewEvent, NewUser, RegistrationStatus, TIMESTAMP_FORMAT, UserUpdate,
    parse_timestamp,
};
use crate::persistence::PersistenceGateway;
use crate::services::AppServices;
use crate::table::Table;

const MENU: &str = "
\t----------------------------------------
\tVolunteer Event Coordination System

\t1. List all users
\t2. Add User
\t3. Update User
\t4. Delete User

\t5. List all events
\t6. Add Event
\t7. Update Event
\t8. Delete Event

\t9. Register User to Event
\t10. Update User Event Registration Status
\t11. Unregister User from Event

\t12. Exit
";

/// What the loop does after a menu choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Read-eval-print loop over any line based input and output
pub struct ConsoleUi<G, R, W> {
    services: AppServices<G>,
    input: R,
    output: W,
}

impl<G, R, W> ConsoleUi<G, R, W>
where
    G: PersistenceGateway,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(services: AppServices<G>, input: R, output: W) -> Self {
        Self {
            services,
            input,
            output,
        }
    }

    /// Run until the operator exits or the input ends.
    ///
    /// A failing action is reported and the menu comes back; only I/O errors
    /// on the console itself end the loop early.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.display_menu().await?;
            match self.process_menu_choice().await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    info!("Console input closed");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        info!("Leaving console");
        Ok(())
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (AppServices<G>, R, W) {
        (self.services, self.input, self.output)
    }

    async fn display_menu(&mut self) -> io::Result<()> {
        self.say(MENU).await
    }

    async fn process_menu_choice(&mut self) -> io::Result<Flow> {
        let choice = self.prompt("\tEnter your choice (1-12): ").await?;

        match choice.trim() {
            "1" => self.list_users().await?,
            "2" => self.add_user().await?,
            "3" => self.update_user().await?,
            "4" => self.delete_user().await?,

            "5" => self.list_events().await?,
            "6" => self.add_event().await?,
            "7" => self.update_event().await?,
            "8" => self.delete_event().await?,

            "9" => self.register_user_to_event().await?,
            "10" => self.update_user_event_registration_status().await?,
            "11" => self.unregister_user_from_event().await?,

            "12" => return Ok(Flow::Exit),

            other => {
                self.say(&format!("\tInvalid Menu choice {}. Please try again.", other))
                    .await?
            }
        }
        Ok(Flow::Continue)
    }

    async fn list_users(&mut self) -> io::Result<()> {
        self.say("\tListing all users...").await?;
        let users = match self.services.get_all_users().await {
            Ok(users) => users,
            Err(err) => return self.report("Failed to list users", err).await,
        };

        let mut users_table =
            Table::new(["ID", "Full Name", "Email", "Phone", "Role", "Events"]).with_row_dividers();
        for user in &users {
            let events = if user.events.is_empty() {
                String::new()
            } else {
                let mut events_table =
                    Table::new(["Title", "Starts At", "Ends At", "Location", "Capacity"]);
                for event in &user.events {
                    events_table.add_row([
                        event.title.clone(),
                        event.starts_at.format(TIMESTAMP_FORMAT).to_string(),
                        event.ends_at.format(TIMESTAMP_FORMAT).to_string(),
                        event.location.clone(),
                        event.capacity.to_string(),
                    ]);
                }
                events_table.to_string()
            };
            users_table.add_row([
                user.id.to_string(),
                user.full_name.clone(),
                user.email.clone(),
                user.phone.clone(),
                user.role.clone(),
                events,
            ]);
        }
        self.say(&users_table.to_string()).await
    }

    async fn add_user(&mut self) -> io::Result<()> {
        self.say("\tAdding a new user...").await?;
        let full_name = self.prompt("\tEnter full name: ").await?;
        let email = self.prompt("\tEnter email: ").await?;
        let phone = self.prompt("\tEnter phone: ").await?;
        let role = self.prompt("\tEnter role (volunteer/organizer): ").await?;

        let new_user = NewUser {
            full_name,
            email,
            phone,
            role,
        };
        match self.services.create_user(new_user).await {
            Ok(user) => {
                self.say(&format!(
                    "\tUser '{}' created successfully with ID {}.",
                    user.full_name, user.id
                ))
                .await
            }
            Err(err) => self.report("Failed to create user", err).await,
        }
    }

    async fn update_user(&mut self) -> io::Result<()> {
        self.say("\tUpdating an existing user...").await?;
        let Some(user_id) = self.prompt_id("\tEnter user ID to update: ").await? else {
            return Ok(());
        };
        let full_name = self.prompt("\tEnter new full name: ").await?;
        let email = self.prompt("\tEnter new email: ").await?;
        let phone = self.prompt("\tEnter new phone: ").await?;
        let role = self.prompt("\tEnter new role (volunteer/organizer): ").await?;

        let changes = UserUpdate::from_input(&full_name, &email, &phone, &role);
        match self.services.update_user(user_id, changes).await {
            Ok(_) => {
                self.say(&format!("\tUser ID {} updated successfully.", user_id))
                    .await
            }
            Err(err) => {
                self.report(&format!("Failed to update user ID {}", user_id), err)
                    .await
            }
        }
    }

    async fn delete_user(&mut self) -> io::Result<()> {
        self.say("\tDeleting a user...").await?;
        let Some(user_id) = self.prompt_id("\tEnter user ID to delete: ").await? else {
            return Ok(());
        };

        match self.services.delete_user(user_id).await {
            Ok(()) => {
                self.say(&format!("\tUser ID {} deleted successfully.", user_id))
                    .await
            }
            Err(err) => {
                self.report(&format!("Failed to delete user ID {}", user_id), err)
                    .await
            }
        }
    }

    async fn list_events(&mut self) -> io::Result<()> {
        self.say("\tListing all events...").await?;
        let events = match self.services.get_all_events().await {
            Ok(events) => events,
            Err(err) => return self.report("Failed to list events", err).await,
        };

        let mut events_table = Table::new([
            "ID",
            "Title",
            "Description",
            "Location",
            "Starts At",
            "Ends At",
            "Capacity",
            "Created By",
            "Created At",
        ]);
        for event in &events {
            events_table.add_row([
                event.id.to_string(),
                event.title.clone(),
                event.description.clone(),
                event.location.clone(),
                event.starts_at.format(TIMESTAMP_FORMAT).to_string(),
                event.ends_at.format(TIMESTAMP_FORMAT).to_string(),
                event.capacity.to_string(),
                event.created_by.to_string(),
                event.created_at.format(TIMESTAMP_FORMAT).to_string(),
            ]);
        }
        self.say(&events_table.to_string()).await
    }

    async fn add_event(&mut self) -> io::Result<()> {
        self.say("\tAdding a new event...").await?;
        let title = self.prompt("\tEnter event title: ").await?;
        let description = self.prompt("\tEnter event description: ").await?;
        let location = self.prompt("\tEnter event location: ").await?;
        let Some(starts_at) = self
            .prompt_timestamp("\tEnter event start time (YYYY-MM-DD HH:MM:SS): ")
            .await?
        else {
            return Ok(());
        };
        let Some(ends_at) = self
            .prompt_timestamp("\tEnter event end time (YYYY-MM-DD HH:MM:SS): ")
            .await?
        else {
            return Ok(());
        };
        let Some(capacity) = self.prompt_number::<i32>("\tEnter event capacity: ").await? else {
            return Ok(());
        };
        let Some(created_by) = self.prompt_id("\tEnter creator user ID: ").await? else {
            return Ok(());
        };

        let new_event = NewEvent {
            title,
            description,
            location,
            starts_at,
            ends_at,
            capacity,
            created_by,
        };
        match self.services.create_event(new_event).await {
            Ok(event) => {
                self.say(&format!(
                    "\tEvent '{}' created successfully with ID {}.",
                    event.title, event.id
                ))
                .await
            }
            Err(err) => self.report("Failed to create event", err).await,
        }
    }

    async fn update_event(&mut self) -> io::Result<()> {
        self.say("\tUpdating an existing event...").await?;
        let Some(event_id) = self.prompt_id("\tEnter event ID to update: ").await? else {
            return Ok(());
        };
        let title = self.prompt("\tEnter new event title: ").await?;
        let description = self.prompt("\tEnter new event description: ").await?;
        let location = self.prompt("\tEnter new event location: ").await?;
        let starts_at = self
            .prompt("\tEnter new event start time (YYYY-MM-DD HH:MM:SS): ")
            .await?;
        let ends_at = self
            .prompt("\tEnter new event end time (YYYY-MM-DD HH:MM:SS): ")
            .await?;
        let capacity = self.prompt("\tEnter new event capacity: ").await?;

        let changes = match EventUpdate::from_input(
            &title,
            &description,
            &location,
            &starts_at,
            &ends_at,
            &capacity,
        ) {
            Ok(changes) => changes,
            Err(msg) => {
                let err = ServiceError::InvalidInput(msg);
                return self
                    .report(&format!("Failed to update event ID {}", event_id), err)
                    .await;
            }
        };

        match self.services.update_event(event_id, changes).await {
            Ok(_) => {
                self.say(&format!("\tEvent ID {} updated successfully.", event_id))
                    .await
            }
            Err(err) => {
                self.report(&format!("Failed to update event ID {}", event_id), err)
                    .await
            }
        }
    }

    async fn delete_event(&mut self) -> io::Result<()> {
        self.say("\tDeleting an event...").await?;
        let Some(event_id) = self.prompt_id("\tEnter event ID to delete: ").await? else {
            return Ok(());
        };

        match self.services.delete_event(event_id).await {
            Ok(()) => {
                self.say(&format!("\tEvent ID {} deleted successfully.", event_id))
                    .await
            }
            Err(err) => {
                self.report(&format!("Failed to delete event ID {}", event_id), err)
                    .await
            }
        }
    }

    async fn register_user_to_event(&mut self) -> io::Result<()> {
        self.say("\tRegistering a user to an event...").await?;
        let Some(user_id) = self.prompt_id("\tEnter user ID to register: ").await? else {
            return Ok(());
        };
        let Some(event_id) = self.prompt_id("\tEnter event ID to register to: ").await? else {
            return Ok(());
        };
        let status = self
            .prompt("\tEnter registration status (e.g., registered/waitlist/cancelled): ")
            .await?
            .parse::<RegistrationStatus>()
            .unwrap_or_default();

        match self
            .services
            .register_user_to_event(user_id, event_id, status)
            .await
        {
            Ok(_) => {
                self.say(&format!(
                    "\tUser ID {} registered to Event ID {} successfully.",
                    user_id, event_id
                ))
                .await
            }
            Err(err) => {
                let context = format!(
                    "Failed to register User ID {} to Event ID {}",
                    user_id, event_id
                );
                self.report(&context, err).await
            }
        }
    }

    async fn update_user_event_registration_status(&mut self) -> io::Result<()> {
        self.say("\tUpdating a user's event registration status...")
            .await?;
        let Some(user_id) = self.prompt_id("\tEnter user ID: ").await? else {
            return Ok(());
        };
        let Some(event_id) = self.prompt_id("\tEnter event ID: ").await? else {
            return Ok(());
        };
        let input = self
            .prompt("\tEnter new registration status (e.g., registered/waitlist/cancelled): ")
            .await?;
        let status = match input.parse::<RegistrationStatus>() {
            Ok(status) => status,
            Err(err) => {
                warn!("{}", err);
                return self.say("\tInvalid status. Please try again.").await;
            }
        };

        match self
            .services
            .update_registration_status(user_id, event_id, status)
            .await
        {
            Ok(_) => {
                self.say(&format!(
                    "\tUser ID {} registration status for Event ID {} updated to '{}' successfully.",
                    user_id, event_id, status
                ))
                .await
            }
            Err(err) => {
                let context = format!(
                    "Failed to update registration status for User ID {} and Event ID {}",
                    user_id, event_id
                );
                self.report(&context, err).await
            }
        }
    }

    async fn unregister_user_from_event(&mut self) -> io::Result<()> {
        self.say("\tUnregistering a user from an event...").await?;
        let Some(user_id) = self.prompt_id("\tEnter user ID to unregister: ").await? else {
            return Ok(());
        };
        let Some(event_id) = self
            .prompt_id("\tEnter event ID to unregister from: ")
            .await?
        else {
            return Ok(());
        };

        match self
            .services
            .unregister_user_from_event(user_id, event_id)
            .await
        {
            Ok(()) => {
                self.say(&format!(
                    "\tUser ID {} unregistered from Event ID {} successfully.",
                    user_id, event_id
                ))
                .await
            }
            Err(err) => {
                let context = format!(
                    "Failed to unregister User ID {} from Event ID {}",
                    user_id, event_id
                );
                self.report(&context, err).await
            }
        }
    }

    /// Print a failed action and log it at a level matching its kind
    async fn report(&mut self, context: &str, err: ServiceError) -> io::Result<()> {
        match &err {
            ServiceError::StorageUnavailable(_) => error!("{}: {}", context, err),
            _ => warn!("{}: {}", context, err),
        }
        self.say(&format!("\t{}: {}", context, err)).await
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }

    /// Show `label` and read one line without its line ending
    async fn prompt(&mut self, label: &str) -> io::Result<String> {
        self.output.write_all(label.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "console input closed",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn prompt_id(&mut self, label: &str) -> io::Result<Option<i64>> {
        self.prompt_number::<i64>(label).await
    }

    /// Prompt for a number; an unparseable answer is reported and yields `None`
    async fn prompt_number<T: std::str::FromStr>(&mut self, label: &str) -> io::Result<Option<T>> {
        let input = self.prompt(label).await?;
        match input.trim().parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!(input = %input, "Rejected non-numeric input");
                self.say(&format!("\t'{}' is not a valid number.", input))
                    .await?;
                Ok(None)
            }
        }
    }

    async fn prompt_timestamp(&mut self, label: &str) -> io::Result<Option<chrono::NaiveDateTime>> {
        let input = self.prompt(label).await?;
        match parse_timestamp(&input) {
            Ok(ts) => Ok(Some(ts)),
            Err(msg) => {
                warn!("{}", msg);
                self.say(&format!("\t{}", msg)).await?;
                Ok(None)
            }
        }
    }
}
