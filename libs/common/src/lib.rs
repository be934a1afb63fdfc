//! Common library for the volunteer event coordination application
//!
//! This crate provides the ambient pieces every layer of the application
//! relies on: configuration loading, logging setup, MySQL connection pooling
//! and the storage error type.
//!
//! ```rust,no_run
//! use common::config::AppConfig;
//! use common::database::{DatabaseConfig, close_pool, health_check, init_pool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load("config/volunteer_event_coordination_app_config.json")?;
//!     let pool = init_pool(&DatabaseConfig::from(&config.database)).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     close_pool(&pool).await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
