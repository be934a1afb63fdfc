//! Database module for handling MySQL connections
//!
//! This module provides connection pooling, configuration, health checks and
//! shutdown for the MySQL database.

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Executor;
use tracing::{error, info};

use crate::config::DatabaseSection;
use crate::error::{DatabaseError, DatabaseResult};

/// Database configuration struct
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    /// Name used to identify the pool in logs
    pub pool_name: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Roll back session state whenever a connection returns to the pool
    pub reset_session: bool,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("database", &self.database)
            .field("pool_name", &self.pool_name)
            .field("max_connections", &self.max_connections)
            .field("reset_session", &self.reset_session)
            .finish_non_exhaustive()
    }
}

impl From<&DatabaseSection> for DatabaseConfig {
    fn from(section: &DatabaseSection) -> Self {
        let connection = &section.connection.config;
        Self {
            host: connection.host.clone(),
            port: connection.port,
            username: connection.user.clone(),
            password: connection.password.clone(),
            database: connection.database.clone(),
            pool_name: section.pool.name.clone(),
            max_connections: section.pool.size,
            reset_session: section.pool.reset_session,
        }
    }
}

impl DatabaseConfig {
    fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password)
            .database(&self.database)
    }

    fn validate(&self) -> DatabaseResult<()> {
        if self.max_connections == 0 {
            return Err(DatabaseError::Configuration(format!(
                "pool '{}' must allow at least one connection",
                self.pool_name
            )));
        }
        if self.host.is_empty() || self.database.is_empty() {
            return Err(DatabaseError::Configuration(
                "host and database must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pool options shared by the eager and URL based constructors
fn pool_options(max_connections: u32, reset_session: bool) -> MySqlPoolOptions {
    let options = MySqlPoolOptions::new().max_connections(max_connections);

    if reset_session {
        options.after_release(|conn, _meta| {
            Box::pin(async move {
                conn.execute("ROLLBACK").await?;
                Ok(true)
            })
        })
    } else {
        options
    }
}

/// Initialize a MySQL connection pool
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<MySqlPool>` - MySQL connection pool or error
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<MySqlPool> {
    config.validate()?;
    info!(pool = %config.pool_name, size = config.max_connections, "Creating connection pool");

    let pool = pool_options(config.max_connections, config.reset_session)
        .connect_with(config.connect_options())
        .await
        .map_err(|e| {
            error!(pool = %config.pool_name, config = ?config, "Problem creating connection pool: {}", e);
            DatabaseError::Connection(e)
        })?;

    info!(pool = %config.pool_name, "Connection pool successfully created");
    Ok(pool)
}

/// Initialize a pool from a `mysql://` URL
pub async fn init_pool_from_url(url: &str, max_connections: u32) -> DatabaseResult<MySqlPool> {
    let options: MySqlConnectOptions = url
        .parse()
        .map_err(|e| DatabaseError::Configuration(format!("Invalid database URL: {}", e)))?;

    pool_options(max_connections, true)
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)
}

/// Check database connectivity
///
/// # Arguments
///
/// * `pool` - MySQL connection pool
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if the database answered, false otherwise
pub async fn health_check(pool: &MySqlPool) -> DatabaseResult<bool> {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => {
            info!("Database health check successful");
            Ok(true)
        }
        Err(e) => {
            error!("Database health check failed: {}", e);
            Ok(false)
        }
    }
}

/// Close every connection held by the pool
pub async fn close_pool(pool: &MySqlPool) {
    pool.close().await;
    info!("Connection pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionConfig, ConnectionSection, PoolConfig};

    fn section(size: u32) -> DatabaseSection {
        DatabaseSection {
            connection: ConnectionSection {
                config: ConnectionConfig {
                    database: "volunteer_event_coordination".to_string(),
                    user: "vec_user".to_string(),
                    password: "s3cret".to_string(),
                    host: "localhost".to_string(),
                    port: 3306,
                },
            },
            pool: PoolConfig {
                name: "vec_pool".to_string(),
                size,
                reset_session: true,
                use_pure: false,
            },
        }
    }

    #[test]
    fn test_database_config_from_section() {
        let config = DatabaseConfig::from(&section(5));
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 3306);
        assert_eq!(config.username, "vec_user");
        assert_eq!(config.database, "volunteer_event_coordination");
        assert_eq!(config.pool_name, "vec_pool");
        assert_eq!(config.max_connections, 5);
        assert!(config.reset_session);
    }

    #[test]
    fn test_debug_output_omits_password() {
        let config = DatabaseConfig::from(&section(5));
        assert!(!format!("{:?}", config).contains("s3cret"));
    }

    #[tokio::test]
    async fn test_zero_sized_pool_is_rejected() {
        let config = DatabaseConfig::from(&section(0));
        let err = init_pool(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let err = init_pool_from_url("not a url", 1).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Configuration(_)));
    }
}
