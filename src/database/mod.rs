//! Database access layer with domain-specific DAOs
//!
//! Each domain (users, blogs) has its own DAO for focused operations.

use crate::config::Config;
use crate::health::{HealthCheckResult, HealthChecker};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, DatabaseConnection, DbErr, SqlErr};
use std::path::Path;
use thiserror::Error;

pub mod config;
pub mod dao;
pub mod entities;
pub mod migration;

pub use dao::{BlogChanges, BlogsDao, NewBlog, UsersDao};

/// Database error types
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Record not found")]
    NotFound,
    #[error("Constraint violation: {0}")]
    Constraint(String),
    #[error("Migration error: {0}")]
    Migration(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

pub(crate) fn map_db_error(err: DbErr) -> DatabaseError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => DatabaseError::Constraint(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => DatabaseError::Constraint(msg),
        _ => match err {
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => DatabaseError::NotFound,
            other => DatabaseError::Database(other.to_string()),
        },
    }
}

/// Database manager trait for dependency injection and testing
#[async_trait]
pub trait DatabaseManager: Send + Sync {
    /// Run database migrations
    async fn migrate(&self) -> DatabaseResult<()>;

    /// Health check for database connection
    async fn health_check(&self) -> DatabaseResult<()>;

    /// Get users DAO
    fn users(&self) -> UsersDao;

    /// Get blogs DAO
    fn blogs(&self) -> BlogsDao;

    /// Get direct database connection (for migrations and admin operations)
    fn connection(&self) -> &DatabaseConnection;
}

pub struct DatabaseManagerImpl {
    pub connection: DatabaseConnection,
}

/// File backing a `sqlite://` URL, if the URL names one
fn sqlite_file_path(url: &str) -> Option<&Path> {
    let rest = url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

impl DatabaseManagerImpl {
    pub async fn new_from_config(config: &Config) -> Result<Self, DatabaseError> {
        if let Some(parent) = sqlite_file_path(&config.database.url).and_then(Path::parent) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Database(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .sqlx_logging(false);

        // Every pooled connection would otherwise open its own empty in-memory database
        if config.database.url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }

        let connection = sea_orm::Database::connect(options)
            .await
            .map_err(|e| DatabaseError::Database(e.to_string()))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl DatabaseManager for DatabaseManagerImpl {
    async fn migrate(&self) -> DatabaseResult<()> {
        use crate::database::migration::Migrator;
        use sea_orm_migration::MigratorTrait;

        tracing::info!("Running database migrations");

        Migrator::up(&self.connection, None)
            .await
            .map_err(|e| DatabaseError::Migration(format!("Failed to run migrations: {}", e)))?;

        tracing::info!("Successfully completed all migrations");
        Ok(())
    }

    async fn health_check(&self) -> DatabaseResult<()> {
        self.connection
            .ping()
            .await
            .map_err(|e| DatabaseError::Database(format!("db error: {}", e)))
    }

    fn users(&self) -> UsersDao {
        UsersDao::new(self.connection.clone())
    }

    fn blogs(&self) -> BlogsDao {
        BlogsDao::new(self.connection.clone())
    }

    fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

#[async_trait]
impl HealthChecker for DatabaseManagerImpl {
    fn name(&self) -> &str {
        "database"
    }

    async fn check(&self) -> HealthCheckResult {
        match self.health_check().await {
            Ok(_) => HealthCheckResult::healthy_with_details(serde_json::json!({
                "status": "healthy",
                "connection": "ok"
            })),
            Err(err) => HealthCheckResult::unhealthy_with_details(
                "DB health check failed".to_string(),
                serde_json::json!({
                    "status": "unhealthy",
                    "error": err.to_string()
                }),
            ),
        }
    }
}
