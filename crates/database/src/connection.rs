use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// Establishes a connection pool to the SQLite database described by `settings`.
///
/// The database file is created if it does not exist yet, and foreign keys
/// are enforced on every connection so a treatment can never point at a
/// missing doctor or patient. In-memory URLs are routed to
/// [`connect_in_memory`], since each pooled connection would otherwise see
/// its own private database.
pub async fn connect(settings: &DatabaseSettings) -> Result<SqlitePool, DbError> {
    if settings.is_in_memory() {
        return connect_in_memory().await;
    }

    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout())
        .connect_with(options)
        .await?;

    tracing::info!(url = %settings.url, max_connections = settings.max_connections, "Connected to database.");
    Ok(pool)
}

/// Opens a private in-memory database behind a single-connection pool.
///
/// The one connection is never recycled, so the data lives as long as the
/// pool. Requests queue for it, which also serializes units of work.
pub async fn connect_in_memory() -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| DbError::ConnectionConfigError(e.to_string()))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Applies the embedded migrations, creating the three tables if needed.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
