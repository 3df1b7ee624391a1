// src/infrastructure/repositories/sqlite/connection.rs
use super::error::{SqliteRepositoryError, SqliteResult};
use super::migration::MIGRATIONS;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel::sqlite::SqliteConnection;
use diesel::RunQueryDsl;
use diesel_migrations::MigrationHarness;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

pub type ConnectionPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type PooledConnection = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

/// Runs on every pooled connection before it is handed to a caller.
/// Bulk imports hand out one connection per worker and run `create`
/// concurrently via `spawn_blocking`; without a busy handler SQLite's
/// default rollback-journal locking returns `SQLITE_BUSY` under that
/// contention. `busy_timeout` makes a blocked writer retry instead of
/// failing immediately, and WAL lets readers proceed without waiting on
/// an in-progress writer.
#[derive(Debug, Clone, Copy)]
struct ConnectionCustomizer {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        diesel::sql_query(format!("PRAGMA busy_timeout = {}", self.busy_timeout_ms))
            .execute(conn)
            .map_err(r2d2::Error::QueryError)?;
        diesel::sql_query("PRAGMA journal_mode = WAL")
            .execute(conn)
            .map_err(r2d2::Error::QueryError)?;
        Ok(())
    }
}

/// Builds a connection pool for `database_url`, creating the parent
/// directory if necessary, and runs any pending migrations.
#[instrument(level = "debug")]
pub fn init_pool(database_url: &str) -> SqliteResult<ConnectionPool> {
    debug!("initializing connection pool for {}", database_url);

    if let Some(parent) = Path::new(database_url).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(15)
        .connection_customizer(Box::new(ConnectionCustomizer { busy_timeout_ms: 5_000 }))
        .build(manager)
        .map_err(|e| SqliteRepositoryError::ConnectionPoolError(e.to_string()))?;

    run_pending_migrations(&pool)?;

    info!("connection pool initialized");
    Ok(pool)
}

#[instrument(level = "debug", skip(pool))]
pub fn run_pending_migrations(pool: &ConnectionPool) -> SqliteResult<()> {
    let mut conn = pool.get()?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| SqliteRepositoryError::MigrationError(e.to_string()))?;

    Ok(())
}
