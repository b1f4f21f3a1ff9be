//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2: pool initialization, per
//! connection setup, and running migrations.

use std::sync::atomic::{AtomicUsize, Ordering};

use cinelog_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const POOL_SIZE: u32 = 4;

static MEMORY_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Initialize a new database pool with the given file path.
///
/// Creates the SQLite file if it doesn't exist, enables foreign key
/// constraints on every connection and runs pending migrations.
///
/// # Example
///
/// ```no_run
/// use cinelog_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/cinelog/cinelog.sqlite").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    build(manager)
}

/// Initialize an in-memory database pool for testing.
///
/// All connections of the pool share one named in-memory database, which is
/// dropped together with the pool.
///
/// # Example
///
/// ```
/// use cinelog_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let n = MEMORY_DB_COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!(
        "file:cinelog-mem-{}-{}?mode=memory&cache=shared",
        std::process::id(),
        n
    );
    let manager = SqliteConnectionManager::file(uri)
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

    build(manager)
}

fn build(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    let applied = migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;
    if applied > 0 {
        tracing::debug!(applied, "Database migrations applied");
    }

    Ok(pool)
}

/// Get a connection from the pool, converting the r2d2 error into the
/// common error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
