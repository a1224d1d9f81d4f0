//! Database module for SQLite persistence.
//!
//! When a database is configured and reachable it is the source of truth for
//! all content; otherwise the flat-file backend takes over.

mod repository;

pub use repository::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tokio::sync::OnceCell;

/// Lazily connected database handle.
///
/// The first call to [`Database::pool`] connects and migrates; the outcome
/// (including failure) is kept for the life of the process.
pub struct Database {
    url: Option<String>,
    pool: OnceCell<Option<SqlitePool>>,
}

impl Database {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            pool: OnceCell::new(),
        }
    }

    /// The connection pool, or `None` when no database is configured or the
    /// connectivity probe failed.
    pub async fn pool(&self) -> Option<&SqlitePool> {
        self.pool
            .get_or_init(|| async {
                let Some(url) = self.url.as_deref() else {
                    return None;
                };
                match init_database(url).await {
                    Ok(pool) => Some(pool),
                    Err(e) => {
                        tracing::warn!(error = %e, "Database unreachable, falling back to flat files");
                        None
                    }
                }
            })
            .await
            .as_ref()
    }
}

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    // Ensure the parent directory of a file database exists
    if let Some(parent) = options.get_filename().parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Probe before trusting the pool
    sqlx::query("SELECT 1").execute(&pool).await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tours (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            price REAL NOT NULL,
            duration TEXT NOT NULL DEFAULT '',
            image TEXT NOT NULL,
            highlights TEXT NOT NULL DEFAULT '[]',
            itinerary TEXT NOT NULL DEFAULT '[]',
            included TEXT NOT NULL DEFAULT '[]'
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Slide ids are conventional only, so they are not a key
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS carousel (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id INTEGER NOT NULL,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS content (
            key TEXT PRIMARY KEY,
            data TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS admin_credentials (
            key TEXT PRIMARY KEY,
            hash TEXT NOT NULL,
            salt TEXT NOT NULL,
            iterations INTEGER NOT NULL DEFAULT 100000,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
