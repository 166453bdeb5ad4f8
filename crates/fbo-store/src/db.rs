//! Database connection and initialization.

use anyhow::Result;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Database connection wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Initialize the SQLite database.
///
/// Creates the database file if it doesn't exist, runs migrations,
/// and returns a connection pool.
pub async fn init_database(db_path: &str, max_connections: u32) -> Result<Database> {
    // Ensure parent directory exists
    if let Some(parent) = Path::new(db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    // sqlite URL, created on first open
    let db_url = format!("sqlite:{}?mode=rwc", db_path);

    info!("Connecting to database: {}", db_path);

    // Create connection pool
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&db_url)
        .await?;

    // Create tables and backfill newer columns
    run_migrations(&pool).await?;

    Ok(Database { pool })
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Schema is compiled into the binary
    let migration_sql = include_str!("../migrations/001_init.sql");

    info!("Running database migrations...");

    // Split by semicolons and execute each statement
    for statement in migration_sql.split(';') {
        // Drop comment lines
        let statement: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }

        if let Err(e) = sqlx::query(statement).execute(pool).await {
            let err_str = e.to_string();
            // "already exists" is expected on re-runs
            if err_str.contains("already exists") {
                continue;
            }
            if statement.to_uppercase().starts_with("CREATE") {
                anyhow::bail!("Migration failed on CREATE statement: {}", e);
            }
            warn!("Migration statement failed: {}", e);
        }
    }

    ensure_airport_columns(pool).await?;

    info!("Database migrations complete");
    Ok(())
}

/// Add columns introduced after the first schema to older databases.
async fn ensure_airport_columns(pool: &SqlitePool) -> Result<()> {
    let rows = sqlx::query("PRAGMA table_info(airports)")
        .fetch_all(pool)
        .await?;
    if rows.is_empty() {
        return Ok(());
    }

    let mut columns = std::collections::HashSet::new();
    for row in rows {
        let name: String = row.try_get("name")?;
        columns.insert(name);
    }

    // Columns added after the first release
    let mut missing: Vec<(&str, &str)> = Vec::new();
    if !columns.contains("airport_type") {
        missing.push(("airport_type", "TEXT"));
    }

    for (name, data_type) in missing {
        let statement = format!("ALTER TABLE airports ADD COLUMN {} {}", name, data_type);
        if let Err(err) = sqlx::query(&statement).execute(pool).await {
            let err_str = err.to_string();
            if err_str.contains("duplicate column") {
                continue;
            }
            return Err(err.into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_database() {
        let db = init_database(":memory:", 1).await.unwrap();

        let result: (i32,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('airports', 'fbos')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(result.0, 2);
    }

    #[tokio::test]
    async fn test_airport_type_column_added() {
        let db = init_database(":memory:", 1).await.unwrap();

        let rows = sqlx::query("PRAGMA table_info(airports)")
            .fetch_all(db.pool())
            .await
            .unwrap();
        let has_column = rows
            .iter()
            .any(|row| row.try_get::<String, _>("name").map(|n| n == "airport_type").unwrap_or(false));

        assert!(has_column);
    }
}
