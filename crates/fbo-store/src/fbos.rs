//! FBO row persistence.

use anyhow::Result;
use fbo_core::{Fbo, NewFbo};
use crate::airports::normalize_icao;
use sqlx::{Executor, Sqlite, SqlitePool};

/// Load FBOs joined with their host airport's current coordinates.
///
/// Rows whose airport has no position are omitted.
pub async fn load_fbos(pool: &SqlitePool) -> Result<Vec<Fbo>> {
    let rows = sqlx::query_as::<_, FboRow>(
        r#"
        SELECT f.id, f.airport_id, a.icao, f.name, a.latitude, a.longitude
        FROM fbos f
        JOIN airports a ON a.id = f.airport_id
        WHERE a.latitude IS NOT NULL AND a.longitude IS NOT NULL
        ORDER BY a.icao
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Fbo::from).collect())
}

/// Load FBO rows exactly as stored, without joining airports.
pub async fn load_stored_fbos<'e, E>(executor: E) -> Result<Vec<Fbo>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, FboRow>(
        "SELECT id, airport_id, icao, name, latitude, longitude FROM fbos ORDER BY icao",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Fbo::from).collect())
}

/// Insert an FBO row and return its id.
pub async fn insert_fbo<'e, E>(executor: E, fbo: &NewFbo) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO fbos (airport_id, icao, name, latitude, longitude) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&fbo.airport_id)
    .bind(normalize_icao(&fbo.icao))
    .bind(&fbo.name)
    .bind(fbo.latitude)
    .bind(fbo.longitude)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Overwrite the stored details of the FBO at `fbo.airport_id`.
/// Returns false when no row matched.
pub async fn update_fbo<'e, E>(executor: E, fbo: &NewFbo) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "UPDATE fbos SET icao = ?1, name = ?2, latitude = ?3, longitude = ?4 WHERE airport_id = ?5",
    )
    .bind(normalize_icao(&fbo.icao))
    .bind(&fbo.name)
    .bind(fbo.latitude)
    .bind(fbo.longitude)
    .bind(&fbo.airport_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete the FBO hosted at an airport. Returns false when none existed.
pub async fn delete_fbo<'e, E>(executor: E, airport_id: &str) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM fbos WHERE airport_id = ?1")
        .bind(airport_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct FboRow {
    id: i64,
    airport_id: String,
    icao: String,
    name: String,
    latitude: f64,
    longitude: f64,
}

impl From<FboRow> for Fbo {
    fn from(row: FboRow) -> Self {
        Fbo {
            id: row.id,
            airport_id: row.airport_id,
            icao: row.icao,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}
