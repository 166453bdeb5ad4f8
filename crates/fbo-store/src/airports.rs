//! Airport persistence operations.

use crate::error::StoreError;
use anyhow::Result;
use chrono::{DateTime, Utc};
use fbo_core::{Airport, AirportType};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

const AIRPORT_COLUMNS: &str = "id, name, icao, iata, city, state, country_code, country_name, \
     latitude, longitude, elevation, size, has_lights, is_military, is_basecamp, display_name, \
     airport_type, has_fbo, created_at, modified_at";

/// Insert or refresh an airport record.
///
/// The FBO flag and creation time of an existing row are left untouched;
/// only the FBO operations change `has_fbo`.
pub async fn upsert_airport<'e, E>(executor: E, airport: &Airport) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO airports (id, name, icao, iata, city, state, country_code, country_name,
            latitude, longitude, elevation, size, has_lights, is_military, is_basecamp,
            display_name, airport_type, has_fbo, created_at, modified_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
        ON CONFLICT(id) DO UPDATE SET
            name = ?2, icao = ?3, iata = ?4, city = ?5, state = ?6, country_code = ?7,
            country_name = ?8, latitude = ?9, longitude = ?10, elevation = ?11, size = ?12,
            has_lights = ?13, is_military = ?14, is_basecamp = ?15, display_name = ?16,
            airport_type = COALESCE(?17, airport_type), modified_at = ?20
        "#,
    )
    .bind(&airport.id)
    .bind(&airport.name)
    .bind(normalize_icao(&airport.icao))
    .bind(&airport.iata)
    .bind(&airport.city)
    .bind(&airport.state)
    .bind(&airport.country_code)
    .bind(&airport.country_name)
    .bind(airport.latitude)
    .bind(airport.longitude)
    .bind(airport.elevation_ft)
    .bind(airport.size.map(i64::from))
    .bind(airport.has_lights)
    .bind(airport.is_military)
    .bind(airport.is_basecamp)
    .bind(&airport.display_name)
    .bind(airport.airport_type.map(|t| t.code()))
    .bind(airport.has_fbo)
    .bind(airport.created_at.to_rfc3339())
    .bind(Utc::now().to_rfc3339())
    .execute(executor)
    .await?;

    Ok(())
}

/// ICAO codes are stored and matched in upper case.
pub(crate) fn normalize_icao(icao: &str) -> String {
    icao.trim().to_uppercase()
}

/// Look up an airport by ICAO code.
pub async fn get_airport_by_icao<'e, E>(executor: E, icao: &str) -> Result<Option<Airport>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {AIRPORT_COLUMNS} FROM airports WHERE icao = ?1");
    let row = sqlx::query_as::<_, AirportRow>(&sql)
        .bind(normalize_icao(icao))
        .fetch_optional(executor)
        .await?;

    Ok(row.map(Airport::from))
}

/// Load every airport.
pub async fn load_all_airports(pool: &SqlitePool) -> Result<Vec<Airport>> {
    let sql = format!("SELECT {AIRPORT_COLUMNS} FROM airports ORDER BY icao");
    let rows = sqlx::query_as::<_, AirportRow>(&sql).fetch_all(pool).await?;

    Ok(rows.into_iter().map(Airport::from).collect())
}

/// Load airports flagged as hosting an FBO.
pub async fn load_fbo_airports(pool: &SqlitePool) -> Result<Vec<Airport>> {
    let sql = format!("SELECT {AIRPORT_COLUMNS} FROM airports WHERE has_fbo = TRUE ORDER BY icao");
    let rows = sqlx::query_as::<_, AirportRow>(&sql).fetch_all(pool).await?;

    Ok(rows.into_iter().map(Airport::from).collect())
}

/// Find airports whose ICAO or name contains `text`.
pub async fn search_airports(pool: &SqlitePool, text: &str) -> Result<Vec<Airport>> {
    let pattern = format!("%{}%", text.trim());
    let sql = format!(
        "SELECT {AIRPORT_COLUMNS} FROM airports WHERE icao LIKE ?1 OR name LIKE ?1 ORDER BY icao"
    );
    let rows = sqlx::query_as::<_, AirportRow>(&sql)
        .bind(pattern)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(Airport::from).collect())
}

/// Set or clear the FBO flag. Returns false when no airport matched.
pub async fn set_has_fbo<'e, E>(executor: E, airport_id: &str, has_fbo: bool) -> Result<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE airports SET has_fbo = ?1, modified_at = ?2 WHERE id = ?3")
        .bind(has_fbo)
        .bind(Utc::now().to_rfc3339())
        .bind(airport_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Changes to an airport's descriptive fields.
///
/// `None` leaves a field as it is. An empty string clears an optional text
/// field; the country code cannot be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirportEdit {
    pub country_code: Option<String>,
    pub state: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub airport_type: Option<AirportType>,
}

impl AirportEdit {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, airport: &mut Airport) -> Result<(), StoreError> {
        if let Some(code) = &self.country_code {
            let code = code.trim().to_uppercase();
            if code.is_empty() {
                return Err(StoreError::MissingCountryCode(airport.icao.clone()));
            }
            airport.country_code = code;
        }
        if let Some(state) = &self.state {
            airport.state = optional_text(state);
        }
        if let Some(country_name) = &self.country_name {
            airport.country_name = optional_text(country_name);
        }
        if let Some(city) = &self.city {
            airport.city = optional_text(city);
        }
        if let Some(airport_type) = self.airport_type {
            airport.airport_type = Some(airport_type);
        }
        Ok(())
    }
}

fn optional_text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Apply an edit to a stored airport and return the updated record.
pub async fn modify_airport(pool: &SqlitePool, icao: &str, edit: &AirportEdit) -> Result<Airport> {
    let icao = normalize_icao(icao);
    let mut tx = pool.begin().await?;

    let mut airport = get_airport_by_icao(&mut *tx, &icao)
        .await?
        .ok_or_else(|| StoreError::AirportNotFound(icao.clone()))?;
    edit.apply(&mut airport)?;
    airport.modified_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE airports SET
            country_code = ?1, state = ?2, country_name = ?3, city = ?4,
            airport_type = ?5, modified_at = ?6
        WHERE id = ?7
        "#,
    )
    .bind(&airport.country_code)
    .bind(&airport.state)
    .bind(&airport.country_name)
    .bind(&airport.city)
    .bind(airport.airport_type.map(|t| t.code()))
    .bind(airport.modified_at.to_rfc3339())
    .bind(&airport.id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!(icao = %icao, "Airport updated");
    Ok(airport)
}

// Internal row type for SQLx
#[derive(sqlx::FromRow)]
struct AirportRow {
    id: String,
    name: String,
    icao: String,
    iata: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country_code: String,
    country_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<f64>,
    size: Option<i64>,
    has_lights: bool,
    is_military: bool,
    is_basecamp: bool,
    display_name: Option<String>,
    airport_type: Option<String>,
    has_fbo: bool,
    created_at: String,
    modified_at: String,
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            icao: row.icao,
            name: row.name,
            iata: row.iata,
            city: row.city,
            state: row.state,
            country_code: row.country_code,
            country_name: row.country_name,
            latitude: row.latitude,
            longitude: row.longitude,
            elevation_ft: row.elevation,
            size: row.size.and_then(|s| u8::try_from(s).ok()),
            has_lights: row.has_lights,
            is_military: row.is_military,
            is_basecamp: row.is_basecamp,
            display_name: row.display_name,
            airport_type: row.airport_type.as_deref().and_then(AirportType::from_code),
            has_fbo: row.has_fbo,
            created_at: parse_timestamp(&row.created_at),
            modified_at: parse_timestamp(&row.modified_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    #[tokio::test]
    async fn upsert_round_trips_optional_fields() {
        let db = init_database(":memory:", 1).await.unwrap();
        let mut airport = Airport::new("a1", "YSSY", "Sydney Kingsford Smith")
            .at(-33.9461, 151.1772)
            .with_size(5)
            .with_lights(true);
        airport.iata = Some("SYD".to_string());
        airport.airport_type = Some(AirportType::Aerodrome);

        upsert_airport(db.pool(), &airport).await.unwrap();
        let loaded = get_airport_by_icao(db.pool(), "yssy").await.unwrap().unwrap();

        assert_eq!(loaded.iata.as_deref(), Some("SYD"));
        assert_eq!(loaded.size, Some(5));
        assert_eq!(loaded.latitude, Some(-33.9461));
        assert_eq!(loaded.airport_type, Some(AirportType::Aerodrome));
        assert!(loaded.has_lights);
        assert!(loaded.city.is_none());
    }

    #[tokio::test]
    async fn upsert_does_not_touch_fbo_flag() {
        let db = init_database(":memory:", 1).await.unwrap();
        let airport = Airport::new("a1", "YSSY", "Sydney").at(-33.9, 151.2);
        upsert_airport(db.pool(), &airport).await.unwrap();
        assert!(set_has_fbo(db.pool(), "a1", true).await.unwrap());

        let renamed = Airport::new("a1", "YSSY", "Sydney Intl").at(-33.9, 151.2);
        upsert_airport(db.pool(), &renamed).await.unwrap();

        let loaded = get_airport_by_icao(db.pool(), "YSSY").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Sydney Intl");
        assert!(loaded.has_fbo);
        assert_eq!(load_fbo_airports(db.pool()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lowercase_icao_is_stored_upper_case() {
        let db = init_database(":memory:", 1).await.unwrap();
        let airport = Airport::new("a1", " egll ", "Heathrow").at(51.47, -0.45);
        upsert_airport(db.pool(), &airport).await.unwrap();

        let loaded = get_airport_by_icao(db.pool(), "EGLL").await.unwrap().unwrap();
        assert_eq!(loaded.icao, "EGLL");
        assert!(get_airport_by_icao(db.pool(), "egll").await.unwrap().is_some());
    }

    #[test]
    fn edit_sets_and_clears_fields() {
        let mut airport = Airport::new("a1", "YSSY", "Sydney");
        airport.state = Some("NSW".to_string());

        let edit = AirportEdit {
            country_code: Some("au".to_string()),
            state: Some(" ".to_string()),
            city: Some("Sydney".to_string()),
            airport_type: Some(AirportType::Aerodrome),
            ..AirportEdit::default()
        };
        edit.apply(&mut airport).unwrap();

        assert_eq!(airport.country_code, "AU");
        assert!(airport.state.is_none());
        assert_eq!(airport.city.as_deref(), Some("Sydney"));
        assert!(airport.country_name.is_none());
        assert_eq!(airport.airport_type, Some(AirportType::Aerodrome));
        assert!(AirportEdit::default().is_empty());
        assert!(!edit.is_empty());
    }

    #[test]
    fn edit_rejects_blank_country_code() {
        let mut airport = Airport::new("a1", "YSSY", "Sydney");
        airport.country_code = "AU".to_string();
        let edit = AirportEdit {
            country_code: Some(String::new()),
            ..AirportEdit::default()
        };

        assert_eq!(
            edit.apply(&mut airport),
            Err(StoreError::MissingCountryCode("YSSY".to_string()))
        );
        assert_eq!(airport.country_code, "AU");
    }

    #[tokio::test]
    async fn modify_persists_details_and_airport_type() {
        let db = init_database(":memory:", 1).await.unwrap();
        let airport = Airport::new("a1", "YSSY", "Sydney").at(-33.9, 151.2).with_fbo(true);
        upsert_airport(db.pool(), &airport).await.unwrap();

        let edit = AirportEdit {
            country_name: Some("Australia".to_string()),
            airport_type: Some(AirportType::LandingArea),
            ..AirportEdit::default()
        };
        let updated = modify_airport(db.pool(), "yssy", &edit).await.unwrap();
        assert_eq!(updated.country_name.as_deref(), Some("Australia"));

        let loaded = get_airport_by_icao(db.pool(), "YSSY").await.unwrap().unwrap();
        assert_eq!(loaded.country_name.as_deref(), Some("Australia"));
        assert_eq!(loaded.airport_type, Some(AirportType::LandingArea));
        assert!(loaded.has_fbo);

        let err = modify_airport(db.pool(), "ZZZZ", &edit).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::AirportNotFound("ZZZZ".to_string()))
        );
    }

    #[tokio::test]
    async fn search_matches_icao_and_name() {
        let db = init_database(":memory:", 1).await.unwrap();
        for airport in [
            Airport::new("a1", "YSSY", "Sydney"),
            Airport::new("a2", "YBBN", "Brisbane"),
            Airport::new("a3", "YSBK", "Bankstown"),
        ] {
            upsert_airport(db.pool(), &airport).await.unwrap();
        }

        let by_icao = search_airports(db.pool(), "ys").await.unwrap();
        assert_eq!(by_icao.len(), 2);

        let by_name = search_airports(db.pool(), "bane").await.unwrap();
        assert_eq!(by_name[0].icao, "YBBN");

        assert_eq!(load_all_airports(db.pool()).await.unwrap().len(), 3);
        assert!(!set_has_fbo(db.pool(), "missing", true).await.unwrap());
    }
}
