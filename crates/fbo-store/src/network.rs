//! Transactional FBO network changes.

use crate::airports::{get_airport_by_icao, normalize_icao, set_has_fbo, upsert_airport};
use crate::error::StoreError;
use crate::fbos::{delete_fbo, insert_fbo, load_stored_fbos, update_fbo};
use anyhow::Result;
use fbo_core::{Airport, Fbo, NewFbo};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Counts of changes applied by [`sync_fbos`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Open an FBO at the airport with the given ICAO code.
pub async fn add_fbo(pool: &SqlitePool, icao: &str) -> Result<Fbo> {
    let icao = normalize_icao(icao);
    let mut tx = pool.begin().await?;

    let airport = get_airport_by_icao(&mut *tx, &icao)
        .await?
        .ok_or_else(|| StoreError::AirportNotFound(icao.clone()))?;
    if airport.has_fbo {
        return Err(StoreError::FboAlreadyExists(icao).into());
    }
    let new_fbo =
        NewFbo::for_airport(&airport).ok_or_else(|| StoreError::MissingCoordinates(icao.clone()))?;

    let id = insert_fbo(&mut *tx, &new_fbo).await?;
    set_has_fbo(&mut *tx, &airport.id, true).await?;
    tx.commit().await?;

    info!(icao = %icao, fbo_id = id, "FBO added");

    Ok(Fbo {
        id,
        airport_id: new_fbo.airport_id,
        icao: new_fbo.icao,
        name: new_fbo.name,
        latitude: new_fbo.latitude,
        longitude: new_fbo.longitude,
    })
}

/// Close the FBO at the airport with the given ICAO code.
///
/// Returns the host airport as it was before the change.
pub async fn remove_fbo(pool: &SqlitePool, icao: &str) -> Result<Airport> {
    let icao = normalize_icao(icao);
    let mut tx = pool.begin().await?;

    let airport = get_airport_by_icao(&mut *tx, &icao)
        .await?
        .ok_or_else(|| StoreError::AirportNotFound(icao.clone()))?;
    if !airport.has_fbo {
        return Err(StoreError::NoFbo(icao).into());
    }

    if !delete_fbo(&mut *tx, &airport.id).await? {
        warn!(icao = %icao, "Airport flagged with an FBO had no FBO row");
    }
    set_has_fbo(&mut *tx, &airport.id, false).await?;
    tx.commit().await?;

    info!(icao = %icao, "FBO removed");
    Ok(airport)
}

/// Mirror a remote FBO list into the store.
///
/// Host airports are upserted first. FBOs whose host is unknown locally and
/// remotely are skipped. `reported_hosts` lists the host airport ids of every
/// FBO the remote reported, including ones that could not be converted into
/// rows; stored FBOs at those airports are kept as they are. An empty remote
/// list changes nothing.
pub async fn sync_fbos(
    pool: &SqlitePool,
    remote_airports: &[Airport],
    remote_fbos: &[NewFbo],
    reported_hosts: &[String],
) -> Result<SyncSummary> {
    let mut summary = SyncSummary::default();
    if remote_fbos.is_empty() && reported_hosts.is_empty() {
        warn!("Remote FBO list is empty, leaving stored FBOs untouched");
        return Ok(summary);
    }

    let mut tx = pool.begin().await?;

    for airport in remote_airports {
        upsert_airport(&mut *tx, airport).await?;
    }

    let stored: HashMap<String, Fbo> = load_stored_fbos(&mut *tx)
        .await?
        .into_iter()
        .map(|fbo| (fbo.airport_id.clone(), fbo))
        .collect();
    let known_hosts: HashSet<&str> = remote_airports.iter().map(|a| a.id.as_str()).collect();
    let mut seen = HashSet::new();

    for remote in remote_fbos {
        if !seen.insert(remote.airport_id.clone()) {
            continue;
        }

        match stored.get(&remote.airport_id) {
            Some(existing) if same_details(existing, remote) => summary.unchanged += 1,
            Some(_) => {
                update_fbo(&mut *tx, remote).await?;
                summary.updated += 1;
            }
            None => {
                let host_exists = known_hosts.contains(remote.airport_id.as_str())
                    || get_airport_by_icao(&mut *tx, &remote.icao)
                        .await?
                        .is_some_and(|a| a.id == remote.airport_id);
                if !host_exists {
                    warn!(icao = %remote.icao, "Skipping FBO with unknown host airport");
                    seen.remove(&remote.airport_id);
                    continue;
                }
                insert_fbo(&mut *tx, remote).await?;
                summary.added += 1;
            }
        }
        set_has_fbo(&mut *tx, &remote.airport_id, true).await?;
    }

    let reported: HashSet<&str> = reported_hosts.iter().map(String::as_str).collect();
    for (airport_id, fbo) in &stored {
        if seen.contains(airport_id) {
            continue;
        }
        if reported.contains(airport_id.as_str()) {
            debug!(icao = %fbo.icao, "Keeping FBO reported without usable details");
            summary.unchanged += 1;
            continue;
        }
        delete_fbo(&mut *tx, airport_id).await?;
        set_has_fbo(&mut *tx, airport_id, false).await?;
        info!(icao = %fbo.icao, "FBO no longer present remotely");
        summary.removed += 1;
    }

    tx.commit().await?;

    info!(
        added = summary.added,
        updated = summary.updated,
        unchanged = summary.unchanged,
        removed = summary.removed,
        "FBO sync complete"
    );
    Ok(summary)
}

fn same_details(stored: &Fbo, remote: &NewFbo) -> bool {
    stored.icao == remote.icao
        && stored.name == remote.name
        && stored.latitude == remote.latitude
        && stored.longitude == remote.longitude
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airports::{load_fbo_airports, upsert_airport};
    use crate::db::init_database;
    use crate::fbos::load_fbos;

    fn store_error(err: &anyhow::Error) -> Option<&StoreError> {
        err.downcast_ref::<StoreError>()
    }

    async fn seeded() -> crate::Database {
        let db = init_database(":memory:", 1).await.unwrap();
        for airport in [
            Airport::new("a1", "KJFK", "John F Kennedy").at(40.64, -73.78),
            Airport::new("a2", "KLAX", "Los Angeles").at(33.94, -118.41),
            Airport::new("a3", "KXXX", "Nowhere"),
        ] {
            upsert_airport(db.pool(), &airport).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn add_then_remove_keeps_flag_consistent() {
        let db = seeded().await;

        let fbo = add_fbo(db.pool(), "kjfk").await.unwrap();
        assert_eq!(fbo.icao, "KJFK");
        assert_eq!(fbo.name, "John F Kennedy FBO");
        assert_eq!(load_fbo_airports(db.pool()).await.unwrap().len(), 1);
        assert_eq!(load_fbos(db.pool()).await.unwrap().len(), 1);

        let host = remove_fbo(db.pool(), "KJFK").await.unwrap();
        assert_eq!(host.id, "a1");
        assert!(load_fbo_airports(db.pool()).await.unwrap().is_empty());
        assert!(load_fbos(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_rejects_invalid_airports() {
        let db = seeded().await;

        let err = add_fbo(db.pool(), "ZZZZ").await.unwrap_err();
        assert_eq!(
            store_error(&err),
            Some(&StoreError::AirportNotFound("ZZZZ".to_string()))
        );

        let err = add_fbo(db.pool(), "KXXX").await.unwrap_err();
        assert_eq!(
            store_error(&err),
            Some(&StoreError::MissingCoordinates("KXXX".to_string()))
        );

        add_fbo(db.pool(), "KLAX").await.unwrap();
        let err = add_fbo(db.pool(), "KLAX").await.unwrap_err();
        assert_eq!(
            store_error(&err),
            Some(&StoreError::FboAlreadyExists("KLAX".to_string()))
        );
        assert_eq!(load_fbos(db.pool()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn remove_requires_existing_fbo() {
        let db = seeded().await;

        let err = remove_fbo(db.pool(), "KJFK").await.unwrap_err();
        assert_eq!(store_error(&err), Some(&StoreError::NoFbo("KJFK".to_string())));

        let err = remove_fbo(db.pool(), "ZZZZ").await.unwrap_err();
        assert_eq!(
            store_error(&err),
            Some(&StoreError::AirportNotFound("ZZZZ".to_string()))
        );
    }

    #[tokio::test]
    async fn sync_mirrors_remote_list() {
        let db = seeded().await;
        add_fbo(db.pool(), "KJFK").await.unwrap();
        add_fbo(db.pool(), "KLAX").await.unwrap();

        let denver = Airport::new("a4", "KDEN", "Denver").at(39.86, -104.67);
        let jfk = Airport::new("a1", "KJFK", "John F Kennedy").at(40.64, -73.78);
        let mut renamed_jfk = NewFbo::for_airport(&jfk).unwrap();
        renamed_jfk.name = "Empire Ops".to_string();
        let remote_fbos = vec![renamed_jfk, NewFbo::for_airport(&denver).unwrap()];

        let summary = sync_fbos(db.pool(), &[jfk, denver], &remote_fbos, &[])
            .await
            .unwrap();
        assert_eq!(
            summary,
            SyncSummary {
                added: 1,
                updated: 1,
                unchanged: 0,
                removed: 1,
            }
        );

        let fbos = load_fbos(db.pool()).await.unwrap();
        let icaos: Vec<&str> = fbos.iter().map(|f| f.icao.as_str()).collect();
        assert_eq!(icaos, vec!["KDEN", "KJFK"]);
        assert_eq!(fbos[1].name, "Empire Ops");

        let hosts = load_fbo_airports(db.pool()).await.unwrap();
        assert_eq!(hosts.len(), 2);

        let again = sync_fbos(db.pool(), &[], &remote_fbos, &[]).await.unwrap();
        assert_eq!(again.unchanged, 2);
        assert_eq!(again.added + again.updated + again.removed, 0);
    }

    #[tokio::test]
    async fn sync_skips_fbos_without_host() {
        let db = seeded().await;
        let orphan = NewFbo {
            airport_id: "missing".to_string(),
            icao: "ZZZZ".to_string(),
            name: "Ghost FBO".to_string(),
            latitude: 1.0,
            longitude: 1.0,
        };

        let summary = sync_fbos(db.pool(), &[], &[orphan], &[]).await.unwrap();
        assert_eq!(summary, SyncSummary::default());
        assert!(load_fbos(db.pool()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_remote_list_keeps_stored_fbos() {
        let db = seeded().await;
        add_fbo(db.pool(), "KJFK").await.unwrap();
        add_fbo(db.pool(), "KLAX").await.unwrap();

        let summary = sync_fbos(db.pool(), &[], &[], &[]).await.unwrap();
        assert_eq!(summary, SyncSummary::default());
        assert_eq!(load_fbos(db.pool()).await.unwrap().len(), 2);
        assert_eq!(load_fbo_airports(db.pool()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reported_fbos_without_details_are_kept() {
        let db = seeded().await;
        add_fbo(db.pool(), "KJFK").await.unwrap();
        add_fbo(db.pool(), "KLAX").await.unwrap();

        // KLAX is reported remotely but arrived without a usable airport payload.
        let jfk = Airport::new("a1", "KJFK", "John F Kennedy").at(40.64, -73.78);
        let remote_fbos = vec![NewFbo::for_airport(&jfk).unwrap()];
        let reported = vec!["a1".to_string(), "a2".to_string()];

        let summary = sync_fbos(db.pool(), &[jfk], &remote_fbos, &reported)
            .await
            .unwrap();
        assert_eq!(summary.removed, 0);
        assert_eq!(summary.unchanged, 2);

        let icaos: Vec<String> = load_fbos(db.pool())
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.icao)
            .collect();
        assert_eq!(icaos, vec!["KJFK", "KLAX"]);
        assert_eq!(load_fbo_airports(db.pool()).await.unwrap().len(), 2);
    }
}
