//! Subcommand handlers.

use anyhow::{Context, Result};
use fbo_core::{
    analyze_distances, Airport, AnalysisError, CandidateScorer, NetworkMetrics, RedundancyAnalyzer,
};
use fbo_onair::{OnAirClient, OnAirFbo};
use fbo_store::{init_database, AirportEdit, Database, StoreError, SyncSummary};
use serde::Serialize;
use std::fmt::Display;
use tracing::{debug, info};

use crate::config::Config;
use crate::{Cli, Command};

pub async fn run(cli: Cli, config: &Config) -> Result<()> {
    let db_path = config.db_path.to_string_lossy();
    let db = init_database(&db_path, 1)
        .await
        .with_context(|| format!("Failed to open database at {}", db_path))?;
    let json = cli.json;

    debug!(command = ?cli.command, "Running command");

    match cli.command {
        Command::List => list(&db, json).await,
        Command::Metrics => metrics(&db, config, json).await,
        Command::Distances => distances(&db, config, json).await,
        Command::Optimal => optimal(&db, config, json).await,
        Command::Redundant => redundant(&db, config, json).await,
        Command::Add {
            icao,
            country_code,
            airport_type,
        } => {
            let edit = AirportEdit {
                country_code,
                airport_type,
                ..AirportEdit::default()
            };
            resolve_airport(&db, config, &icao, &edit).await?;
            let fbo = fbo_store::add_fbo(db.pool(), &icao).await?;
            emit(json, &fbo, || {
                format!("Added {} at {} ({:.4}, {:.4})", fbo.name, fbo.icao, fbo.latitude, fbo.longitude)
            })
        }
        Command::Modify { icao, fields } => {
            let airport = resolve_airport(&db, config, &icao, &fields.into()).await?;
            emit(json, &airport, || airport_details(&airport))
        }
        Command::Remove { icao } => {
            let airport = fbo_store::remove_fbo(db.pool(), &icao).await?;
            emit(json, &airport, || {
                format!("Removed FBO at {} ({})", airport.icao, airport.label())
            })
        }
        Command::Search { text } => {
            let airports = fbo_store::search_airports(db.pool(), &text).await?;
            emit(json, &airports, || airport_table(&airports))
        }
        Command::Import { icao } => import(&db, config, &icao, json).await,
        Command::Sync => sync(&db, config, json).await,
    }
}

/// Print `value` as JSON or as the text produced by `text`.
fn emit<T, F>(json: bool, value: &T, text: F) -> Result<()>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn emit_report<T: Serialize + Display>(json: bool, report: &T) -> Result<()> {
    emit(json, report, || report.to_string())
}

/// Report an insufficient-data error as a friendly note; propagate anything else.
fn emit_analysis<T: Serialize + Display>(
    json: bool,
    result: Result<T, AnalysisError>,
) -> Result<()> {
    match result {
        Ok(report) => emit_report(json, &report),
        Err(err) if err.is_insufficient_data() => {
            let note = serde_json::json!({ "status": "insufficient", "message": err.to_string() });
            emit(json, &note, || format!("Not enough data: {}", err))
        }
        Err(err) => Err(err.into()),
    }
}

fn airport_table(airports: &[Airport]) -> String {
    if airports.is_empty() {
        return "No airports found.".to_string();
    }
    let mut lines = vec![format!("{:<6} {:<5} {:<40} {:>4} {:>6}", "ICAO", "IATA", "Name", "Size", "FBO")];
    for airport in airports {
        lines.push(format!(
            "{:<6} {:<5} {:<40} {:>4} {:>6}",
            airport.icao,
            airport.iata.as_deref().unwrap_or("-"),
            airport.label(),
            airport.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            if airport.has_fbo { "yes" } else { "" }
        ));
    }
    lines.join("\n")
}

fn airport_details(airport: &Airport) -> String {
    let or_unset = |value: Option<&str>| value.unwrap_or("Not set").to_string();
    let position = match (airport.latitude, airport.longitude) {
        (Some(lat), Some(lon)) => format!("{lat:.4}, {lon:.4}"),
        _ => "Not set".to_string(),
    };
    [
        format!("Airport: {} ({}) in {}", airport.name, airport.icao, airport.country_code),
        format!("Country Name: {}", or_unset(airport.country_name.as_deref())),
        format!("State: {}", or_unset(airport.state.as_deref())),
        format!("City: {}", or_unset(airport.city.as_deref())),
        format!("Position: {position}"),
        format!(
            "Airport Type: {}",
            airport
                .airport_type
                .map(|t| t.to_string())
                .unwrap_or_else(|| "Not set".to_string())
        ),
    ]
    .join("\n")
}

async fn list(db: &Database, json: bool) -> Result<()> {
    let fbos = fbo_store::load_fbos(db.pool()).await?;
    emit(json, &fbos, || {
        if fbos.is_empty() {
            return "No FBOs found.".to_string();
        }
        let mut lines = vec![format!("FBOs ({}):", fbos.len())];
        for fbo in &fbos {
            lines.push(format!(
                "  {:<6} {:<40} ({:.4}, {:.4})",
                fbo.icao, fbo.name, fbo.latitude, fbo.longitude
            ));
        }
        lines.join("\n")
    })
}

async fn metrics(db: &Database, config: &Config, json: bool) -> Result<()> {
    let fbo_airports = fbo_store::load_fbo_airports(db.pool()).await?;
    let result = NetworkMetrics::calculate(&fbo_airports, config.rules.optimal_distance_nm);
    emit_analysis(json, result)
}

async fn distances(db: &Database, config: &Config, json: bool) -> Result<()> {
    let fbos = fbo_store::load_fbos(db.pool()).await?;
    let result = analyze_distances(&fbos, config.rules.cluster_radius_nm);
    emit_analysis(json, result)
}

async fn optimal(db: &Database, config: &Config, json: bool) -> Result<()> {
    let airports = fbo_store::load_all_airports(db.pool()).await?;
    let fbo_airports: Vec<Airport> = airports.iter().filter(|a| a.has_fbo).cloned().collect();

    let analysis = CandidateScorer::new(config.rules.clone()).analyze(&airports, &fbo_airports);
    emit_report(json, &analysis)
}

async fn redundant(db: &Database, config: &Config, json: bool) -> Result<()> {
    let fbo_airports = fbo_store::load_fbo_airports(db.pool()).await?;
    let analysis = RedundancyAnalyzer::new(config.rules.clone()).analyze(&fbo_airports);
    emit_report(json, &analysis)
}

fn onair_client(config: &Config) -> Result<OnAirClient> {
    let api_key = config
        .onair_api_key
        .as_deref()
        .context("ONAIR_API_KEY is not set in the environment")?;
    Ok(OnAirClient::new(api_key)?.with_base_url(config.onair_base_url.as_str()))
}

/// Load an airport, fetching it from OnAir and storing it when it is not
/// known locally. `edit` is applied either way.
async fn resolve_airport(
    db: &Database,
    config: &Config,
    icao: &str,
    edit: &AirportEdit,
) -> Result<Airport> {
    if let Some(airport) = fbo_store::get_airport_by_icao(db.pool(), icao).await? {
        if edit.is_empty() {
            return Ok(airport);
        }
        return fbo_store::modify_airport(db.pool(), icao, edit).await;
    }

    info!(icao = %icao, "Airport not stored locally, fetching from OnAir");
    let client = onair_client(config)?;
    let mut airport = Airport::from(client.get_airport(icao).await?);
    edit.apply(&mut airport)?;
    if airport.country_code.trim().is_empty() {
        return Err(StoreError::MissingCountryCode(airport.icao.clone()))
            .context("OnAir has no country code for this airport; pass --country-code");
    }

    fbo_store::upsert_airport(db.pool(), &airport).await?;
    info!(icao = %airport.icao, "Airport fetched and stored");
    Ok(airport)
}

async fn import(db: &Database, config: &Config, icao: &str, json: bool) -> Result<()> {
    let client = onair_client(config)?;
    let remote = client.get_airport(icao).await?;
    let airport = Airport::from(remote);

    fbo_store::upsert_airport(db.pool(), &airport).await?;
    let stored = fbo_store::get_airport_by_icao(db.pool(), &airport.icao)
        .await?
        .with_context(|| format!("Airport {} missing after import", airport.icao))?;

    info!(icao = %stored.icao, "Airport imported");
    emit(json, &stored, || {
        format!("Imported {} ({})", stored.icao, stored.label())
    })
}

async fn sync(db: &Database, config: &Config, json: bool) -> Result<()> {
    let client = onair_client(config)?;
    let company_id = config
        .onair_company_id
        .as_deref()
        .context("ONAIR_COMPANY_ID is not set in the environment")?;

    let remote = client.get_company_fbos(company_id).await?;
    if remote.is_empty() {
        return emit(json, &SyncSummary::default(), || {
            "No FBOs found for the company.".to_string()
        });
    }
    let reported: Vec<String> = remote
        .iter()
        .filter_map(OnAirFbo::host_airport_id)
        .map(str::to_string)
        .collect();
    let fetched = remote.len();
    let (airports, fbos): (Vec<_>, Vec<_>) =
        remote.into_iter().filter_map(OnAirFbo::into_network).unzip();
    if fbos.len() < fetched {
        info!(
            skipped = fetched - fbos.len(),
            "Remote FBOs without a positioned airport are kept as stored"
        );
    }

    let summary = fbo_store::sync_fbos(db.pool(), &airports, &fbos, &reported).await?;
    emit(json, &summary, || {
        format!(
            "Synced {} FBOs: {} added, {} updated, {} unchanged, {} removed",
            fbos.len(),
            summary.added,
            summary.updated,
            summary.unchanged,
            summary.removed
        )
    })
}
