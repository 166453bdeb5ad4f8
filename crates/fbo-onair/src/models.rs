//! OnAir API payloads and their conversion into network models.

use fbo_core::{Airport, NewFbo};
use serde::Deserialize;

/// Envelope wrapping every OnAir response body.
#[derive(Debug, Deserialize)]
pub struct OaResponse<T> {
    #[serde(rename = "Content")]
    pub content: T,
}

/// Airport as returned by `GET /v1/airports/{icao}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OnAirAirport {
    pub id: String,
    #[serde(rename = "ICAO")]
    pub icao: String,
    #[serde(rename = "IATA")]
    pub iata: Option<String>,
    pub name: String,
    pub state: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
    pub size: Option<i64>,
    pub is_military: bool,
    pub has_lights: bool,
    pub is_basecamp: bool,
    pub display_name: Option<String>,
}

/// Company FBO as returned by `GET /v1/company/{id}/fbos`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OnAirFbo {
    pub id: String,
    pub airport_id: String,
    pub name: String,
    pub airport: Option<OnAirAirport>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<OnAirAirport> for Airport {
    fn from(remote: OnAirAirport) -> Self {
        let mut airport = Airport::new(remote.id, remote.icao.trim().to_uppercase(), remote.name);
        airport.iata = non_empty(remote.iata);
        airport.state = non_empty(remote.state);
        airport.country_code = remote.country_code.unwrap_or_default();
        airport.country_name = non_empty(remote.country_name);
        airport.city = non_empty(remote.city);
        airport.latitude = remote.latitude;
        airport.longitude = remote.longitude;
        airport.elevation_ft = remote.elevation;
        airport.size = remote.size.and_then(|s| u8::try_from(s).ok());
        airport.is_military = remote.is_military;
        airport.has_lights = remote.has_lights;
        airport.is_basecamp = remote.is_basecamp;
        airport.display_name = non_empty(remote.display_name);
        airport
    }
}

impl OnAirFbo {
    /// Id of the airport hosting this FBO, if the payload names one.
    pub fn host_airport_id(&self) -> Option<&str> {
        self.airport
            .as_ref()
            .map(|a| a.id.as_str())
            .filter(|id| !id.is_empty())
            .or_else(|| Some(self.airport_id.as_str()).filter(|id| !id.is_empty()))
    }

    /// Split into the host airport and the FBO row to store.
    ///
    /// Returns `None` when the payload carries no positioned host airport.
    pub fn into_network(self) -> Option<(Airport, NewFbo)> {
        let mut airport = Airport::from(self.airport?);
        if airport.id.is_empty() {
            airport.id = self.airport_id;
        }
        let mut fbo = NewFbo::for_airport(&airport)?;
        if !self.name.trim().is_empty() {
            fbo.name = self.name;
        }
        airport.has_fbo = true;
        Some((airport, fbo))
    }
}
