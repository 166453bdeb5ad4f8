//! Core data models for airports and the FBOs they host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, Located};

/// Largest airport size class reported by the metadata provider.
pub const MAX_AIRPORT_SIZE: u8 = 5;

/// Regulatory classification of a landing site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirportType {
    /// Aerodrome
    #[serde(rename = "AD")]
    Aerodrome,
    /// Aircraft Landing Area
    #[serde(rename = "ALA")]
    LandingArea,
}

impl AirportType {
    pub fn code(&self) -> &'static str {
        match self {
            AirportType::Aerodrome => "AD",
            AirportType::LandingArea => "ALA",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "AD" => Some(AirportType::Aerodrome),
            "ALA" => Some(AirportType::LandingArea),
            _ => None,
        }
    }
}

impl std::str::FromStr for AirportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AirportType::from_code(&s.trim().to_uppercase())
            .ok_or_else(|| format!("unknown airport type '{s}', expected AD or ALA"))
    }
}

impl std::fmt::Display for AirportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// An airport node that may host an FBO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub icao: String,
    pub name: String,
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub elevation_ft: Option<f64>,
    /// Size class, 0 (smallest) to 5
    #[serde(default)]
    pub size: Option<u8>,
    #[serde(default)]
    pub has_lights: bool,
    #[serde(default)]
    pub is_military: bool,
    #[serde(default)]
    pub is_basecamp: bool,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub airport_type: Option<AirportType>,
    #[serde(default)]
    pub has_fbo: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Airport {
    /// Create an airport with only identity fields set.
    pub fn new(id: impl Into<String>, icao: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            icao: icao.into(),
            name: name.into(),
            iata: None,
            city: None,
            state: None,
            country_code: String::new(),
            country_name: None,
            latitude: None,
            longitude: None,
            elevation_ft: None,
            size: None,
            has_lights: false,
            is_military: false,
            is_basecamp: false,
            display_name: None,
            airport_type: None,
            has_fbo: false,
            created_at: now,
            modified_at: now,
        }
    }

    /// Set the position.
    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lon);
        self
    }

    pub fn with_size(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_lights(mut self, has_lights: bool) -> Self {
        self.has_lights = has_lights;
        self
    }

    pub fn with_fbo(mut self, has_fbo: bool) -> Self {
        self.has_fbo = has_fbo;
        self
    }

    /// Name shown to users, preferring the provider's display name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

impl Located for Airport {
    fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

/// A persisted FBO with its host airport's coordinates copied alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fbo {
    pub id: i64,
    pub airport_id: String,
    pub icao: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Located for Fbo {
    fn position(&self) -> Option<GeoPoint> {
        Some(GeoPoint::new(self.latitude, self.longitude))
    }
}

/// An FBO that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFbo {
    pub airport_id: String,
    pub icao: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NewFbo {
    /// Build the default FBO for an airport, named after it.
    ///
    /// Returns `None` when the airport has no position.
    pub fn for_airport(airport: &Airport) -> Option<Self> {
        let position = airport.position()?;
        Some(Self {
            airport_id: airport.id.clone(),
            icao: airport.icao.clone(),
            name: format!("{} FBO", airport.name),
            latitude: position.lat,
            longitude: position.lon,
        })
    }
}
