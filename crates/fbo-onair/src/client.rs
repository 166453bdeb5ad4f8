//! OnAir API HTTP client.

use crate::models::{OaResponse, OnAirAirport, OnAirFbo};
use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Public OnAir API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://server1.onair.company/api";

const AUTH_HEADER: &str = "oa-apikey";

/// HTTP client for the OnAir company API.
pub struct OnAirClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OnAirClient {
    /// Create a client against the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            anyhow::bail!("ONAIR_API_KEY is not set");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
        })
    }

    /// Point the client at another deployment.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch an airport by ICAO code.
    pub async fn get_airport(&self, icao: &str) -> Result<OnAirAirport> {
        let icao = icao.trim().to_uppercase();
        let url = format!("{}/v1/airports/{}", self.base_url, icao);

        let airport: OnAirAirport = self.get_content(&url, "airport").await?;

        if airport.icao.trim().is_empty() {
            anyhow::bail!("Airport with ICAO {} not found in OnAir", icao);
        }
        if airport.name.trim().is_empty() {
            anyhow::bail!("Airport with ICAO {} has no name in OnAir", icao);
        }

        Ok(airport)
    }

    /// Fetch every FBO owned by a company.
    pub async fn get_company_fbos(&self, company_id: &str) -> Result<Vec<OnAirFbo>> {
        let url = format!("{}/v1/company/{}/fbos", self.base_url, company_id.trim());
        self.get_content(&url, "company FBOs").await
    }

    async fn get_content<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        debug!(url = %url, "OnAir request");

        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, &self.api_key)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", what))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "OnAir {} request failed: {} {}",
                what,
                status,
                body
            ));
        }

        let payload = response
            .json::<OaResponse<T>>()
            .await
            .with_context(|| format!("Failed to parse {} response", what))?;

        Ok(payload.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_api_key() {
        assert!(OnAirClient::new("  ").is_err());
    }

    #[test]
    fn base_url_is_normalised() {
        let client = OnAirClient::new("key")
            .unwrap()
            .with_base_url("http://localhost:8080/api/");
        assert_eq!(client.base_url(), "http://localhost:8080/api");

        let default = OnAirClient::new("key").unwrap();
        assert_eq!(default.base_url(), DEFAULT_BASE_URL);
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let client = OnAirClient::new("key")
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = client.get_airport("KJFK").await.unwrap_err();
        assert!(err.to_string().contains("Failed to fetch airport"));
    }
}
