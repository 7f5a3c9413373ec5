//! Address validation through the Google geocoding API
//!
//! Unlike the briefing clients, a missing API key is surfaced as a
//! configuration error; the caller decides how to report it.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::MapsConfig;
use crate::http;
use crate::models::AddressValidation;
use crate::{Result, SunriseError};

const SERVICE: &str = "geocoding";

#[derive(Debug, Clone)]
pub struct AddressValidator {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl AddressValidator {
    #[must_use]
    pub fn new(client: Client, maps: &MapsConfig) -> Self {
        Self {
            client,
            api_key: maps.api_key.clone(),
            base_url: maps.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Check that `address` resolves to a real place.
    ///
    /// Fails only when the maps key is missing; provider or network trouble
    /// reports the address as invalid.
    #[instrument(skip(self))]
    pub async fn validate(&self, address: &str) -> Result<AddressValidation> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SunriseError::config("GOOGLE_MAPS_API_KEY is not defined"))?;

        if address.trim().is_empty() {
            return Err(SunriseError::validation("Address cannot be empty"));
        }

        let url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            urlencoding::encode(api_key)
        );

        let response: GeocodeResponse = match http::get_json(&self.client, SERVICE, &url).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Geocoding failed for '{}': {}", address, e);
                return Ok(AddressValidation::invalid());
            }
        };

        if response.status != "OK" {
            debug!("Geocoding status {} for '{}'", response.status, address);
            return Ok(AddressValidation::invalid());
        }

        match response.results.into_iter().next() {
            Some(best) => {
                info!("Validated '{}' as '{}'", address, best.formatted_address);
                Ok(AddressValidation {
                    is_valid: true,
                    formatted_address: Some(best.formatted_address),
                })
            }
            None => Ok(AddressValidation::invalid()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
}
