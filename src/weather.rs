//! Weather API client for OpenWeatherMap current conditions
//!
//! Any failure, including a missing API key, yields a fixed simulated reading
//! so the briefing always has a weather card.

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::WeatherConfig;
use crate::http::{self, place_label};
use crate::models::WeatherData;
use crate::{Result, SunriseError};

const SERVICE: &str = "weather";

pub const FALLBACK_TEMPERATURE: i32 = 18;
pub const FALLBACK_CONDITION: &str = "Clear Skies (Simulated)";

/// Current-conditions client
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    #[must_use]
    pub fn new(client: Client, config: &WeatherConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Current weather at `location`, or the simulated reading on any failure.
    #[instrument(skip(self))]
    pub async fn current(&self, location: &str) -> WeatherData {
        match self.try_current(location).await {
            Ok(weather) => weather,
            Err(e) => {
                warn!("Weather lookup failed, using simulated reading: {}", e);
                Self::fallback(location)
            }
        }
    }

    /// Current weather at `location` from the live provider.
    pub async fn try_current(&self, location: &str) -> Result<WeatherData> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SunriseError::config("Missing OPENWEATHER_API_KEY"))?;

        let url = format!(
            "{}/weather?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(location),
            urlencoding::encode(api_key)
        );

        let response: CurrentWeatherResponse = http::get_json(&self.client, SERVICE, &url).await?;
        let weather = response.into_weather_data(location)?;

        info!(
            "Weather in {}: {} {}",
            weather.location,
            weather.format_temperature(),
            weather.condition
        );
        Ok(weather)
    }

    /// The fixed reading used whenever live weather is unavailable
    #[must_use]
    pub fn fallback(location: &str) -> WeatherData {
        WeatherData {
            temperature: FALLBACK_TEMPERATURE,
            condition: FALLBACK_CONDITION.to_string(),
            location: place_label(location).unwrap_or("Unknown").to_string(),
        }
    }
}

/// `OpenWeatherMap` `/weather` response, reduced to the fields we read
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: Option<String>,
    main: MainReadings,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
}

impl CurrentWeatherResponse {
    fn into_weather_data(self, query: &str) -> Result<WeatherData> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .map(|c| c.main)
            .ok_or_else(|| SunriseError::api("Weather response has no conditions"))?;

        if !self.main.temp.is_finite() {
            return Err(SunriseError::api("Weather response has no usable temperature"));
        }

        let location = self
            .name
            .filter(|name| !name.trim().is_empty())
            .or_else(|| place_label(query).map(str::to_string))
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(WeatherData {
            temperature: self.main.temp.round() as i32,
            condition,
            location,
        })
    }
}
