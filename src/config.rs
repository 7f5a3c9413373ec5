//! Configuration management for Sunrise Navigator
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SunriseError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Headroom on top of the upstream budget for handling a served request
const SERVER_SLACK: Duration = Duration::from_secs(5);

/// Root configuration structure for Sunrise Navigator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SunriseConfig {
    /// Google Maps (geocoding and distance matrix)
    #[serde(default)]
    pub maps: MapsConfig,
    /// OpenWeatherMap
    #[serde(default)]
    pub weather: WeatherConfig,
    /// NewsAPI
    #[serde(default)]
    pub news: NewsConfig,
    /// Generative text service used for quotes
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Track search
    #[serde(default)]
    pub music: MusicConfig,
    /// Traffic suggestion policy
    #[serde(default)]
    pub traffic: TrafficConfig,
    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Google Maps API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapsConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_maps_base_url")]
    pub base_url: String,
}

/// Weather API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// A single headline query: a category, a keyword, or both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// News API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
    /// ISO 3166-1 country code passed to top-headlines
    #[serde(default = "default_news_country")]
    pub country: String,
    /// Queries fetched one article each before general filler
    #[serde(default = "default_news_queries")]
    pub queries: Vec<NewsQuery>,
}

/// Text generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_generator_base_url")]
    pub base_url: String,
    #[serde(default = "default_generator_model")]
    pub model: String,
    /// Topic used when the alarm rings
    #[serde(default = "default_quote_topic")]
    pub default_topic: String,
}

/// Which track search backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MusicProvider {
    Deezer,
    Audius,
}

/// Track search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicConfig {
    #[serde(default = "default_music_provider")]
    pub provider: MusicProvider,
    #[serde(default = "default_deezer_base_url")]
    pub deezer_base_url: String,
    #[serde(default = "default_audius_base_url")]
    pub audius_base_url: String,
}

/// Traffic suggestion thresholds, in minutes of delay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficConfig {
    /// At or above this delay the briefing notes that traffic is slow
    #[serde(default = "default_slow_threshold")]
    pub slow_threshold_minutes: u32,
    /// Above this delay the briefing suggests leaving earlier
    #[serde(default = "default_leave_early_threshold")]
    pub leave_early_threshold_minutes: u32,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for a single HTTP request
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Deadline for one client call during briefing assembly; a client may
    /// issue more than one request (news filler), so this exceeds the timeout
    #[serde(default = "default_call_deadline")]
    pub call_deadline_seconds: u64,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Pre-built front end served for non-API paths
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_maps_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_news_country() -> String {
    "in".to_string()
}

fn default_news_queries() -> Vec<NewsQuery> {
    vec![
        NewsQuery {
            category: Some("technology".to_string()),
            q: None,
        },
        NewsQuery {
            category: Some("entertainment".to_string()),
            q: Some("movies".to_string()),
        },
        NewsQuery {
            category: None,
            q: Some("Kerala".to_string()),
        },
    ]
}

fn default_generator_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_generator_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_quote_topic() -> String {
    "morning productivity".to_string()
}

fn default_music_provider() -> MusicProvider {
    MusicProvider::Deezer
}

fn default_deezer_base_url() -> String {
    "https://api.deezer.com".to_string()
}

fn default_audius_base_url() -> String {
    "https://discoveryprovider.audius.co/v1".to_string()
}

fn default_slow_threshold() -> u32 {
    5
}

fn default_leave_early_threshold() -> u32 {
    10
}

fn default_request_timeout() -> u64 {
    10
}

fn default_call_deadline() -> u64 {
    25
}

fn default_server_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_maps_base_url(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_news_base_url(),
            country: default_news_country(),
            queries: default_news_queries(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_generator_base_url(),
            model: default_generator_model(),
            default_topic: default_quote_topic(),
        }
    }
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            provider: default_music_provider(),
            deezer_base_url: default_deezer_base_url(),
            audius_base_url: default_audius_base_url(),
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            slow_threshold_minutes: default_slow_threshold(),
            leave_early_threshold_minutes: default_leave_early_threshold(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: default_request_timeout(),
            call_deadline_seconds: default_call_deadline(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    #[must_use]
    pub fn call_deadline(&self) -> Duration {
        Duration::from_secs(self.call_deadline_seconds)
    }

    /// Timeout for a whole served request. A ring waits for traffic, then
    /// for weather and news, so it may spend two call deadlines upstream
    /// before it assembles the fallback briefing.
    #[must_use]
    pub fn server_timeout(&self) -> Duration {
        self.call_deadline() * 2 + self.request_timeout() + SERVER_SLACK
    }
}

impl SunriseConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SUNRISE_WEATHER__API_KEY and friends
        builder = builder.add_source(
            Environment::with_prefix("SUNRISE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SunriseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_keys(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sunrise-navigator").join("config.toml"))
    }

    /// Fill API keys that are still unset from the conventional variables
    /// (`GOOGLE_MAPS_API_KEY`, `OPENWEATHER_API_KEY`, `NEWS_API_KEY`, `GEMINI_API_KEY`).
    pub fn apply_env_keys<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, names: &[&str]| {
            if slot.as_deref().is_some_and(|k| !k.is_empty()) {
                return;
            }
            *slot = names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty());
        };

        fill(&mut self.maps.api_key, &["GOOGLE_MAPS_API_KEY"]);
        fill(
            &mut self.weather.api_key,
            &["OPENWEATHER_API_KEY", "WEATHER_API_KEY"],
        );
        fill(&mut self.news.api_key, &["NEWS_API_KEY"]);
        fill(
            &mut self.generator.api_key,
            &["GEMINI_API_KEY", "GOOGLE_API_KEY", "GOOGLE_GENAI_API_KEY"],
        );
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.maps.base_url.is_empty() {
            self.maps.base_url = default_maps_base_url();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.news.base_url.is_empty() {
            self.news.base_url = default_news_base_url();
        }
        if self.news.country.is_empty() {
            self.news.country = default_news_country();
        }
        if self.generator.base_url.is_empty() {
            self.generator.base_url = default_generator_base_url();
        }
        if self.generator.model.is_empty() {
            self.generator.model = default_generator_model();
        }
        if self.http.request_timeout_seconds == 0 {
            self.http.request_timeout_seconds = default_request_timeout();
        }
        if self.http.call_deadline_seconds == 0 {
            self.http.call_deadline_seconds = default_call_deadline();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Keys are optional, but a provided key must look plausible
    pub fn validate_api_keys(&self) -> Result<()> {
        let keys = [
            ("Maps", &self.maps.api_key),
            ("Weather", &self.weather.api_key),
            ("News", &self.news.api_key),
            ("Generator", &self.generator.api_key),
        ];

        for (name, key) in keys {
            let Some(key) = key else { continue };

            if key.is_empty() {
                return Err(SunriseError::config(format!(
                    "{name} API key cannot be empty if provided. Either remove it or provide a valid key."
                ))
                .into());
            }

            if key.len() < 8 {
                return Err(SunriseError::config(format!(
                    "{name} API key appears to be invalid (too short). Please check your API key."
                ))
                .into());
            }

            if key.len() > 200 {
                return Err(SunriseError::config(format!(
                    "{name} API key appears to be invalid (too long). Please check your API key."
                ))
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http.request_timeout_seconds > 300 {
            return Err(
                SunriseError::config("HTTP request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.http.call_deadline_seconds < self.http.request_timeout_seconds {
            return Err(SunriseError::config(
                "Call deadline cannot be shorter than the HTTP request timeout",
            )
            .into());
        }

        if self.traffic.slow_threshold_minutes > self.traffic.leave_early_threshold_minutes {
            return Err(SunriseError::config(
                "Traffic slow threshold cannot exceed the leave-early threshold",
            )
            .into());
        }

        if self.news.queries.len() > 5 {
            return Err(SunriseError::config("At most 5 news queries can be configured").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SunriseError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SunriseError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Maps", &self.maps.base_url),
            ("Weather", &self.weather.base_url),
            ("News", &self.news.base_url),
            ("Generator", &self.generator.base_url),
            ("Deezer", &self.music.deezer_base_url),
            ("Audius", &self.music.audius_base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SunriseError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
