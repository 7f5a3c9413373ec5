//! Sunrise Navigator - a smart alarm that wakes you with a morning briefing
//!
//! This library assembles commute traffic, weather, news headlines and a
//! motivational quote for the moment the alarm rings, and pulls the wake
//! time earlier when traffic is slow.

pub mod api;
pub mod briefing;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod models;
pub mod music;
pub mod news;
pub mod quote;
pub mod traffic;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use briefing::BriefingService;
pub use config::SunriseConfig;
pub use error::SunriseError;
pub use geocoding::AddressValidator;
pub use models::{
    AddressValidation, AlarmBriefing, AlarmSettings, BriefingData, MotivationalQuote, MusicTrack,
    NewsHeadline, TrafficData, WakeTime, WeatherData,
};
pub use music::MusicSearch;
pub use news::NewsClient;
pub use quote::{GeminiGenerator, QuoteGenerator, TextGenerator};
pub use traffic::TrafficClient;
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SunriseError>;
