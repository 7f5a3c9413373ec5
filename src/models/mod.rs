//! Data models for Sunrise Navigator
//!
//! This module contains the domain models organized by concern:
//! - Alarm: wake-up settings, wake time arithmetic and the sound catalogue
//! - Briefing: the per-ring snapshots handed to the front end
//! - Lookup: address validation and track search results

pub mod alarm;
pub mod briefing;
pub mod lookup;

// Re-export all public types for convenient access
pub use alarm::{ALARM_SOUNDS, AlarmSettings, AlarmSound, WakeTime};
pub use briefing::{
    AlarmBriefing, BriefingData, MotivationalQuote, NewsHeadline, TrafficData, WeatherData,
};
pub use lookup::{AddressValidation, MusicTrack};
