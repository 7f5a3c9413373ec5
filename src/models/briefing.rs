//! Briefing snapshots produced each time the alarm rings

use serde::{Deserialize, Serialize};

use super::WakeTime;

/// Commute estimate between home and destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficData {
    /// Total commute time in minutes, delay included
    pub commute_time: u32,
    /// Minutes lost to traffic, never more than `commute_time`
    pub delay: u32,
    /// Short label for the destination
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Current conditions at the weather location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Temperature in Celsius, rounded to the nearest degree
    pub temperature: i32,
    pub condition: String,
    pub location: String,
}

impl WeatherData {
    /// Format temperature the way the briefing card shows it
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°", self.temperature)
    }
}

/// A news headline; `id` is the article URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsHeadline {
    pub id: String,
    pub title: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotivationalQuote {
    pub quote: String,
    pub author: String,
}

/// Everything the morning briefing card needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingData {
    pub weather: WeatherData,
    pub traffic: TrafficData,
    pub news: Vec<NewsHeadline>,
}

/// Result of ringing the alarm: the briefing, a quote, and the wake time
/// pulled earlier by the traffic delay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmBriefing {
    pub briefing: BriefingData,
    pub quote: MotivationalQuote,
    pub alarm_time: WakeTime,
    pub adjusted_alarm_time: WakeTime,
}

impl AlarmBriefing {
    #[must_use]
    pub fn new(briefing: BriefingData, quote: MotivationalQuote, alarm_time: WakeTime) -> Self {
        let adjusted_alarm_time = alarm_time.earlier_by(briefing.traffic.delay);
        Self {
            briefing,
            quote,
            alarm_time,
            adjusted_alarm_time,
        }
    }
}
