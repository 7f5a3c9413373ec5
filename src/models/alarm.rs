//! Alarm settings, wake time arithmetic and the built-in sound catalogue

use chrono::{NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::SunriseError;

/// Minimum length of a free-text address or location after trimming
const MIN_PLACE_LEN: usize = 3;

/// Wake-up time of day, rendered as `HH:MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WakeTime(NaiveTime);

impl WakeTime {
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    #[must_use]
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Move the wake time earlier by `minutes`, wrapping past midnight.
    #[must_use]
    pub fn earlier_by(&self, minutes: u32) -> Self {
        let (time, _) = self
            .0
            .overflowing_sub_signed(TimeDelta::minutes(i64::from(minutes)));
        Self(time)
    }
}

impl FromStr for WakeTime {
    type Err = SunriseError;

    /// Accepts `H:MM` or `HH:MM`, hours 0-23 and minutes 00-59.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SunriseError::validation(format!("Invalid time format (HH:MM): '{s}'"));

        let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

        if !(1..=2).contains(&hours.len()) || minutes.len() != 2 {
            return Err(invalid());
        }
        if !all_digits(hours) || !all_digits(minutes) {
            return Err(invalid());
        }

        let hours: u32 = hours.parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;

        NaiveTime::from_hms_opt(hours, minutes, 0)
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl TryFrom<String> for WakeTime {
    type Error = SunriseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WakeTime> for String {
    fn from(value: WakeTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for WakeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// A selectable alarm sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlarmSound {
    pub name: &'static str,
    pub url: &'static str,
}

/// Built-in alarm sounds; the first one is the default
pub const ALARM_SOUNDS: [AlarmSound; 5] = [
    AlarmSound {
        name: "Classic Alarm",
        url: "https://actions.google.com/sounds/v1/alarms/alarm_clock.ogg",
    },
    AlarmSound {
        name: "Digital Clock",
        url: "https://actions.google.com/sounds/v1/alarms/digital_clock.ogg",
    },
    AlarmSound {
        name: "Bugle Call",
        url: "https://actions.google.com/sounds/v1/alarms/bugle_tune.ogg",
    },
    AlarmSound {
        name: "Pleasant Bell",
        url: "https://actions.google.com/sounds/v1/alarms/medium_bell_ringing_near.ogg",
    },
    AlarmSound {
        name: "Gentle Wake-up",
        url: "https://actions.google.com/sounds/v1/alarms/gentle_soft_ring.ogg",
    },
];

/// Settings submitted by the user when setting the alarm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSettings {
    /// Wake time as `HH:MM`
    pub time: String,
    /// Commute origin
    pub home: String,
    /// Commute destination
    pub destination: String,
    /// URL of the sound to play when the alarm rings
    pub alarm_sound: String,
    /// Free-text location used for the weather query
    pub weather_location: String,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            time: "07:00".to_string(),
            home: "1600 Amphitheatre Parkway, Mountain View, CA".to_string(),
            destination: "1 Market St, San Francisco, CA".to_string(),
            alarm_sound: ALARM_SOUNDS[0].url.to_string(),
            weather_location: "San Francisco, CA".to_string(),
        }
    }
}

impl AlarmSettings {
    /// Check every field and return the parsed wake time.
    pub fn validate(&self) -> Result<WakeTime, SunriseError> {
        let wake_time: WakeTime = self.time.parse()?;

        let places = [
            ("Home location", &self.home),
            ("Destination", &self.destination),
            ("Weather location", &self.weather_location),
        ];
        for (label, value) in places {
            if value.trim().chars().count() < MIN_PLACE_LEN {
                return Err(SunriseError::validation(format!("{label} is required")));
            }
        }

        url::Url::parse(&self.alarm_sound)
            .map_err(|_| SunriseError::validation("Please select an alarm sound"))?;

        Ok(wake_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("07:00", 7, 0)]
    #[case("7:05", 7, 5)]
    #[case("00:00", 0, 0)]
    #[case("23:59", 23, 59)]
    #[case("19:30", 19, 30)]
    fn test_wake_time_parses(#[case] input: &str, #[case] hour: u32, #[case] minute: u32) {
        let time: WakeTime = input.parse().unwrap();
        assert_eq!(time.hour(), hour);
        assert_eq!(time.minute(), minute);
    }

    #[rstest]
    #[case("24:00")]
    #[case("7:60")]
    #[case("7:5")]
    #[case("007:00")]
    #[case("07-00")]
    #[case("")]
    #[case("ab:cd")]
    #[case("+7:00")]
    fn test_wake_time_rejects(#[case] input: &str) {
        let err = input.parse::<WakeTime>().unwrap_err();
        assert!(matches!(err, SunriseError::Validation { .. }));
    }

    #[rstest]
    #[case("07:00", 15, "06:45")]
    #[case("07:00", 0, "07:00")]
    #[case("00:10", 15, "23:55")]
    #[case("06:30", 90, "05:00")]
    fn test_earlier_by(#[case] start: &str, #[case] minutes: u32, #[case] expected: &str) {
        let time: WakeTime = start.parse().unwrap();
        assert_eq!(time.earlier_by(minutes).to_string(), expected);
    }

    #[test]
    fn test_wake_time_serde_as_string() {
        let time: WakeTime = "6:05".parse().unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"06:05\"");

        let back: WakeTime = serde_json::from_str("\"06:05\"").unwrap();
        assert_eq!(back, time);
        assert!(serde_json::from_str::<WakeTime>("\"25:00\"").is_err());
    }

    #[test]
    fn test_default_settings_are_valid() {
        let settings = AlarmSettings::default();
        let wake = settings.validate().unwrap();
        assert_eq!(wake.to_string(), "07:00");
    }

    #[test]
    fn test_settings_reject_short_places_and_bad_sound() {
        let mut settings = AlarmSettings::default();
        settings.home = " ab ".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("Home location is required"));

        let mut settings = AlarmSettings::default();
        settings.alarm_sound = "not a url".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("alarm sound"));
    }

    #[test]
    fn test_settings_json_is_camel_case() {
        let json = serde_json::to_value(AlarmSettings::default()).unwrap();
        assert!(json.get("weatherLocation").is_some());
        assert!(json.get("alarmSound").is_some());
    }
}
