//! Commute estimates from the Google distance-matrix API, with a simulated
//! estimate whenever the live path is unavailable.

use anyhow::anyhow;
use rand::RngExt;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::{MapsConfig, TrafficConfig};
use crate::http::{self, place_label};
use crate::models::TrafficData;
use crate::{Result, SunriseError};

const SERVICE: &str = "distance matrix";
const DEFAULT_DESTINATION_LABEL: &str = "Workville";

/// Traffic client for the commute between home and destination
#[derive(Debug, Clone)]
pub struct TrafficClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    policy: TrafficConfig,
}

impl TrafficClient {
    #[must_use]
    pub fn new(client: Client, maps: &MapsConfig, policy: &TrafficConfig) -> Self {
        Self {
            client,
            api_key: maps.api_key.clone(),
            base_url: maps.base_url.trim_end_matches('/').to_string(),
            policy: policy.clone(),
        }
    }

    /// Current commute, falling back to a simulated estimate on any failure.
    #[instrument(skip(self))]
    pub async fn commute(&self, origin: &str, destination: &str) -> TrafficData {
        match self.try_commute(origin, destination).await {
            Ok(traffic) => traffic,
            Err(e) => {
                warn!("Traffic lookup failed, using simulated estimate: {}", e);
                self.simulated(destination)
            }
        }
    }

    /// Current commute from the live provider.
    pub async fn try_commute(&self, origin: &str, destination: &str) -> Result<TrafficData> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SunriseError::config("Missing GOOGLE_MAPS_API_KEY"))?;

        let url = format!(
            "{}/distancematrix/json?origins={}&destinations={}&departure_time=now&key={}",
            self.base_url,
            urlencoding::encode(origin),
            urlencoding::encode(destination),
            urlencoding::encode(api_key)
        );

        let response: ApiResponse = http::get_json(&self.client, SERVICE, &url).await?;
        let (commute_time, delay) = response
            .commute_minutes()
            .map_err(|e| SunriseError::api(e.to_string()))?;

        info!(
            "Commute to {} is {} min ({} min delay)",
            destination, commute_time, delay
        );
        Ok(self.traffic_data(destination, commute_time, delay))
    }

    /// Randomised estimate: 20-40 min base, and a 60% chance of 5-30 min delay.
    #[must_use]
    pub fn simulated(&self, destination: &str) -> TrafficData {
        let mut rng = rand::rng();
        let base: u32 = rng.random_range(20..40);
        let delay: u32 = if rng.random_bool(0.6) {
            rng.random_range(5..30)
        } else {
            0
        };
        info!("Simulated commute to {}: {} min base, {} min delay", destination, base, delay);
        self.traffic_data(destination, base + delay, delay)
    }

    fn traffic_data(&self, destination: &str, commute_time: u32, delay: u32) -> TrafficData {
        TrafficData {
            commute_time,
            delay,
            destination: place_label(destination)
                .unwrap_or(DEFAULT_DESTINATION_LABEL)
                .to_string(),
            suggestion: self.suggestion(delay),
        }
    }

    /// Suggestion text for a given delay: a nudge to leave early above the
    /// leave-early threshold, a note from the slow threshold up, else nothing.
    #[must_use]
    pub fn suggestion(&self, delay: u32) -> Option<String> {
        if delay > self.policy.leave_early_threshold_minutes {
            Some(format!(
                "Traffic is heavier than usual ({delay} min delay). You might want to leave a bit early to stay on schedule."
            ))
        } else if delay >= self.policy.slow_threshold_minutes {
            Some(format!("Traffic is a bit slow this morning ({delay} min delay)."))
        } else {
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct DurationValue {
    /// Seconds
    value: u64,
}

#[derive(Debug, Deserialize)]
struct Element {
    status: String,
    duration: Option<DurationValue>,
    duration_in_traffic: Option<DurationValue>,
}

#[derive(Debug, Deserialize)]
struct Row {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    rows: Vec<Row>,
}

impl ApiResponse {
    /// `(commute, delay)` in whole minutes; delay is floored at zero.
    fn commute_minutes(&self) -> anyhow::Result<(u32, u32)> {
        if self.status != "OK" {
            return Err(anyhow!("Distance matrix status {}", self.status));
        }

        let element = self
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or(anyhow!("No route elements in response"))?;

        if element.status != "OK" {
            return Err(anyhow!("Route element status {}", element.status));
        }

        let free_flow = element
            .duration
            .as_ref()
            .map(|d| d.value)
            .ok_or(anyhow!("Route has no duration"))?;
        let with_traffic = element
            .duration_in_traffic
            .as_ref()
            .map_or(free_flow, |d| d.value);

        let delay = with_traffic.saturating_sub(free_flow);
        Ok((to_minutes(with_traffic), to_minutes(delay)))
    }
}

fn to_minutes(seconds: u64) -> u32 {
    u32::try_from(seconds.saturating_add(30) / 60).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORIGIN: &str = "1600 Amphitheatre Parkway, Mountain View, CA";
    const DESTINATION: &str = "1 Market St, San Francisco, CA";

    fn client(base_url: &str, api_key: Option<&str>) -> TrafficClient {
        let maps = MapsConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
        };
        TrafficClient::new(
            http::build_client(Duration::from_secs(5)).unwrap(),
            &maps,
            &TrafficConfig::default(),
        )
    }

    fn matrix(free_flow: u64, with_traffic: u64) -> serde_json::Value {
        serde_json::json!({
            "status": "OK",
            "rows": [{
                "elements": [{
                    "status": "OK",
                    "duration": {"value": free_flow, "text": ""},
                    "duration_in_traffic": {"value": with_traffic, "text": ""}
                }]
            }]
        })
    }

    #[tokio::test]
    async fn test_live_commute() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/distancematrix/json"))
            .and(query_param("origins", ORIGIN))
            .and(query_param("destinations", DESTINATION))
            .and(query_param("departure_time", "now"))
            .and(query_param("key", "test-maps-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(matrix(2400, 3120)))
            .mount(&server)
            .await;

        let traffic = client(&server.uri(), Some("test-maps-key"))
            .try_commute(ORIGIN, DESTINATION)
            .await
            .unwrap();

        assert_eq!(traffic.commute_time, 52);
        assert_eq!(traffic.delay, 12);
        assert_eq!(traffic.destination, "1 Market St");
        assert!(traffic.suggestion.unwrap().contains("leave a bit early"));
    }

    #[tokio::test]
    async fn test_faster_than_usual_floors_delay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(matrix(1800, 1500)))
            .mount(&server)
            .await;

        let traffic = client(&server.uri(), Some("test-maps-key"))
            .try_commute(ORIGIN, DESTINATION)
            .await
            .unwrap();
        assert_eq!(traffic.commute_time, 25);
        assert_eq!(traffic.delay, 0);
        assert!(traffic.suggestion.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_config_error_and_commute_simulates() {
        let traffic_client = client("http://127.0.0.1:9", None);
        let err = traffic_client.try_commute(ORIGIN, DESTINATION).await.unwrap_err();
        assert!(matches!(err, SunriseError::Config { .. }));

        let traffic = traffic_client.commute(ORIGIN, DESTINATION).await;
        assert!(traffic.commute_time >= traffic.delay);
        assert_eq!(traffic.destination, "1 Market St");
    }

    #[tokio::test]
    async fn test_not_found_route_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "rows": [{"elements": [{"status": "NOT_FOUND"}]}]
            })))
            .mount(&server)
            .await;

        let traffic_client = client(&server.uri(), Some("test-maps-key"));
        assert!(traffic_client.try_commute(ORIGIN, "Atlantis").await.is_err());

        let traffic = traffic_client.commute(ORIGIN, "Atlantis").await;
        assert!((20..70).contains(&traffic.commute_time));
        assert_eq!(traffic.destination, "Atlantis");
    }

    #[test]
    fn test_simulated_estimates_stay_in_range() {
        let traffic_client = client("http://127.0.0.1:9", None);
        for _ in 0..500 {
            let traffic = traffic_client.simulated(DESTINATION);
            assert!(traffic.delay == 0 || (5..30).contains(&traffic.delay));
            let base = traffic.commute_time - traffic.delay;
            assert!((20..40).contains(&base));
        }
    }

    #[test]
    fn test_blank_destination_label() {
        let traffic_client = client("http://127.0.0.1:9", None);
        assert_eq!(traffic_client.simulated(" ").destination, "Workville");
    }

    #[rstest]
    #[case(0, None)]
    #[case(4, None)]
    #[case(5, Some("a bit slow"))]
    #[case(10, Some("a bit slow"))]
    #[case(11, Some("leave a bit early"))]
    #[case(30, Some("leave a bit early"))]
    fn test_suggestion_tiers(#[case] delay: u32, #[case] expected: Option<&str>) {
        let traffic_client = client("http://127.0.0.1:9", None);
        let suggestion = traffic_client.suggestion(delay);
        match expected {
            Some(fragment) => assert!(suggestion.unwrap().contains(fragment)),
            None => assert!(suggestion.is_none()),
        }
    }

    #[rstest]
    #[case(0, 0)]
    #[case(29, 0)]
    #[case(30, 1)]
    #[case(3120, 52)]
    #[case(u64::MAX - 10, u32::MAX)]
    fn test_to_minutes_rounds(#[case] seconds: u64, #[case] minutes: u32) {
        assert_eq!(to_minutes(seconds), minutes);
    }
}
