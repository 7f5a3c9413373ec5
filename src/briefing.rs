//! Morning briefing assembly
//!
//! Traffic is resolved first (the adjusted wake time depends on it), then
//! weather and news are fetched concurrently. Each client call is bounded by
//! the configured deadline; a call that misses it is replaced by that
//! client's fallback, so assembly itself never fails for upstream reasons.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::Result;
use crate::config::SunriseConfig;
use crate::http::with_deadline;
use crate::models::{
    AlarmBriefing, AlarmSettings, BriefingData, MotivationalQuote, NewsHeadline, TrafficData,
    WeatherData,
};
use crate::news::NewsClient;
use crate::quote::{FAILED_FALLBACK, GeminiGenerator, QuoteGenerator};
use crate::traffic::TrafficClient;
use crate::weather::WeatherClient;

/// Assembles briefings and rings the alarm
#[derive(Clone)]
pub struct BriefingService {
    traffic: TrafficClient,
    weather: WeatherClient,
    news: NewsClient,
    quotes: QuoteGenerator,
    deadline: Duration,
    default_topic: String,
}

impl BriefingService {
    #[must_use]
    pub fn new(
        traffic: TrafficClient,
        weather: WeatherClient,
        news: NewsClient,
        quotes: QuoteGenerator,
        deadline: Duration,
        default_topic: String,
    ) -> Self {
        Self {
            traffic,
            weather,
            news,
            quotes,
            deadline,
            default_topic,
        }
    }

    /// Wire up the live clients from configuration, sharing one HTTP client.
    #[must_use]
    pub fn from_config(config: &SunriseConfig, client: Client) -> Self {
        let generator = GeminiGenerator::new(client.clone(), &config.generator);

        Self::new(
            TrafficClient::new(client.clone(), &config.maps, &config.traffic),
            WeatherClient::new(client.clone(), &config.weather),
            NewsClient::new(client, &config.news),
            QuoteGenerator::new(Arc::new(generator)),
            config.http.call_deadline(),
            config.generator.default_topic.clone(),
        )
    }

    #[must_use]
    pub fn traffic_client(&self) -> &TrafficClient {
        &self.traffic
    }

    #[must_use]
    pub fn weather_client(&self) -> &WeatherClient {
        &self.weather
    }

    #[must_use]
    pub fn news_client(&self) -> &NewsClient {
        &self.news
    }

    /// Build a briefing, reusing `traffic` when the caller already has it.
    #[instrument(skip(self, traffic))]
    pub async fn assemble(
        &self,
        home: &str,
        destination: &str,
        weather_location: &str,
        traffic: Option<TrafficData>,
    ) -> BriefingData {
        let traffic = match traffic {
            Some(traffic) => traffic,
            None => self.traffic(home, destination).await,
        };

        let (weather, news) = tokio::join!(self.weather(weather_location), self.news());

        info!(
            "Briefing ready: {} min commute, {} headlines",
            traffic.commute_time,
            news.len()
        );
        BriefingData {
            weather,
            traffic,
            news,
        }
    }

    /// Validate `settings`, then assemble the briefing and a quote
    /// concurrently and pull the wake time earlier by the traffic delay.
    #[instrument(skip(self, settings), fields(time = %settings.time))]
    pub async fn ring(&self, settings: &AlarmSettings) -> Result<AlarmBriefing> {
        let alarm_time = settings.validate()?;

        let (briefing, quote) = tokio::join!(
            self.assemble(
                &settings.home,
                &settings.destination,
                &settings.weather_location,
                None
            ),
            self.quote(Some(self.default_topic.as_str()))
        );

        let ring = AlarmBriefing::new(briefing, quote, alarm_time);
        info!(
            "Alarm set for {} rings at {}",
            ring.alarm_time, ring.adjusted_alarm_time
        );
        Ok(ring)
    }

    pub async fn traffic(&self, origin: &str, destination: &str) -> TrafficData {
        with_deadline("traffic", self.deadline, self.traffic.commute(origin, destination))
            .await
            .unwrap_or_else(|e| {
                warn!("{}; using simulated commute", e);
                self.traffic.simulated(destination)
            })
    }

    pub async fn weather(&self, location: &str) -> WeatherData {
        with_deadline("weather", self.deadline, self.weather.current(location))
            .await
            .unwrap_or_else(|e| {
                warn!("{}; using simulated weather", e);
                WeatherClient::fallback(location)
            })
    }

    pub async fn news(&self) -> Vec<NewsHeadline> {
        with_deadline("news", self.deadline, self.news.headlines())
            .await
            .unwrap_or_else(|e| {
                warn!("{}; briefing has no headlines", e);
                Vec::new()
            })
    }

    pub async fn quote(&self, topic: Option<&str>) -> MotivationalQuote {
        with_deadline("quote", self.deadline, self.quotes.quote(topic))
            .await
            .unwrap_or_else(|e| {
                warn!("{}; using fixed quote", e);
                MotivationalQuote {
                    quote: FAILED_FALLBACK.0.to_string(),
                    author: FAILED_FALLBACK.1.to_string(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SunriseError;
    use crate::config::{MapsConfig, NewsConfig, TrafficConfig, WeatherConfig};
    use crate::http;
    use crate::quote::TextGenerator;
    use async_trait::async_trait;
    use std::time::Instant;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NeverAnswers;

    #[async_trait]
    impl TextGenerator for NeverAnswers {
        async fn generate_json(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(SunriseError::api("unreachable"))
        }
    }

    /// Service with no keys configured: every client takes its fallback path.
    fn offline_service(deadline: Duration) -> BriefingService {
        let client = http::build_client(Duration::from_secs(1)).unwrap();
        BriefingService::new(
            TrafficClient::new(client.clone(), &MapsConfig::default(), &TrafficConfig::default()),
            WeatherClient::new(client.clone(), &WeatherConfig::default()),
            NewsClient::new(client, &NewsConfig::default()),
            QuoteGenerator::new(Arc::new(NeverAnswers)),
            deadline,
            "morning productivity".to_string(),
        )
    }

    #[tokio::test]
    async fn test_assemble_offline_uses_fallbacks() {
        let service = offline_service(Duration::from_secs(5));
        let briefing = service
            .assemble(
                "1600 Amphitheatre Parkway, Mountain View, CA",
                "1 Market St, San Francisco, CA",
                "Tokyo",
                None,
            )
            .await;

        assert_eq!(briefing.weather, WeatherClient::fallback("Tokyo"));
        assert!(briefing.news.is_empty());
        assert!(briefing.traffic.commute_time >= briefing.traffic.delay);
        assert_eq!(briefing.traffic.destination, "1 Market St");
    }

    #[tokio::test]
    async fn test_assemble_deadline_cuts_off_hung_upstreams() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .mount(&server)
            .await;

        let maps = MapsConfig {
            api_key: Some("test-maps-key".to_string()),
            base_url: server.uri(),
        };
        let weather = WeatherConfig {
            api_key: Some("test-weather-key".to_string()),
            base_url: server.uri(),
        };
        let news = NewsConfig {
            api_key: Some("test-news-key".to_string()),
            base_url: server.uri(),
            ..NewsConfig::default()
        };
        // The HTTP timeout is far beyond the deadline, so only the deadline can fire.
        let client = http::build_client(Duration::from_secs(60)).unwrap();
        let service = BriefingService::new(
            TrafficClient::new(client.clone(), &maps, &TrafficConfig::default()),
            WeatherClient::new(client.clone(), &weather),
            NewsClient::new(client, &news),
            QuoteGenerator::new(Arc::new(NeverAnswers)),
            Duration::from_millis(300),
            "morning productivity".to_string(),
        );

        let started = Instant::now();
        let briefing = service
            .assemble(
                "1600 Amphitheatre Parkway, Mountain View, CA",
                "1 Market St, San Francisco, CA",
                "Kochi, Kerala",
                None,
            )
            .await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(briefing.traffic.destination, "1 Market St");
        assert!((20..70).contains(&briefing.traffic.commute_time));
        assert!(briefing.traffic.commute_time >= briefing.traffic.delay);
        assert_eq!(briefing.weather, WeatherClient::fallback("Kochi, Kerala"));
        assert!(briefing.news.is_empty());
    }

    #[tokio::test]
    async fn test_assemble_reuses_supplied_traffic() {
        let service = offline_service(Duration::from_secs(5));
        let known = TrafficData {
            commute_time: 41,
            delay: 11,
            destination: "Office".to_string(),
            suggestion: None,
        };
        let briefing = service
            .assemble("Home", "Office", "Tokyo", Some(known.clone()))
            .await;
        assert_eq!(briefing.traffic, known);
    }

    #[tokio::test]
    async fn test_ring_times_out_hung_quote() {
        let service = offline_service(Duration::from_millis(50));
        let ring = service.ring(&AlarmSettings::default()).await.unwrap();

        assert_eq!(ring.quote.author, "Mark Twain");
        assert_eq!(ring.alarm_time.to_string(), "07:00");
        assert_eq!(
            ring.adjusted_alarm_time,
            ring.alarm_time.earlier_by(ring.briefing.traffic.delay)
        );
    }

    #[tokio::test]
    async fn test_ring_rejects_invalid_settings() {
        let service = offline_service(Duration::from_secs(5));
        let settings = AlarmSettings {
            time: "25:00".to_string(),
            ..AlarmSettings::default()
        };
        let err = service.ring(&settings).await.unwrap_err();
        assert!(matches!(err, SunriseError::Validation { .. }));
    }
}
