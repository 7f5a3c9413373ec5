use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::briefing::BriefingService;
use crate::config::SunriseConfig;
use crate::geocoding::AddressValidator;
use crate::http;
use crate::models::{
    ALARM_SOUNDS, AddressValidation, AlarmBriefing, AlarmSettings, AlarmSound, BriefingData,
    MotivationalQuote, MusicTrack, NewsHeadline, TrafficData, WeatherData,
};
use crate::music::MusicSearch;
use crate::{SunriseError, VERSION};

/// Services shared by every request handler
pub struct AppState {
    pub briefing: BriefingService,
    pub addresses: AddressValidator,
    pub music: MusicSearch,
}

impl AppState {
    pub fn from_config(config: &SunriseConfig) -> crate::Result<Self> {
        let client = http::build_client(config.http.request_timeout())?;
        Ok(Self {
            briefing: BriefingService::from_config(config, client.clone()),
            addresses: AddressValidator::new(client.clone(), &config.maps),
            music: MusicSearch::new(client, &config.music),
        })
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiHealth {
    pub status: String,
    pub version: String,
}

#[derive(Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingRequest {
    pub home: String,
    pub destination: String,
    pub weather_location: String,
    #[serde(default)]
    pub traffic: Option<TrafficData>,
}

#[derive(Deserialize)]
pub struct TrafficRequest {
    pub origin: String,
    pub destination: String,
}

#[derive(Deserialize)]
pub struct AddressRequest {
    pub address: String,
}

#[derive(Deserialize)]
pub struct WeatherQuery {
    pub location: String,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub topic: Option<String>,
}

#[derive(Deserialize)]
pub struct MusicQuery {
    pub q: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn error_response(err: SunriseError) -> (StatusCode, Json<ApiError>) {
    let status = match err {
        SunriseError::Validation { .. } => StatusCode::BAD_REQUEST,
        SunriseError::Config { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_GATEWAY,
    };
    warn!("Request failed with {}: {}", status, err);
    (
        status,
        Json(ApiError {
            error: err.user_message(),
        }),
    )
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/briefing", post(briefing))
        .route("/alarm/ring", post(ring))
        .route("/alarm/sounds", get(sounds))
        .route("/traffic", post(traffic))
        .route("/weather", get(weather))
        .route("/news", get(news))
        .route("/quote", get(quote))
        .route("/address/validate", post(validate_address))
        .route("/music/search", get(music_search))
        .with_state(state)
}

async fn health() -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

async fn briefing(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BriefingRequest>,
) -> Json<BriefingData> {
    let data = state
        .briefing
        .assemble(
            &request.home,
            &request.destination,
            &request.weather_location,
            request.traffic,
        )
        .await;
    Json(data)
}

async fn ring(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<AlarmSettings>,
) -> ApiResult<AlarmBriefing> {
    state
        .briefing
        .ring(&settings)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn sounds() -> Json<Vec<AlarmSound>> {
    Json(ALARM_SOUNDS.to_vec())
}

async fn traffic(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrafficRequest>,
) -> Json<TrafficData> {
    Json(
        state
            .briefing
            .traffic(&request.origin, &request.destination)
            .await,
    )
}

async fn weather(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeatherQuery>,
) -> Json<WeatherData> {
    Json(state.briefing.weather(&query.location).await)
}

async fn news(State(state): State<Arc<AppState>>) -> Json<Vec<NewsHeadline>> {
    Json(state.briefing.news().await)
}

async fn quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<QuoteQuery>,
) -> Json<MotivationalQuote> {
    Json(state.briefing.quote(query.topic.as_deref()).await)
}

async fn validate_address(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddressRequest>,
) -> ApiResult<AddressValidation> {
    state
        .addresses
        .validate(&request.address)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn music_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MusicQuery>,
) -> Json<Vec<MusicTrack>> {
    Json(state.music.search(&query.q).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn offline_router() -> Router {
        let state = AppState::from_config(&SunriseConfig::default()).unwrap();
        router(Arc::new(state))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(
            offline_router(),
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
    }

    #[tokio::test]
    async fn test_sounds_lists_builtin_alarms() {
        let (status, body) = send(
            offline_router(),
            Request::get("/alarm/sounds").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 5);
        assert_eq!(body[0]["name"], "Classic Alarm");
    }

    #[tokio::test]
    async fn test_weather_without_key_is_simulated() {
        let (status, body) = send(
            offline_router(),
            Request::get("/weather?location=Tokyo")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["temperature"], 18);
        assert_eq!(body["condition"], "Clear Skies (Simulated)");
        assert_eq!(body["location"], "Tokyo");
    }

    #[tokio::test]
    async fn test_ring_rejects_bad_time() {
        let mut settings = serde_json::to_value(AlarmSettings::default()).unwrap();
        settings["time"] = serde_json::json!("24:00");

        let (status, body) = send(offline_router(), post_json("/alarm/ring", settings)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("HH:MM"));
    }

    #[tokio::test]
    async fn test_address_validation_without_key_is_unavailable() {
        let (status, body) = send(
            offline_router(),
            post_json(
                "/address/validate",
                serde_json::json!({"address": "1 Market St"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_briefing_keeps_supplied_traffic() {
        let (status, body) = send(
            offline_router(),
            post_json(
                "/briefing",
                serde_json::json!({
                    "home": "Home St",
                    "destination": "Office Park",
                    "weatherLocation": "Kochi, Kerala",
                    "traffic": {"commuteTime": 35, "delay": 7, "destination": "Office Park"}
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["traffic"]["commuteTime"], 35);
        assert_eq!(body["traffic"]["delay"], 7);
        assert_eq!(body["weather"]["location"], "Kochi");
        assert_eq!(body["news"], serde_json::json!([]));
    }
}
