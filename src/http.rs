//! Shared HTTP plumbing for the upstream clients
//!
//! Every upstream call goes through [`get_json`] or [`post_json`], which map
//! transport failures and non-success statuses onto [`SunriseError`], and the
//! briefing assembler bounds each call with [`with_deadline`].

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::error::redact;
use crate::{Result, SunriseError};

const USER_AGENT: &str = concat!("SunriseNavigator/", env!("CARGO_PKG_VERSION"));

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Build the HTTP client shared by all upstream clients.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| SunriseError::general(format!("Failed to create HTTP client: {e}")))
}

/// GET `url` and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(client: &Client, service: &str, url: &str) -> Result<T> {
    debug!("{} request: GET {}", service, redact(url));
    let start = Instant::now();

    let response = client.get(url).send().await?;
    decode(service, response, start).await
}

/// POST a JSON body to `url` and decode the JSON response.
pub async fn post_json<B, T>(client: &Client, service: &str, url: &str, body: &B) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    debug!("{} request: POST {}", service, redact(url));
    let start = Instant::now();

    let response = client.post(url).json(body).send().await?;
    decode(service, response, start).await
}

async fn decode<T: DeserializeOwned>(service: &str, response: Response, start: Instant) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("{} returned HTTP {}: {}", service, status, redact(&body));

        return Err(match status.as_u16() {
            401 | 403 => SunriseError::config(format!(
                "{service} rejected the API key (HTTP {status})"
            )),
            429 => SunriseError::api(format!("{service} rate limit exceeded")),
            _ => SunriseError::api(format!(
                "{service} request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )),
        });
    }

    let parsed = response.json::<T>().await.map_err(|e| {
        error!("Failed to parse {} response: {}", service, e);
        SunriseError::api(format!("Invalid data received from {service}"))
    })?;

    let elapsed = start.elapsed();
    info!("{} answered in {:.3}s", service, elapsed.as_secs_f64());
    if elapsed > SLOW_RESPONSE {
        warn!("Slow {} response: {:.3}s", service, elapsed.as_secs_f64());
    }

    Ok(parsed)
}

/// Bound `future` by `deadline`, turning an elapsed deadline into
/// [`SunriseError::UpstreamUnavailable`] for `service`.
pub async fn with_deadline<T, F>(service: &str, deadline: Duration, future: F) -> Result<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(deadline, future).await.map_err(|_| {
        warn!("{} did not answer within {:?}", service, deadline);
        SunriseError::unavailable(service, format!("no answer within {deadline:?}"))
    })
}

/// First comma-separated segment of a free-text place, trimmed.
#[must_use]
pub fn place_label(place: &str) -> Option<&str> {
    place
        .split(',')
        .next()
        .map(str::trim)
        .filter(|label| !label.is_empty())
}
