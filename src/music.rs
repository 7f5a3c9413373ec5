//! Track search for the alarm sound picker
//!
//! Both providers are keyless; any failure returns an empty list.

use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::Result;
use crate::config::{MusicConfig, MusicProvider};
use crate::http;
use crate::models::MusicTrack;

const MAX_TRACKS: usize = 5;
const AUDIUS_APP_NAME: &str = "SunriseNavigator";

#[derive(Debug, Clone)]
pub struct MusicSearch {
    client: Client,
    provider: MusicProvider,
    deezer_base_url: String,
    audius_base_url: String,
}

impl MusicSearch {
    #[must_use]
    pub fn new(client: Client, config: &MusicConfig) -> Self {
        Self {
            client,
            provider: config.provider,
            deezer_base_url: config.deezer_base_url.trim_end_matches('/').to_string(),
            audius_base_url: config.audius_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Up to five playable tracks matching `query`.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Vec<MusicTrack> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let result = match self.provider {
            MusicProvider::Deezer => self.search_deezer(query).await,
            MusicProvider::Audius => self.search_audius(query).await,
        };

        match result {
            Ok(tracks) => {
                info!("Found {} tracks for '{}'", tracks.len(), query);
                tracks
            }
            Err(e) => {
                warn!("Track search failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    async fn search_deezer(&self, query: &str) -> Result<Vec<MusicTrack>> {
        let url = format!(
            "{}/search?q={}&limit={}",
            self.deezer_base_url,
            urlencoding::encode(query),
            MAX_TRACKS
        );
        let response: DeezerResponse = http::get_json(&self.client, "deezer", &url).await?;

        Ok(response
            .data
            .into_iter()
            .filter(|track| !track.preview.is_empty())
            .take(MAX_TRACKS)
            .map(|track| MusicTrack {
                name: track.title,
                artist: track.artist.name,
                url: track.preview,
            })
            .collect())
    }

    async fn search_audius(&self, query: &str) -> Result<Vec<MusicTrack>> {
        let url = format!(
            "{}/tracks/search?query={}&app_name={}",
            self.audius_base_url,
            urlencoding::encode(query),
            AUDIUS_APP_NAME
        );
        let response: AudiusResponse = http::get_json(&self.client, "audius", &url).await?;

        Ok(response
            .data
            .into_iter()
            .take(MAX_TRACKS)
            .map(|track| MusicTrack {
                url: format!(
                    "{}/tracks/{}/stream?app_name={}",
                    self.audius_base_url, track.id, AUDIUS_APP_NAME
                ),
                name: track.title,
                artist: track.user.name,
            })
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct DeezerResponse {
    #[serde(default)]
    data: Vec<DeezerTrack>,
}

#[derive(Debug, Deserialize)]
struct DeezerTrack {
    title: String,
    #[serde(default)]
    preview: String,
    artist: DeezerArtist,
}

#[derive(Debug, Deserialize)]
struct DeezerArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AudiusResponse {
    #[serde(default)]
    data: Vec<AudiusTrack>,
}

#[derive(Debug, Deserialize)]
struct AudiusTrack {
    id: String,
    title: String,
    user: AudiusUser,
}

#[derive(Debug, Deserialize)]
struct AudiusUser {
    name: String,
}
