//! Top headlines from NewsAPI
//!
//! One article per configured category/keyword query, fetched concurrently,
//! then general top headlines as filler. Headlines are distinct by article
//! URL and capped at [`MAX_HEADLINES`].

use std::collections::HashSet;

use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::config::{NewsConfig, NewsQuery};
use crate::http;
use crate::models::NewsHeadline;
use crate::{Result, SunriseError};

const SERVICE: &str = "news";

pub const MAX_HEADLINES: usize = 5;

#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    country: String,
    queries: Vec<NewsQuery>,
}

impl NewsClient {
    #[must_use]
    pub fn new(client: Client, config: &NewsConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country: config.country.clone(),
            queries: config.queries.clone(),
        }
    }

    /// Up to five distinct headlines; empty when no API key is configured.
    #[instrument(skip(self))]
    pub async fn headlines(&self) -> Vec<NewsHeadline> {
        let Some(api_key) = self.api_key.as_deref() else {
            warn!("NEWS_API_KEY is not configured, returning no headlines");
            return Vec::new();
        };

        let lookups = self
            .queries
            .iter()
            .map(|query| self.fetch_articles(api_key, Some(query), 1));
        let results = join_all(lookups).await;

        let mut headlines = Vec::with_capacity(MAX_HEADLINES);
        for (query, result) in self.queries.iter().zip(results) {
            match result {
                Ok(found) => headlines.extend(found),
                Err(e) => warn!("Skipping news query {}: {}", describe(query), e),
            }
        }
        let mut headlines = dedup_headlines(headlines);

        if headlines.len() < MAX_HEADLINES {
            let wanted = MAX_HEADLINES - headlines.len();
            match self.fetch_articles(api_key, None, wanted).await {
                Ok(general) => {
                    headlines.extend(general);
                    headlines = dedup_headlines(headlines);
                }
                Err(e) => warn!("Skipping general headlines: {}", e),
            }
        }

        info!("Collected {} headlines", headlines.len());
        headlines
    }

    async fn fetch_articles(
        &self,
        api_key: &str,
        query: Option<&NewsQuery>,
        page_size: usize,
    ) -> Result<Vec<NewsHeadline>> {
        let mut url = format!(
            "{}/top-headlines?country={}&pageSize={}",
            self.base_url,
            urlencoding::encode(&self.country),
            page_size
        );
        if let Some(query) = query {
            if let Some(category) = &query.category {
                url.push_str(&format!("&category={}", urlencoding::encode(category)));
            }
            if let Some(q) = &query.q {
                url.push_str(&format!("&q={}", urlencoding::encode(q)));
            }
        }
        url.push_str(&format!("&apiKey={}", urlencoding::encode(api_key)));

        let response: TopHeadlinesResponse = http::get_json(&self.client, SERVICE, &url).await?;

        if response.status != "ok" {
            return Err(SunriseError::api(format!(
                "News API returned an error: {}",
                response.message.unwrap_or_else(|| response.status.clone())
            )));
        }
        if response.articles.is_empty() {
            return Err(SunriseError::api("News API returned no articles"));
        }

        Ok(response
            .articles
            .into_iter()
            .filter_map(Article::into_headline)
            .collect())
    }
}

/// Keep the first headline for each URL, then cap the list.
#[must_use]
pub fn dedup_headlines(headlines: Vec<NewsHeadline>) -> Vec<NewsHeadline> {
    let mut seen = HashSet::new();
    headlines
        .into_iter()
        .filter(|headline| seen.insert(headline.id.clone()))
        .take(MAX_HEADLINES)
        .collect()
}

fn describe(query: &NewsQuery) -> String {
    match (&query.category, &query.q) {
        (Some(category), Some(q)) => format!("{category}/{q}"),
        (Some(category), None) => category.clone(),
        (None, Some(q)) => q.clone(),
        (None, None) => "general".to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct TopHeadlinesResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    url: Option<String>,
    title: Option<String>,
    source: Option<ArticleSource>,
}

#[derive(Debug, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl Article {
    fn into_headline(self) -> Option<NewsHeadline> {
        let id = self.url.filter(|url| !url.is_empty())?;
        let title = self.title.filter(|title| !title.is_empty())?;
        let source = self
            .source
            .and_then(|source| source.name)
            .unwrap_or_else(|| "Unknown".to_string());
        Some(NewsHeadline { id, title, source })
    }
}
