//! Motivational quote generation
//!
//! A [`TextGenerator`] produces `{quote, isPositive}` JSON for a short prompt.
//! [`QuoteGenerator`] only passes through quotes flagged positive and short
//! enough; everything else resolves to one of two fixed quotes.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::GeneratorConfig;
use crate::http;
use crate::models::MotivationalQuote;
use crate::{Result, SunriseError};

const SERVICE: &str = "text generation";

/// Longest quote accepted from the generator, in words
pub const MAX_QUOTE_WORDS: usize = 20;

pub const GENERATED_AUTHOR: &str = "AI Assistant";

/// Used when the generator answered but the quote was not acceptable
pub const NOT_POSITIVE_FALLBACK: (&str, &str) = (
    "Every morning is a new beginning. Take a deep breath, smile, and start again.",
    "Sunrise Navigator",
);

/// Used when generation failed outright
pub const FAILED_FALLBACK: (&str, &str) = (
    "The secret of getting ahead is getting started.",
    "Mark Twain",
);

/// A text-in, text-out generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a JSON document answering `prompt`.
    async fn generate_json(&self, prompt: &str) -> Result<String>;
}

/// What the generator is asked to return
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuote {
    pub quote: String,
    pub is_positive: bool,
}

impl GeneratedQuote {
    fn is_acceptable(&self) -> bool {
        let words = self.quote.split_whitespace().count();
        self.is_positive && words > 0 && words <= MAX_QUOTE_WORDS
    }
}

#[derive(Clone)]
pub struct QuoteGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl QuoteGenerator {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// A quote about `topic`, never failing.
    #[instrument(skip(self))]
    pub async fn quote(&self, topic: Option<&str>) -> MotivationalQuote {
        let prompt = build_prompt(topic);

        let generated = match self.generator.generate_json(&prompt).await {
            Ok(text) => parse_generated(&text),
            Err(e) => Err(e),
        };

        match generated {
            Ok(generated) if generated.is_acceptable() => {
                info!("Using generated quote");
                MotivationalQuote {
                    quote: generated.quote.trim().to_string(),
                    author: GENERATED_AUTHOR.to_string(),
                }
            }
            Ok(generated) => {
                debug!(
                    "Generated quote rejected (positive: {}, words: {})",
                    generated.is_positive,
                    generated.quote.split_whitespace().count()
                );
                fixed(NOT_POSITIVE_FALLBACK)
            }
            Err(e) => {
                warn!("Error generating motivational message: {}", e);
                fixed(FAILED_FALLBACK)
            }
        }
    }
}

fn fixed((quote, author): (&str, &str)) -> MotivationalQuote {
    MotivationalQuote {
        quote: quote.to_string(),
        author: author.to_string(),
    }
}

/// Prompt asking for a short, uplifting quote and a positivity flag.
#[must_use]
pub fn build_prompt(topic: Option<&str>) -> String {
    let mut prompt = format!(
        "You are an assistant that writes motivational quotes.\n\
         Generate a motivational quote, ensuring it is uplifting and positive.\n\
         The quote should be no more than {MAX_QUOTE_WORDS} words.\n\
         Say whether the quote is subjectively positive in the isPositive field.\n\
         Answer only with JSON of the form {{\"quote\": string, \"isPositive\": boolean}}."
    );
    if let Some(topic) = topic.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str(&format!("\nThe quote should be about {topic}."));
    }
    prompt
}

/// Parse generator output, tolerating a Markdown code fence around the JSON.
pub fn parse_generated(text: &str) -> Result<GeneratedQuote> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(body.trim())
        .map_err(|e| SunriseError::api(format!("Generator returned malformed quote: {e}")))
}

/// Gemini `generateContent` REST client
pub struct GeminiGenerator {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiGenerator {
    #[must_use]
    pub fn new(client: Client, config: &GeneratorConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate_json(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| SunriseError::config("Missing GEMINI_API_KEY"))?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(api_key)
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.9,
            },
        };

        let response: GeminiResponse =
            http::post_json(&self.client, SERVICE, &url, &request).await?;

        response
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| SunriseError::api("No candidates in generator response"))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}
