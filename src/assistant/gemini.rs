//! Client for a Gemini-style `generateContent` endpoint.

use super::{prompt, Assistant};
use crate::contact::NearbyContact;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Header carrying the API key; it is never put in the URL
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate's parts, joined
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Assistant backed by the Gemini REST API
pub struct GeminiAssistant {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl GeminiAssistant {
    pub fn new(
        api_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build assistant HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, "Requesting completion");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to send assistant request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "Assistant request failed with status {}: {}",
                status,
                body
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .context("Failed to parse assistant response")?;

        parsed
            .into_text()
            .ok_or_else(|| anyhow!("Assistant returned no text"))
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    async fn draft_icebreaker(&self, contact: &NearbyContact, intent: &str) -> Result<String> {
        self.generate(&prompt::icebreaker(contact, intent)).await
    }

    async fn suggest_meetup(&self, contact: &NearbyContact, user_location: &str) -> Result<String> {
        self.generate(&prompt::meetup(contact, user_location)).await
    }
}
