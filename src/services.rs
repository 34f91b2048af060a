use crate::cache_validator::CachedSearchResult;
use crate::config::Config;
use crate::errors::AppError;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Web search collaborator (Serper-style API).
///
/// Returns a text summary of the top organic results. Responses are cached
/// with checksum validation since each summary feeds two model prompts.
pub struct SearchService {
    client: Client,
    base_url: String,
    api_key: String,
    cache: Cache<String, String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

impl SearchService {
    pub fn new(config: &Config, cache: Cache<String, String>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.serper_base_url.clone(),
            api_key: config.serper_api_key.clone(),
            cache,
        }
    }

    /// Runs a web search and returns `"{title}: {snippet}"` lines for the
    /// top results.
    pub async fn search(&self, query: &str) -> Result<String, AppError> {
        // Check cache first with validation
        if let Some(cached) = self.cache.get(query).await {
            if let Some(summary) = CachedSearchResult::deserialize_and_validate(&cached, query) {
                tracing::debug!("Search cache HIT (validated) for query: {}", query);
                return Ok(summary);
            }
            tracing::warn!("Search cache entry invalid, refetching: {}", query);
        }

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/search", self.base_url),
            &[("q", query), ("num", "3")],
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build search URL: {}", e)))?;

        tracing::info!("Searching web for: {}", query);
        // Redact the API key from logs
        tracing::debug!("Search URL: {}/search?q={}&num=3 [key in header]", self.base_url, query);

        let response = self
            .client
            .get(url)
            .header("X-API-KEY", &self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Search API returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Search API returned status {}: {}",
                status, error_text
            )));
        }

        let result: SearchResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse search response: {}", e))
        })?;

        let summary = result
            .organic
            .iter()
            .map(|r| format!("{}: {}", r.title, r.snippet))
            .collect::<Vec<_>>()
            .join("\n");

        let entry = CachedSearchResult::new(query.to_string(), summary.clone());
        self.cache
            .insert(query.to_string(), entry.serialize())
            .await;

        tracing::info!("Search returned {} results for: {}", result.organic.len(), query);
        Ok(summary)
    }
}

/// Language-model collaborator (OpenAI-style chat completions API).
pub struct LlmService {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl LlmService {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.model.clone(),
        }
    }

    /// Sends a single-turn prompt and returns the model's reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("Model request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Model API returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Model API returned status {}: {}",
                status, error_text
            )));
        }

        let result: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse model response: {}", e))
        })?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                AppError::ExternalApiError("Model response contained no choices".to_string())
            })?;

        Ok(content.trim().to_string())
    }
}
