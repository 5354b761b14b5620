//! GeminiTransport - Direct REST API implementation for Gemini.
//!
//! Calls the `generateContent` endpoint with the credential as the `key`
//! query parameter, retrying rate-limited requests according to a
//! [`RetryPolicy`].

use async_trait::async_trait;
use banter_core::ApiKey;
use banter_core::config::{ChatConfig, GenerationSettings, ModelSettings};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::transport::{GenerationTransport, TransportError};

/// Text used when a successful response carries no candidate text.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response from model.";

/// Transport implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiTransport {
    client: Client,
    api_key: ApiKey,
    model: ModelSettings,
    retry: RetryPolicy,
}

impl GeminiTransport {
    /// Creates a new transport with the provided API key and model settings.
    pub fn new(api_key: ApiKey, model: ModelSettings) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            retry: RetryPolicy::default(),
        }
    }

    /// Builds a transport from the loaded configuration.
    pub fn from_config(api_key: ApiKey, config: &ChatConfig) -> Self {
        Self::new(api_key, config.model.clone())
            .with_retry_policy(RetryPolicy::from_settings(&config.retry))
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model.name = model.into();
        self
    }

    /// Points the transport at a different host, e.g. a proxy or a test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.model.base_url = base_url.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model.name
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Endpoint URL without the credential, safe to log.
    pub fn endpoint(&self) -> String {
        format!(
            "{base}/{version}/models/{model}:generateContent",
            base = self.model.base_url.trim_end_matches('/'),
            version = self.model.api_version,
            model = self.model.name,
        )
    }

    fn request_url(&self) -> Result<Url, TransportError> {
        Url::parse_with_params(&self.endpoint(), &[("key", self.api_key.expose())])
            .map_err(|err| TransportError::Network(format!("Invalid Gemini endpoint URL: {err}")))
    }

    async fn post_once(
        &self,
        url: &Url,
        body: &GenerateContentRequest,
    ) -> Result<Response, TransportError> {
        self.client
            .post(url.clone())
            .json(body)
            .send()
            .await
            // reqwest errors carry the full URL, credential included
            .map_err(|err| {
                TransportError::Network(format!(
                    "Gemini API request failed: {}",
                    err.without_url()
                ))
            })
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, TransportError> {
        let url = self.request_url()?;
        let mut last_rate_limited_body = None;

        for attempt in self.retry.schedule() {
            if let Some(delay) = attempt.delay {
                tracing::warn!(
                    "Gemini rate limited, retry {}/{} after {}ms",
                    attempt.number,
                    self.retry.max_attempts(),
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            tracing::debug!(
                "POST {} (attempt {}/{})",
                self.endpoint(),
                attempt.number,
                self.retry.max_attempts()
            );
            let response = self.post_once(&url, body).await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_else(|err| {
                    tracing::warn!(
                        "Failed to read rate-limited response body: {}",
                        err.without_url()
                    );
                    String::new()
                });
                last_rate_limited_body = Some(body);
                continue;
            }

            return interpret_response(response).await;
        }

        Err(rate_limited_error(
            self.retry.max_attempts(),
            last_rate_limited_body.as_deref().unwrap_or_default(),
        ))
    }
}

impl std::fmt::Debug for GeminiTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiTransport")
            .field("endpoint", &self.endpoint())
            .field("api_key", &self.api_key)
            .field("retry", &self.retry)
            .finish()
    }
}

#[async_trait]
impl GenerationTransport for GeminiTransport {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, TransportError> {
        self.send_request(request).await
    }
}

/// Request body for `generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            generation_config: None,
        }
    }

    /// Attaches sampling parameters unless they are disabled in the settings.
    pub fn with_generation_settings(mut self, settings: &GenerationSettings) -> Self {
        self.generation_config = settings.enabled.then(|| GenerationConfig::from(settings));
        self
    }
}

/// One role-tagged turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn text(role: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            parts: vec![Part { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&GenerationSettings> for GenerationConfig {
    fn from(settings: &GenerationSettings) -> Self {
        Self {
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
        }
    }
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

async fn interpret_response(response: Response) -> Result<String, TransportError> {
    let status = response.status();
    let body = response.text().await.map_err(|err| {
        TransportError::Network(format!(
            "Failed to read Gemini response: {}",
            err.without_url()
        ))
    })?;

    if !status.is_success() {
        let message = error_message(&body).unwrap_or_else(|| generic_status_message(status));
        tracing::warn!("Gemini API returned {}: {}", status, message);
        return Err(TransportError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let parsed: GenerateContentResponse =
        serde_json::from_str(&body).map_err(|err| TransportError::Decode(err.to_string()))?;

    Ok(extract_text_response(parsed))
}

/// First candidate, first part. Anything missing or empty becomes the placeholder.
fn extract_text_response(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string())
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .filter(|message| !message.trim().is_empty())
}

fn generic_status_message(status: StatusCode) -> String {
    format!("API error (HTTP {})", status.as_u16())
}

fn rate_limited_error(attempts: u32, body: &str) -> TransportError {
    let message = error_message(body)
        .unwrap_or_else(|| format!("rate limit exceeded after {attempts} attempts"));
    tracing::warn!("Gemini retry budget exhausted after {} attempts", attempts);
    TransportError::RateLimited { attempts, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extracts_first_candidate_first_part() {
        let response = parse(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"first"},{"text":"second"}]}},
                {"content":{"parts":[{"text":"other"}]}}
            ]}"#,
        );
        assert_eq!(extract_text_response(response), "first");
    }

    #[test]
    fn test_missing_pieces_become_placeholder() {
        for json in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{}]}"#,
            r#"{"candidates":[{"content":{}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{}]}}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
        ] {
            assert_eq!(extract_text_response(parse(json)), NO_RESPONSE_PLACEHOLDER, "{json}");
        }
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"error":{"code":500,"message":"quota exceeded"}}"#),
            Some("quota exceeded".to_string())
        );
        assert_eq!(error_message(r#"{"error":{"code":500}}"#), None);
        assert_eq!(error_message("<html>bad gateway</html>"), None);
        assert_eq!(
            generic_status_message(StatusCode::BAD_GATEWAY),
            "API error (HTTP 502)"
        );
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = GenerateContentRequest::new(vec![Content::text("user", "Hello")])
            .with_generation_settings(&GenerationSettings::default());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Hello");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["generationConfig"]["topP"], 1.0);
    }

    #[test]
    fn test_disabled_generation_settings_omitted() {
        let settings = GenerationSettings {
            enabled: false,
            ..GenerationSettings::default()
        };
        let request = GenerateContentRequest::new(vec![Content::text("user", "Hi")])
            .with_generation_settings(&settings);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_endpoint_excludes_key() {
        let transport = GeminiTransport::new(
            ApiKey::new("secret-key").unwrap(),
            ModelSettings::default(),
        )
        .with_base_url("http://localhost:9999/");

        assert_eq!(
            transport.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash-lite:generateContent"
        );
        let url = transport.request_url().unwrap();
        assert_eq!(url.query(), Some("key=secret-key"));
        assert!(!format!("{transport:?}").contains("secret-key"));
    }
}
