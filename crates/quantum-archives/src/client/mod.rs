//! Gemini API client.
//!
//! Provides an async HTTP client with:
//! - Connection pooling via reqwest
//! - Status-code mapping into [`ClientError`]
//!
//! There is deliberately no retry or caching layer: every call is issued once
//! and its failure is reported once.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::genai::{GenerateContentRequest, GenerateContentResponse};

/// A model that can answer `generateContent` requests.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send one request and wait for one response.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> ClientResult<GenerateContentResponse>;
}

/// Gemini REST client.
#[derive(Clone)]
pub struct GeminiClient {
    /// HTTP client.
    client: Client,

    /// API key (optional).
    api_key: Option<String>,

    /// API base URL, without trailing slash.
    api_base_url: String,

    /// Model name.
    model: String,
}

impl GeminiClient {
    /// Create a new client with the given configuration.
    ///
    /// A missing or malformed API key is logged, not returned: calls then fail
    /// upstream and the adapters degrade to their fallbacks.
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let base = Url::parse(&config.api_base_url)?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let api_key = match config.api_key {
            Some(key) => match reqwest::header::HeaderValue::from_str(&key) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert("x-goog-api-key", value);
                    Some(key)
                }
                Err(_) => {
                    tracing::error!("API key is not a valid header value; requests are sent without it");
                    None
                }
            },
            None => {
                tracing::error!(var = api::API_KEY_VAR, "API key is missing");
                None
            }
        };

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            api_key,
            api_base_url: base.as_str().trim_end_matches('/').to_string(),
            model: config.model,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Model this client talks to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the `generateContent` endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model)
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);

                Err(ClientError::rate_limited(retry_after))
            }
            401 | 403 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::unauthorized(text))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> ClientResult<GenerateContentResponse> {
        let url = self.endpoint();
        tracing::debug!(model = %self.model, turns = request.contents.len(), "generateContent");

        let body = serde_json::to_vec(request)?;
        let response = self.client.post(&url).body(body).send().await?;
        let response = self.handle_response(response).await?;

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ClientError::from)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("has_api_key", &self.has_api_key())
            .field("model", &self.model)
            .finish()
    }
}
