//! Text-generation client for the Gemini `generateContent` REST endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 2000;
const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 512;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("missing API key; set GEMINI_API_KEY")]
    MissingApiKey,
    #[error("unsupported provider '{0}': only gemini is supported")]
    UnsupportedProvider(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("model returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerateError {
    fn is_retryable(&self) -> bool {
        match self {
            GenerateError::Server { status, .. } => *status == 429 || *status >= 500,
            GenerateError::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

// ── Wire types ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ErrorBody {
    message: Option<String>,
}

/// `gemini-2.0-flash` -> `models/gemini-2.0-flash`; blank -> default model.
pub fn model_path(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.is_empty() {
        format!("models/{}", crate::config::DEFAULT_MODEL)
    } else if trimmed.starts_with("models/") {
        trimmed.to_string()
    } else {
        format!("models/{}", trimmed)
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model_path: String,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> Result<Self, GenerateError> {
        if settings.provider != "gemini" {
            return Err(GenerateError::UnsupportedProvider(settings.provider.clone()));
        }
        if settings.api_key.is_empty() {
            return Err(GenerateError::MissingApiKey);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            model_path: model_path(&settings.model),
        })
    }

    /// Send `prompt`, backing off and retrying on rate limits and server errors.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, GenerateError> {
        let mut attempt = 0;
        loop {
            match self.generate_once(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < MAX_RETRIES => {
                    let backoff = Duration::from_millis(BASE_BACKOFF_MS * 2u64.pow(attempt));
                    warn!(
                        "Generation failed ({}), attempt {}/{}, backing off {:.1}s",
                        e,
                        attempt + 1,
                        MAX_RETRIES,
                        backoff.as_secs_f64()
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/{}:generateContent", API_BASE, self.model_path);
        let body = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        info!(model = %self.model_path, prompt_chars = prompt.len(), "calling generateContent");
        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let payload = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(server_error(status.as_u16(), &payload));
        }
        Ok(response_text(&payload))
    }
}

fn server_error(status: u16, payload: &str) -> GenerateError {
    let message = serde_json::from_str::<ErrorEnvelope>(payload)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| format!("Gemini error ({})", status));
    GenerateError::Server { status, message }
}

/// Parts of the first candidate, concatenated and trimmed. Anything
/// unparseable yields an empty string.
fn response_text(payload: &str) -> String {
    let resp: GenerateResponse = serde_json::from_str(payload).unwrap_or_default();
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<String>()
        })
        .unwrap_or_default()
        .trim()
        .to_string()
}
