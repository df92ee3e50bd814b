//! Text generation client.
//!
//! `LlmBackend` is one raw request to a generation endpoint. The
//! `TextGenerationClient` wraps a backend with the fixed retry policy and
//! turns exhausted retries into `Generation::Failed` instead of an error, so
//! callers branch on the result type rather than sniffing the text.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{LlmConfig, RetryConfig};

/// Transport-level failures of a single attempt
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("HTTP {0} from backend")]
    Status(u16),

    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// One generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f64,
}

/// A text-generation backend that performs exactly one attempt per call
pub trait LlmBackend: Send + Sync {
    fn complete(&self, request: &GenerateRequest) -> Result<String, LlmError>;
}

/// Ollama `/api/generate` backend (non-streaming)
pub struct OllamaBackend {
    endpoint: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl OllamaBackend {
    pub fn new(config: &LlmConfig) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
            client,
        })
    }
}

impl LlmBackend for OllamaBackend {
    fn complete(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.endpoint);

        let body = serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {"temperature": request.temperature},
        });

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::Http(format!("Request failed: {}", e))
            }
        })?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status().as_u16()));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidBody(e.to_string()))?;

        Ok(json
            .get("response")
            .and_then(|r| r.as_str())
            .unwrap_or("")
            .trim()
            .to_string())
    }
}

/// Outcome of a generation after retries
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    Text(String),
    /// Every attempt failed; `message` describes the last failure
    Failed { message: String },
}

impl Generation {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Text for places that need in-band content, such as debate turns.
    /// Failures become a JSON object with an `error` field.
    pub fn into_utterance(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Failed { message } => error_payload(&message),
        }
    }
}

/// JSON-shaped error payload carrying an `error` field
pub fn error_payload(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Client with default model, temperature and retry policy
pub struct TextGenerationClient<B: LlmBackend> {
    backend: B,
    model: String,
    temperature: f64,
    retry: RetryConfig,
}

impl TextGenerationClient<OllamaBackend> {
    /// Build the real client from configuration
    pub fn from_config(llm: &LlmConfig, retry: &RetryConfig) -> anyhow::Result<Self> {
        Ok(Self::new(OllamaBackend::new(llm)?, llm, retry.clone()))
    }
}

impl<B: LlmBackend> TextGenerationClient<B> {
    pub fn new(backend: B, llm: &LlmConfig, retry: RetryConfig) -> Self {
        Self {
            backend,
            model: llm.model.clone(),
            temperature: llm.temperature,
            retry,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn default_temperature(&self) -> f64 {
        self.temperature
    }

    /// Generate at the default temperature
    pub fn generate(&self, prompt: &str) -> Generation {
        self.generate_at(prompt, self.temperature)
    }

    /// Generate at an explicit temperature, retrying transport failures
    pub fn generate_at(&self, prompt: &str, temperature: f64) -> Generation {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            temperature,
        };
        let attempts = self.retry.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            debug!(
                "Generation attempt {}/{} (model={}, temperature={})",
                attempt, attempts, request.model, temperature
            );
            match self.backend.complete(&request) {
                Ok(text) => {
                    if attempt > 1 {
                        info!("Generation succeeded on attempt {}", attempt);
                    }
                    return Generation::Text(text);
                }
                Err(e) => {
                    warn!("Generation attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                    if attempt < attempts {
                        std::thread::sleep(self.retry.delay());
                    }
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt made".to_string());
        Generation::Failed {
            message: format!(
                "Failed to connect to text-generation backend after {} attempts: {}",
                attempts, reason
            ),
        }
    }
}

/// Scripted backend for tests.
///
/// Pops responses in order; the last one repeats once the script is down to
/// a single entry. Every request is recorded.
pub struct FakeLlmClient {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl FakeLlmClient {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same text
    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    /// Always fail with the same error
    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl LlmBackend for FakeLlmClient {
    fn complete(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        let mut responses = self
            .responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match responses.len() {
            0 => Err(LlmError::InvalidBody("fake client has no responses".to_string())),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

/// Zero-delay retry policy for tests and dry runs
pub fn no_delay_retry(attempts: u32) -> RetryConfig {
    RetryConfig {
        attempts,
        delay_secs: 0,
    }
}
