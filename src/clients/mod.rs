// SYNOID Voiceline - Upstream API Clients
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod generation;
pub mod synthesis;

pub use generation::GeminiClient;
pub use synthesis::GoogleTtsClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ServiceError;

/// Turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, ServiceError>;
}

/// Turns text into base64-encoded audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, api_key: &str) -> Result<String, ServiceError>;
}

/// Shared response handling for the Google-style JSON envelope.
///
/// Order matters: a body that is not JSON is a parse error, an `error` field
/// wins over the status code, and only then is the expected shape checked.
pub(crate) async fn decode_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    let body = resp.text().await.map_err(ServiceError::transport)?;

    let value: Value = serde_json::from_str(&body)
        .map_err(|e| ServiceError::ResponseParse(format!("HTTP {}: {}", status, e)))?;

    if let Some(err) = value.get("error") {
        let message = err
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| err.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(ServiceError::Upstream(message));
    }

    if !status.is_success() {
        return Err(ServiceError::Upstream(format!("HTTP {}", status)));
    }

    serde_json::from_value(value).map_err(|e| ServiceError::ResponseParse(e.to_string()))
}
