// SYNOID Voiceline - Synthesis Client (Google Cloud Text-to-Speech)
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{decode_envelope, SpeechSynthesizer};
use crate::error::ServiceError;

pub const DEFAULT_SYNTHESIS_ENDPOINT: &str =
    "https://texttospeech.googleapis.com/v1/text:synthesize";
pub const DEFAULT_VOICE: &str = "en-US-Wavenet-D";
const LANGUAGE_CODE: &str = "en-US";
const AUDIO_ENCODING: &str = "MP3";

pub struct GoogleTtsClient {
    client: reqwest::Client,
    endpoint: String,
    voice: String,
}

impl GoogleTtsClient {
    pub fn new(client: reqwest::Client, endpoint: &str, voice: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            voice: voice.to_string(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleTtsClient {
    async fn synthesize(&self, text: &str, api_key: &str) -> Result<String, ServiceError> {
        info!("[TTS] Synthesizing {} chars with voice {}", text.len(), self.voice);

        let body = SynthesizeRequestBody {
            input: SynthesisInput {
                text: text.to_string(),
            },
            voice: VoiceSelectionParams {
                language_code: LANGUAGE_CODE.to_string(),
                name: self.voice.clone(),
            },
            audio_config: AudioConfig {
                audio_encoding: AUDIO_ENCODING.to_string(),
            },
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(ServiceError::transport)?;

        let parsed: SynthesizeResponse = decode_envelope(resp).await?;

        match parsed.audio_content {
            Some(audio) if !audio.is_empty() => Ok(audio),
            _ => Err(ServiceError::MissingAudio),
        }
    }
}

// ── API request/response types ─────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequestBody {
    input: SynthesisInput,
    voice: VoiceSelectionParams,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelectionParams {
    language_code: String,
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: Option<String>,
}
