// SYNOID Voiceline - Configuration & Secrets
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, Secret};

use crate::clients::generation::DEFAULT_GENERATION_ENDPOINT;
use crate::clients::synthesis::{DEFAULT_SYNTHESIS_ENDPOINT, DEFAULT_VOICE};

pub const GENERATION_KEY_VAR: &str = "GEMINI_API_KEY";
pub const SYNTHESIS_KEY_VAR: &str = "TTS_API_KEY";

/// The two upstream API keys. Either may be absent; the pipeline reports that
/// per request instead of refusing to start.
#[derive(Clone, Default)]
pub struct Credentials {
    generation: Option<Secret<String>>,
    synthesis: Option<Secret<String>>,
}

impl Credentials {
    pub fn new(generation: Option<String>, synthesis: Option<String>) -> Self {
        Self {
            generation: generation.map(Secret::new),
            synthesis: synthesis.map(Secret::new),
        }
    }

    pub fn generation_key(&self) -> Option<&str> {
        self.generation.as_ref().map(|s| s.expose_secret().as_str())
    }

    pub fn synthesis_key(&self) -> Option<&str> {
        self.synthesis.as_ref().map(|s| s.expose_secret().as_str())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &Option<Secret<String>>| if s.is_some() { "[REDACTED]" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("generation", &redact(&self.generation))
            .field("synthesis", &redact(&self.synthesis))
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub output_dir: PathBuf,
    pub public_dir: PathBuf,
    pub log_file: PathBuf,
    pub request_timeout: Duration,
    pub generation_endpoint: String,
    pub synthesis_endpoint: String,
    pub voice: String,
    pub credentials: Credentials,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            output_dir: PathBuf::from("output"),
            public_dir: PathBuf::from("public"),
            log_file: PathBuf::from("server.log"),
            request_timeout: Duration::from_secs(30),
            generation_endpoint: DEFAULT_GENERATION_ENDPOINT.to_string(),
            synthesis_endpoint: DEFAULT_SYNTHESIS_ENDPOINT.to_string(),
            voice: DEFAULT_VOICE.to_string(),
            credentials: Credentials::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(port) = get("VOICELINE_PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("VOICELINE_PORT is not a valid port: {}", port))?;
        }
        if let Some(secs) = get("VOICELINE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("VOICELINE_TIMEOUT_SECS is not a number: {}", secs))?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = get("VOICELINE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("VOICELINE_PUBLIC_DIR") {
            config.public_dir = PathBuf::from(dir);
        }
        if let Some(file) = get("VOICELINE_LOG_FILE") {
            config.log_file = PathBuf::from(file);
        }
        if let Some(endpoint) = get("GEMINI_ENDPOINT") {
            config.generation_endpoint = endpoint;
        }
        if let Some(endpoint) = get("TTS_ENDPOINT") {
            config.synthesis_endpoint = endpoint;
        }
        if let Some(voice) = get("TTS_VOICE") {
            config.voice = voice;
        }

        config.credentials = Credentials::new(get(GENERATION_KEY_VAR), get(SYNTHESIS_KEY_VAR));

        Ok(config)
    }

    /// HTTP client shared by both upstream clients, with the per-call timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")
    }
}
