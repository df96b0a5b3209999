#![allow(dead_code)]

use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use synoid_voiceline::clients::{SpeechSynthesizer, TextGenerator};
use synoid_voiceline::config::Credentials;
use synoid_voiceline::error::ServiceError;
use synoid_voiceline::log_sink::MemoryLog;
use synoid_voiceline::pipeline::{Pipeline, PipelineConfig};
use synoid_voiceline::store::ArtifactStore;
use tempfile::TempDir;

/// "ID3\x03" — enough of an MP3 header to recognise on disk.
pub const AUDIO_B64: &str = "SUQzAw==";
pub const AUDIO_BYTES: &[u8] = b"ID3\x03";

#[derive(Clone)]
pub enum Reply {
    Ok(String),
    Upstream(String),
    MissingAudio,
}

impl Reply {
    fn resolve(&self) -> Result<String, ServiceError> {
        match self {
            Reply::Ok(text) => Ok(text.clone()),
            Reply::Upstream(msg) => Err(ServiceError::Upstream(msg.clone())),
            Reply::MissingAudio => Err(ServiceError::MissingAudio),
        }
    }
}

/// Replays `replies` in order, repeating the last one. Records every input.
pub struct Scripted {
    replies: Vec<Reply>,
    inputs: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl Scripted {
    pub fn new(replies: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies,
            inputs: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn ok(text: &str) -> Arc<Self> {
        Self::new(vec![Reply::Ok(text.to_string())])
    }

    pub fn upstream(msg: &str) -> Arc<Self> {
        Self::new(vec![Reply::Upstream(msg.to_string())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// (text, api_key) of every call so far.
    pub fn inputs(&self) -> Vec<(String, String)> {
        self.inputs.lock().unwrap().clone()
    }

    fn next(&self, input: &str, api_key: &str) -> Result<String, ServiceError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs
            .lock()
            .unwrap()
            .push((input.to_string(), api_key.to_string()));
        let idx = n.min(self.replies.len() - 1);
        self.replies[idx].resolve()
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, prompt: &str, api_key: &str) -> Result<String, ServiceError> {
        tokio::task::yield_now().await;
        self.next(prompt, api_key)
    }
}

#[async_trait]
impl SpeechSynthesizer for Scripted {
    async fn synthesize(&self, text: &str, api_key: &str) -> Result<String, ServiceError> {
        tokio::task::yield_now().await;
        self.next(text, api_key)
    }
}

/// "Audio" is the input text itself, so an `.mp3` on disk names the text it
/// was synthesized from. Input equal to `slow_text` takes `delay` to answer.
pub struct EchoSynthesizer {
    slow_text: String,
    delay: Duration,
}

impl EchoSynthesizer {
    pub fn new(slow_text: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            slow_text: slow_text.to_string(),
            delay,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for EchoSynthesizer {
    async fn synthesize(&self, text: &str, _api_key: &str) -> Result<String, ServiceError> {
        if text == self.slow_text {
            tokio::time::sleep(self.delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        Ok(base64::engine::general_purpose::STANDARD.encode(text))
    }
}

pub fn keys() -> Credentials {
    Credentials::new(Some("gen-key".to_string()), Some("tts-key".to_string()))
}

pub struct Harness {
    pub dir: TempDir,
    pub generator: Arc<Scripted>,
    pub synthesizer: Arc<Scripted>,
    pub log: Arc<MemoryLog>,
    pub pipeline: Pipeline,
}

impl Harness {
    pub fn new(generator: Arc<Scripted>, synthesizer: Arc<Scripted>) -> Self {
        Self::with_credentials(generator, synthesizer, keys())
    }

    pub fn with_credentials(
        generator: Arc<Scripted>,
        synthesizer: Arc<Scripted>,
        credentials: Credentials,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(MemoryLog::new());
        let pipeline = Pipeline::new(
            generator.clone(),
            synthesizer.clone(),
            ArtifactStore::new(dir.path().join("output")),
            credentials,
            log.clone(),
        );
        Self {
            dir,
            generator,
            synthesizer,
            log,
            pipeline,
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.pipeline = self.pipeline.with_config(config);
        self
    }

    pub fn output(&self) -> std::path::PathBuf {
        self.dir.path().join("output")
    }
}
