// SYNOID Voiceline - Generation → Speech Orchestrator
// Copyright (c) 2026 Xing_The_Creator | SYNOID
//
// Runs one request through:
//   Validating → Generating → PersistingText → Synthesizing → PersistingAudio → Done
// Any stage may end in `PipelineFailure { stage, cause }`. Nothing is retried.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::clients::{SpeechSynthesizer, TextGenerator};
use crate::config::{Credentials, GENERATION_KEY_VAR, SYNTHESIS_KEY_VAR};
use crate::error::{FailureStage, PipelineFailure, ServiceError};
use crate::log_sink::LogSink;
use crate::store::{ArtifactKey, ArtifactStore};

/// Appended to every generation prompt so the answer reads well aloud.
pub const TTS_INSTRUCTION: &str = "Respond in plain conversational text suitable for text-to-speech. \
Do not use markdown, bullet points, headings, emojis, or special characters.";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub line: String,
}

impl QueryRequest {
    pub fn new(prompt: &str, line: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            line: line.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    #[serde(rename = "response")]
    pub response_text: String,
    #[serde(rename = "filePath")]
    pub audio_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    Generating,
    PersistingText,
    Synthesizing,
    PersistingAudio,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Validating => "validating",
            Self::Generating => "generating",
            Self::PersistingText => "persisting text",
            Self::Synthesizing => "synthesizing",
            Self::PersistingAudio => "persisting audio",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a failed artifact write does to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Log the failure and keep going.
    BestEffort,
    /// Fail the request.
    Required,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub text_policy: PersistPolicy,
    pub audio_policy: PersistPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            text_policy: PersistPolicy::BestEffort,
            audio_policy: PersistPolicy::Required,
        }
    }
}

/// One async mutex per artifact key, so the `.txt`/`.mp3` pair on disk
/// always comes from the same request.
#[derive(Default)]
struct KeyLocks {
    inner: Mutex<HashMap<ArtifactKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyLocks {
    fn handle(&self, key: &ArtifactKey) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        // Entries only the map still references are idle.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(key.clone()).or_default().clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

pub struct Pipeline {
    generator: Arc<dyn TextGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    store: ArtifactStore,
    credentials: Credentials,
    log: Arc<dyn LogSink>,
    config: PipelineConfig,
    locks: KeyLocks,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        store: ArtifactStore,
        credentials: Credentials,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            generator,
            synthesizer,
            store,
            credentials,
            log,
            config: PipelineConfig::default(),
            locks: KeyLocks::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub async fn run(&self, request: &QueryRequest) -> Result<PipelineResult, PipelineFailure> {
        self.enter("-", PipelineStage::Validating);
        let (generation_key, synthesis_key) = self.validate(request)?;

        let key = ArtifactKey::derive(&request.prompt, &request.line);
        let label = format!("{}/{}", key.directory, key.file_base);
        self.store
            .ensure_directory(&key)
            .await
            .map_err(|e| self.fail(&label, FailureStage::Storage, e))?;

        self.enter(&label, PipelineStage::Generating);
        let prompt_text = compose_prompt(&request.prompt, &request.line);
        let text = self
            .generator
            .generate(&prompt_text, generation_key)
            .await
            .map_err(|e| self.fail(&label, FailureStage::Generation, e))?;

        let lock = self.locks.handle(&key);
        let _guard = lock.lock().await;

        self.enter(&label, PipelineStage::PersistingText);
        let text_path = self.store.text_path(&key);
        let written = self.store.write_text(&text_path, &text).await;
        self.apply_policy(&label, self.config.text_policy, written)?;

        self.enter(&label, PipelineStage::Synthesizing);
        let audio = self
            .synthesizer
            .synthesize(&text, synthesis_key)
            .await
            .map_err(|e| self.fail(&label, FailureStage::Synthesis, e))?;

        self.enter(&label, PipelineStage::PersistingAudio);
        let audio_path = self.store.audio_path(&key);
        let written = self.store.write_binary(&audio_path, &audio).await;
        self.apply_policy(&label, self.config.audio_policy, written)?;

        self.enter(&label, PipelineStage::Done);
        Ok(PipelineResult {
            response_text: text,
            audio_path: key.public_audio_path(),
        })
    }

    /// Credentials first, then the request body. Runs before any I/O.
    fn validate(&self, request: &QueryRequest) -> Result<(&str, &str), PipelineFailure> {
        let generation_key = self
            .credentials
            .generation_key()
            .ok_or_else(|| self.fail("-", FailureStage::Config, ServiceError::Config(GENERATION_KEY_VAR)))?;
        let synthesis_key = self
            .credentials
            .synthesis_key()
            .ok_or_else(|| self.fail("-", FailureStage::Config, ServiceError::Config(SYNTHESIS_KEY_VAR)))?;

        if request.prompt.trim().is_empty() {
            let cause = ServiceError::Validation("prompt must not be empty".to_string());
            return Err(self.fail("-", FailureStage::Validation, cause));
        }
        if request.line.trim().is_empty() {
            let cause = ServiceError::Validation("line must not be empty".to_string());
            return Err(self.fail("-", FailureStage::Validation, cause));
        }

        Ok((generation_key, synthesis_key))
    }

    fn apply_policy(
        &self,
        label: &str,
        policy: PersistPolicy,
        outcome: Result<(), ServiceError>,
    ) -> Result<(), PipelineFailure> {
        match (outcome, policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), PersistPolicy::Required) => Err(self.fail(label, FailureStage::Storage, e)),
            (Err(e), PersistPolicy::BestEffort) => {
                warn!("[PIPELINE] {} write failed, continuing: {}", label, e);
                self.log
                    .append(&format!("[{}] best-effort write failed, continuing: {}", label, e));
                Ok(())
            }
        }
    }

    fn enter(&self, label: &str, stage: PipelineStage) {
        info!("[PIPELINE] {} -> {}", label, stage);
        self.log.append(&format!("[{}] {}", label, stage));
    }

    fn fail(&self, label: &str, stage: FailureStage, cause: ServiceError) -> PipelineFailure {
        let failure = PipelineFailure::new(stage, cause);
        error!("[PIPELINE] {} failed: {}", label, failure);
        self.log.append(&format!("[{}] failed: {}", label, failure));
        failure
    }
}

fn compose_prompt(prompt: &str, line: &str) -> String {
    format!("{} {} {}", prompt, line, TTS_INSTRUCTION)
}
