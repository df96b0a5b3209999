// SYNOID Voiceline - Error Taxonomy
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Every way a single pipeline step can fail.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("missing credential: {0}")]
    Config(&'static str),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream API error: {0}")]
    Upstream(String),

    #[error("unreadable upstream response: {0}")]
    ResponseParse(String),

    #[error("synthesis response carried no audio")]
    MissingAudio,

    #[error("storage failure at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed base64 audio: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl ServiceError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Classify a reqwest failure. Timeouts and connection errors are both
    /// transport-level; body decoding problems are never routed here.
    pub fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Config,
    Validation,
    Generation,
    Synthesis,
    Storage,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Validation => "validation",
            Self::Generation => "generation",
            Self::Synthesis => "synthesis",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal `Failed(stage, cause)` state of the pipeline.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {cause}")]
pub struct PipelineFailure {
    pub stage: FailureStage,
    #[source]
    pub cause: ServiceError,
}

impl PipelineFailure {
    pub fn new(stage: FailureStage, cause: ServiceError) -> Self {
        Self { stage, cause }
    }

    /// Validation failures are the caller's fault; everything else is ours.
    pub fn is_client_error(&self) -> bool {
        matches!(self.cause, ServiceError::Validation(_))
    }
}
