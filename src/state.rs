use std::path::PathBuf;
use std::sync::Arc;

use crate::log_sink::LogSink;
use crate::pipeline::Pipeline;

pub struct ServerState {
    pub pipeline: Pipeline,
    pub log: Arc<dyn LogSink>,
    /// Static UI root served at `/`.
    pub public_dir: PathBuf,
}

impl ServerState {
    pub fn new(pipeline: Pipeline, log: Arc<dyn LogSink>, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            log,
            public_dir: public_dir.into(),
        }
    }
}
