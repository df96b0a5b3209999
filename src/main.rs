// SYNOID Voiceline Entry Point
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use synoid_voiceline::clients::{GeminiClient, GoogleTtsClient};
use synoid_voiceline::config::AppConfig;
use synoid_voiceline::log_sink::{FileLog, LogSink};
use synoid_voiceline::pipeline::{Pipeline, QueryRequest};
use synoid_voiceline::server;
use synoid_voiceline::state::ServerState;
use synoid_voiceline::store::ArtifactStore;

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "synoid-voiceline")]
#[command(about = "Prompt → text → speech pipeline server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the UI, the /query endpoint and generated outputs
    Serve {
        /// Port to listen on (overrides VOICELINE_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory generated artifacts are written to
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Directory holding index.html and other UI assets
        #[arg(long)]
        public_dir: Option<PathBuf>,
    },

    /// Run one prompt/line through the pipeline and print the result
    Query {
        #[arg(short, long)]
        prompt: String,

        #[arg(short, long)]
        line: String,

        /// Directory generated artifacts are written to
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn build_pipeline(config: &AppConfig, log: Arc<dyn LogSink>) -> anyhow::Result<Pipeline> {
    let http = config.http_client()?;
    let generator = Arc::new(GeminiClient::new(http.clone(), &config.generation_endpoint));
    let synthesizer = Arc::new(GoogleTtsClient::new(
        http,
        &config.synthesis_endpoint,
        &config.voice,
    ));

    Ok(Pipeline::new(
        generator,
        synthesizer,
        ArtifactStore::new(&config.output_dir),
        config.credentials.clone(),
        log,
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
    }
    info!("🛑 Shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve {
            port,
            output_dir,
            public_dir,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(dir) = public_dir {
                config.public_dir = dir;
            }

            let log: Arc<dyn LogSink> = Arc::new(FileLog::open(&config.log_file)?);
            let pipeline = build_pipeline(&config, log.clone())?;
            let state = Arc::new(ServerState::new(pipeline, log.clone(), &config.public_dir));

            let result = server::start_server(config.port, state, shutdown_signal()).await;
            log.close();
            result?;
        }
        Commands::Query {
            prompt,
            line,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }

            let log: Arc<dyn LogSink> = Arc::new(FileLog::open(&config.log_file)?);
            let pipeline = build_pipeline(&config, log.clone())?;

            let outcome = pipeline.run(&QueryRequest::new(&prompt, &line)).await;
            log.close();

            let result = outcome.context("Pipeline failed")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
