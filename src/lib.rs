// SYNOID Voiceline Library
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod clients;
pub mod config;
pub mod error;
pub mod log_sink;
pub mod pipeline;
pub mod sanitize;
pub mod server;
pub mod state;
pub mod store;
