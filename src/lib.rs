//! Reelscribe - A Rust CLI tool for mining a creator's top-performing reels
//!
//! This library fetches a creator's recent reels, keeps the high performers,
//! and enriches each one with a transcript, a shareable marketing script, and
//! an industry-insight summary of its visuals, using external discovery and
//! AI services behind capability traits.

pub mod cli;
pub mod clients;
pub mod config;
pub mod frames;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod reels;
pub mod synth;
pub mod transcribe;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use pipeline::{BatchResult, Pipeline, ReelReport, StageOutput};
pub use reels::Reel;

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types that abort an entire batch run
#[derive(thiserror::Error, Debug)]
pub enum ReelscribeError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Post discovery failed: {0}")]
    DiscoveryFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("File operation failed: {0}")]
    FileError(String),
}
