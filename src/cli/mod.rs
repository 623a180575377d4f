use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "reelscribe",
    about = "Reelscribe - Turn a creator's top-performing reels into scripts, transcripts, and industry insights",
    version,
    long_about = "A CLI tool that fetches a creator's recent reels, keeps the high performers, and enriches each one with a speech transcript, a shareable marketing script, and an industry-insight summary of its visuals."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch a creator's reels and generate a per-reel report
    Run {
        /// Public username of the creator
        #[arg(value_name = "USERNAME")]
        username: String,

        /// Number of reels to fetch
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Minimum play count a reel needs (overrides config)
        #[arg(long, value_name = "COUNT")]
        min_plays: Option<u64>,

        /// Concurrent reels in flight (overrides config)
        #[arg(long, value_name = "COUNT")]
        workers: Option<usize>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or initialize configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text report blocks
    Text,
    /// JSON array of report records
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
