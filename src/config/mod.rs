use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model selection for the AI services
    pub models: ModelConfig,

    /// Pipeline tuning
    pub pipeline: PipelineConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Chat model used for frame description, insight filtering, and script
    /// synthesis
    pub chat_model: String,

    /// Speech-to-text model
    pub transcription_model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum play count a reel needs to enter the pipeline
    pub min_play_count: u64,

    /// Seconds between sampled frames
    pub frame_interval_secs: u64,

    /// Maximum frames sampled per video
    pub max_frames: usize,

    /// Concurrent reels in flight
    pub workers: usize,

    /// Timeout for media downloads and AI service calls, in seconds
    pub request_timeout_secs: u64,

    /// Timeout for the discovery scrape, in seconds. Actor runs are slow.
    pub discovery_timeout_secs: u64,
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default output format
    pub default_output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelConfig {
                chat_model: "gpt-4o".to_string(),
                transcription_model: "whisper-1".to_string(),
            },
            pipeline: PipelineConfig {
                min_play_count: 1_000_000,
                frame_interval_secs: 10,
                max_frames: 5,
                workers: 4,
                request_timeout_secs: 120,
                discovery_timeout_secs: 600,
            },
            app: AppConfig {
                default_output_format: "text".to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save().await?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(&config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("reelscribe").join("config.yaml"))
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.models.chat_model.is_empty() {
            anyhow::bail!("Chat model must be configured");
        }

        if self.models.transcription_model.is_empty() {
            anyhow::bail!("Transcription model must be configured");
        }

        if self.pipeline.max_frames == 0 {
            anyhow::bail!("max_frames must be at least 1");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Chat Model: {}", self.models.chat_model);
        println!("  Transcription Model: {}", self.models.transcription_model);
        println!("  Min Play Count: {}", self.pipeline.min_play_count);
        println!(
            "  Frame Sampling: every {}s, max {} frames",
            self.pipeline.frame_interval_secs, self.pipeline.max_frames
        );
        println!("  Workers: {}", self.pipeline.workers);
        println!("  Default Format: {}", self.app.default_output_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.min_play_count, 1_000_000);
        assert_eq!(config.pipeline.frame_interval_secs, 10);
        assert_eq!(config.pipeline.max_frames, 5);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.models.chat_model, config.models.chat_model);
        assert_eq!(parsed.pipeline.workers, config.pipeline.workers);
    }

    #[test]
    fn test_validate_rejects_zero_max_frames() {
        let mut config = Config::default();
        config.pipeline.max_frames = 0;
        assert!(config.validate().is_err());
    }
}
