use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};

use crate::clients::apify::{ApifyClient, ApifyError};
use crate::clients::openai::OpenAiClient;
use crate::clients::{PostDiscovery, SpeechTranscription, TextGeneration, VisionDescription};
use crate::config::Config;
use crate::frames::FrameSampler;
use crate::reels::{self, Reel};
use crate::{media, synth, transcribe, utils};
use crate::{ReelscribeError, Result};

pub mod report;

pub use report::{
    usable_transcript, BatchResult, ReelReport, StageOutput, NO_SCRIPT_MARKER,
    VISUAL_NOT_AVAILABLE,
};

/// Drives the enrichment pipeline over a creator's reels.
///
/// Holds one client per external capability; stages receive them as
/// dependencies, so tests can substitute mocks without process-wide state.
pub struct Pipeline {
    config: Config,
    http: reqwest::Client,
    discovery: Arc<dyn PostDiscovery>,
    transcription: Arc<dyn SpeechTranscription>,
    vision: Arc<dyn VisionDescription>,
    textgen: Arc<dyn TextGeneration>,
}

impl Pipeline {
    /// Create a pipeline backed by the real Apify and OpenAI services.
    ///
    /// Fails fast when the required API tokens are not in the environment;
    /// nothing is fetched yet.
    pub fn new(config: Config) -> Result<Self> {
        let apify_token = std::env::var("APIFY_TOKEN").map_err(|_| {
            ReelscribeError::ConfigError("APIFY_TOKEN environment variable not set".to_string())
        })?;
        let openai_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ReelscribeError::ConfigError("OPENAI_API_KEY environment variable not set".to_string())
        })?;

        let openai = Arc::new(OpenAiClient::new(
            openai_key,
            config.models.chat_model.clone(),
            config.models.transcription_model.clone(),
        ));

        let http = reqwest::Client::builder()
            .timeout(config.pipeline.request_timeout())
            .build()?;

        Ok(Self {
            http,
            discovery: Arc::new(ApifyClient::new(apify_token)),
            transcription: openai.clone(),
            vision: openai.clone(),
            textgen: openai,
            config,
        })
    }

    /// Create a pipeline with explicit capability clients.
    pub fn with_clients(
        config: Config,
        discovery: Arc<dyn PostDiscovery>,
        transcription: Arc<dyn SpeechTranscription>,
        vision: Arc<dyn VisionDescription>,
        textgen: Arc<dyn TextGeneration>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            discovery,
            transcription,
            vision,
            textgen,
        }
    }

    /// Run one batch: discover, filter, enrich, aggregate.
    ///
    /// Discovery problems abort the run; everything after the filter is
    /// isolated per reel, so the result always holds one report per
    /// surviving reel.
    pub async fn run_batch(&self, handle: &str, limit: u32) -> Result<BatchResult> {
        let started = std::time::Instant::now();

        tracing::info!(handle, limit, "Fetching reels");

        let discovery_call = self.discovery.list_posts(handle, limit);
        let records =
            match tokio::time::timeout(self.config.pipeline.discovery_timeout(), discovery_call)
                .await
            {
                Ok(Ok(records)) => records,
                Ok(Err(e)) => return Err(batch_error(e).into()),
                Err(_) => {
                    return Err(ReelscribeError::DiscoveryFailed(format!(
                        "timed out after {}s",
                        self.config.pipeline.discovery_timeout_secs
                    ))
                    .into())
                }
            };

        let all = Reel::from_records(records);
        if all.is_empty() {
            tracing::warn!(handle, "No reels returned by discovery");
            return Ok(BatchResult::empty());
        }

        let survivors =
            reels::filter_high_performers(all, self.config.pipeline.min_play_count);
        if survivors.is_empty() {
            tracing::warn!(
                handle,
                min_play_count = self.config.pipeline.min_play_count,
                "No reels passed the popularity filter"
            );
            return Ok(BatchResult::empty());
        }

        tracing::info!(count = survivors.len(), "Enriching high-performing reels");

        let progress = ProgressBar::new(survivors.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap(),
        );
        progress.set_message("Enriching reels...");

        let workers = self.config.pipeline.workers.max(1);
        let reports = stream::iter(survivors)
            .map(|reel| {
                let progress = progress.clone();
                async move {
                    let report = self.process_reel(reel).await;
                    progress.inc(1);
                    report
                }
            })
            .buffered(workers)
            .collect::<Vec<_>>()
            .await;

        progress.finish_with_message("Batch complete");

        tracing::info!(
            reports = reports.len(),
            elapsed = %utils::format_duration(started.elapsed().as_secs_f64()),
            "Batch complete"
        );

        Ok(BatchResult {
            reports,
            completed_at: chrono::Utc::now(),
        })
    }

    /// Enrich one reel. Never fails: each branch degrades to a marked field.
    async fn process_reel(&self, reel: Reel) -> ReelReport {
        tracing::info!(url = %reel.url, play_count = reel.play_count, "Processing reel");

        let timeout = self.config.pipeline.request_timeout();

        // Resolution runs a discovery actor, so it gets the longer timeout.
        let asset = media::resolve_assets(
            self.discovery.as_ref(),
            &reel.url,
            self.config.pipeline.discovery_timeout(),
        )
        .await;

        // The branches are independent; join both before finalizing.
        let (visual_description, subtitles) = tokio::join!(
            self.visual_branch(asset.video_url.as_deref()),
            self.transcription_branch(asset.audio_url.as_deref()),
        );

        let script = match usable_transcript(&subtitles) {
            Some(transcript) => {
                synth::synthesize_script(self.textgen.as_ref(), transcript, timeout).await
            }
            None => StageOutput::Error(NO_SCRIPT_MARKER.to_string()),
        };

        ReelReport {
            url: reel.url,
            comment_count: reel.comment_count,
            like_count: reel.like_count,
            play_count: reel.play_count,
            script,
            subtitles,
            visual_description,
        }
    }

    async fn visual_branch(&self, video_url: Option<&str>) -> StageOutput {
        let Some(video_url) = video_url else {
            return StageOutput::Text(VISUAL_NOT_AVAILABLE.to_string());
        };

        let sampler = FrameSampler::new(
            self.http.clone(),
            self.config.pipeline.frame_interval_secs,
            self.config.pipeline.max_frames,
        );

        let frames = match sampler.sample(video_url).await {
            Ok(frames) => frames,
            Err(e) => return StageOutput::Error(format!("Video analysis error: {}", e)),
        };

        if frames.is_empty() {
            return StageOutput::Error("No frames could be sampled from the video".to_string());
        }

        synth::extract_visual_insight(
            self.vision.as_ref(),
            self.textgen.as_ref(),
            &frames,
            self.config.pipeline.request_timeout(),
        )
        .await
    }

    async fn transcription_branch(&self, audio_url: Option<&str>) -> StageOutput {
        let Some(audio_url) = audio_url else {
            return StageOutput::Error("No audio stream resolved".to_string());
        };

        transcribe::transcribe_audio(
            self.transcription.as_ref(),
            &self.http,
            audio_url,
            self.config.pipeline.request_timeout(),
        )
        .await
    }
}

/// Map a discovery failure to the batch-level error taxonomy.
fn batch_error(e: anyhow::Error) -> ReelscribeError {
    let is_auth = e
        .downcast_ref::<ApifyError>()
        .map(ApifyError::is_auth)
        .unwrap_or(false);

    if is_auth {
        ReelscribeError::AuthenticationFailed(format!(
            "discovery token is invalid or expired: {}",
            e
        ))
    } else {
        ReelscribeError::DiscoveryFailed(e.to_string())
    }
}
