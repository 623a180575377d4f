use chrono::{DateTime, Utc};

/// Visual summary value when a reel resolved no video asset.
pub const VISUAL_NOT_AVAILABLE: &str = "N/A";

/// Script value when the transcript was unusable and synthesis was skipped.
pub const NO_SCRIPT_MARKER: &str = "Transcription failed. No script generated.";

/// Output of a single enrichment stage: the produced text, or the reason
/// the stage failed.
///
/// Failures stay inside the report they belong to; they render as marked
/// strings and are never raised past the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutput {
    Text(String),
    Error(String),
}

impl StageOutput {
    pub fn is_text(&self) -> bool {
        matches!(self, StageOutput::Text(_))
    }

    /// Report-facing string: the text itself, or the marked failure reason.
    pub fn rendered(&self) -> String {
        match self {
            StageOutput::Text(text) => text.clone(),
            StageOutput::Error(reason) => format!("⚠️ {}", reason),
        }
    }
}

/// The transcript text, when it is present and worth synthesizing a script
/// from.
pub fn usable_transcript(subtitles: &StageOutput) -> Option<&str> {
    match subtitles {
        StageOutput::Text(text) if !text.trim().is_empty() => Some(text),
        _ => None,
    }
}

/// The aggregated output for one reel that passed the popularity filter.
///
/// Every surviving reel produces exactly one report; stage failures degrade
/// individual fields, never the report itself.
#[derive(Debug, Clone)]
pub struct ReelReport {
    pub url: String,

    pub comment_count: u64,
    pub like_count: u64,
    pub play_count: u64,

    /// Shareable marketing script, or a failure marker
    pub script: StageOutput,

    /// Speech transcript, or a failure marker
    pub subtitles: StageOutput,

    /// Industry-insight summary of the visuals; "N/A" without a video asset
    pub visual_description: StageOutput,
}

/// Ordered reports for one batch run, in filter-pass order. The only
/// durable artifact of a run.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub reports: Vec<ReelReport>,
    pub completed_at: DateTime<Utc>,
}

impl BatchResult {
    pub fn empty() -> Self {
        Self {
            reports: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
