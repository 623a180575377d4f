use std::time::Duration;

use futures_util::future::join_all;

use crate::clients::{TextGeneration, VisionDescription};
use crate::frames::FrameSample;
use crate::pipeline::StageOutput;

/// System directive for distilling frame descriptions into industry insight.
const INSIGHT_DIRECTIVE: &str = "You are an expert video analyst working for a media agency. \
Your job is to extract only *industry-relevant insights* from visual descriptions. \
Ignore generic or personal content like people standing, smiling, or backgrounds. \
Focus on things that indicate a niche, topic, market, brand, event, or any industrial/commercial element. \
Return a concise paragraph summarizing the relevant content only.";

/// System directive for turning subtitles into a shareable script.
const SCRIPT_DIRECTIVE: &str = "You are a professional video content creator and scriptwriter with expertise in turning raw subtitles into engaging, \
shareable video scripts. Your scripts should include:
1. A compelling hook to grab the viewer's attention in the first 5 seconds.
2. A clear introduction that sets context.
3. A logical flow that weaves in the original subtitles verbatim where they add authenticity.
4. Brief expansions or transitions that enhance clarity, but never alter the meaning of the subtitle text.
5. A strong closing with a clear call to action (e.g., \"Like, share, and subscribe\").
6. On-screen text cues and suggestions for visuals.";

/// Describe each frame, then distill the descriptions into one
/// industry-insight summary.
///
/// Frame descriptions are independent: a failed or timed-out vision call
/// contributes an empty description instead of aborting the stage. Only the
/// final summarization call can fail the stage, and then only softly.
pub async fn extract_visual_insight(
    vision: &dyn VisionDescription,
    textgen: &dyn TextGeneration,
    frames: &[FrameSample],
    timeout: Duration,
) -> StageOutput {
    let descriptions = describe_frames(vision, frames, timeout).await;

    if descriptions.iter().all(|text| text.trim().is_empty()) {
        return StageOutput::Error("Visual analysis produced no frame descriptions".to_string());
    }

    let visual_text = descriptions.join("\n");
    let user = format!("Here are the visual frame descriptions:\n{}", visual_text);

    match tokio::time::timeout(timeout, textgen.generate(INSIGHT_DIRECTIVE, &user)).await {
        Ok(Ok(summary)) => StageOutput::Text(summary),
        Ok(Err(e)) => StageOutput::Error(format!("Insight filtering error: {}", e)),
        Err(_) => StageOutput::Error("Insight filtering timed out".to_string()),
    }
}

/// One vision call per frame, concurrently; order follows the frame order.
async fn describe_frames(
    vision: &dyn VisionDescription,
    frames: &[FrameSample],
    timeout: Duration,
) -> Vec<String> {
    let calls = frames.iter().map(|frame| async move {
        match tokio::time::timeout(timeout, vision.describe_frame(&frame.jpeg)).await {
            Ok(Ok(description)) => description,
            Ok(Err(e)) => {
                tracing::warn!(offset_secs = frame.offset_secs, error = %e, "Frame description failed");
                String::new()
            }
            Err(_) => {
                tracing::warn!(offset_secs = frame.offset_secs, "Frame description timed out");
                String::new()
            }
        }
    });

    join_all(calls).await
}

/// Generate a shareable script from a transcript.
///
/// Callers gate this on a usable transcript; see
/// [`crate::pipeline::usable_transcript`].
pub async fn synthesize_script(
    textgen: &dyn TextGeneration,
    transcript: &str,
    timeout: Duration,
) -> StageOutput {
    let user = format!("Here are the subtitles: {}", transcript);

    match tokio::time::timeout(timeout, textgen.generate(SCRIPT_DIRECTIVE, &user)).await {
        Ok(Ok(script)) => StageOutput::Text(script),
        Ok(Err(e)) => StageOutput::Error(format!("Script generation error: {}", e)),
        Err(_) => StageOutput::Error("Script generation timed out".to_string()),
    }
}
