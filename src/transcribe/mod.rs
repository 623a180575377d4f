use std::time::Duration;

use crate::clients::SpeechTranscription;
use crate::media::TempDownload;
use crate::pipeline::StageOutput;

/// Download an audio asset to a scoped transient file and transcribe it
/// whole.
///
/// Any download or transcription error becomes a marked failure; the stage
/// never raises. The transient file is removed on every exit path.
pub async fn transcribe_audio(
    transcription: &dyn SpeechTranscription,
    http: &reqwest::Client,
    audio_url: &str,
    timeout: Duration,
) -> StageOutput {
    let download = match TempDownload::fetch(http, audio_url, "m4a").await {
        Ok(download) => download,
        Err(e) => return StageOutput::Error(format!("Audio download error: {}", e)),
    };

    let audio = match download.read() {
        Ok(bytes) => bytes,
        Err(e) => return StageOutput::Error(format!("Audio read error: {}", e)),
    };

    let file_name = download.file_name();

    match tokio::time::timeout(timeout, transcription.transcribe(audio, &file_name)).await {
        Ok(Ok(transcript)) => StageOutput::Text(transcript),
        Ok(Err(e)) => StageOutput::Error(format!("Transcription error: {}", e)),
        Err(_) => StageOutput::Error("Transcription timed out".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockSpeechTranscription;

    #[tokio::test]
    async fn test_unreachable_audio_url_is_a_soft_failure() {
        let mut transcription = MockSpeechTranscription::new();
        transcription.expect_transcribe().times(0);

        let http = reqwest::Client::new();
        let outcome = transcribe_audio(
            &transcription,
            &http,
            "http://127.0.0.1:1/audio.m4a",
            Duration::from_secs(5),
        )
        .await;

        match outcome {
            StageOutput::Error(reason) => assert!(reason.contains("Audio download error")),
            StageOutput::Text(_) => panic!("expected soft failure"),
        }
    }
}
