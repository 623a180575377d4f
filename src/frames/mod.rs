use std::path::Path;

use tokio::process::Command;

use crate::media::TempDownload;
use crate::Result;

/// A single decoded still frame, as JPEG bytes, with its source offset.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub jpeg: Vec<u8>,
    pub offset_secs: u64,
}

/// Video stream properties needed to plan sampling.
#[derive(Debug, Clone, Copy)]
struct VideoProbe {
    frame_count: Option<u64>,
    frames_per_second: Option<f64>,
}

impl VideoProbe {
    /// Duration derived from frame count and frame rate. `None` when the
    /// frame rate is unavailable or zero.
    fn duration_secs(&self) -> Option<u64> {
        let frames = self.frame_count?;
        let fps = self.frames_per_second?;
        if fps <= 0.0 {
            return None;
        }
        Some((frames as f64 / fps) as u64)
    }
}

/// Samples time-spaced still frames from a video asset.
pub struct FrameSampler {
    http: reqwest::Client,
    interval_secs: u64,
    max_frames: usize,
}

impl FrameSampler {
    pub fn new(http: reqwest::Client, interval_secs: u64, max_frames: usize) -> Self {
        Self {
            http,
            // step_by(0) would panic
            interval_secs: interval_secs.max(1),
            max_frames,
        }
    }

    /// Download the video to a transient file and decode one frame per
    /// interval boundary, oldest first.
    ///
    /// Yields at most `max_frames` samples with strictly increasing offsets.
    /// Boundaries whose decode fails are skipped. A video without a usable
    /// frame rate yields an empty sequence.
    pub async fn sample(&self, video_url: &str) -> Result<Vec<FrameSample>> {
        let download = TempDownload::fetch(&self.http, video_url, "mp4").await?;
        let probe = probe_video(download.path()).await?;

        let Some(duration) = probe.duration_secs() else {
            tracing::warn!(video_url, "Video has no usable frame rate, skipping sampling");
            return Ok(Vec::new());
        };

        let frame_dir = tempfile::tempdir()?;
        let mut samples = Vec::new();

        for offset in sample_offsets(duration, self.interval_secs, self.max_frames) {
            let frame_path = frame_dir.path().join(format!("frame_{:06}.jpg", offset));

            if !extract_frame(download.path(), offset, &frame_path).await {
                tracing::debug!(video_url, offset, "Frame decode failed, skipping boundary");
                continue;
            }

            samples.push(FrameSample {
                jpeg: fs_err::read(&frame_path)?,
                offset_secs: offset,
            });
        }

        tracing::debug!(video_url, count = samples.len(), "Sampled frames");

        Ok(samples)
    }
}

/// Interval boundaries to decode at: every `interval_secs` starting at 0,
/// bounded by the video duration and `max_frames`.
fn sample_offsets(duration_secs: u64, interval_secs: u64, max_frames: usize) -> Vec<u64> {
    (0..duration_secs)
        .step_by(interval_secs.max(1) as usize)
        .take(max_frames)
        .collect()
}

/// Probe a video file with ffprobe and pick out the first video stream.
async fn probe_video(path: &Path) -> Result<VideoProbe> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            &path.to_string_lossy(),
        ])
        .output()
        .await?;

    if !output.status.success() {
        let error = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Failed to analyze video with ffprobe: {}", error);
    }

    let info: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    let empty_vec = vec![];
    let streams = info["streams"].as_array().unwrap_or(&empty_vec);
    let video_stream = streams
        .iter()
        .find(|stream| stream["codec_type"].as_str() == Some("video"));

    let Some(stream) = video_stream else {
        anyhow::bail!("File does not contain a video stream: {}", path.display());
    };

    Ok(VideoProbe {
        frame_count: stream["nb_frames"].as_str().and_then(|n| n.parse().ok()),
        frames_per_second: stream["avg_frame_rate"]
            .as_str()
            .and_then(parse_frame_rate),
    })
}

/// Parse ffprobe's fractional frame rate, e.g. "30000/1001".
fn parse_frame_rate(raw: &str) -> Option<f64> {
    let (num, den) = raw.split_once('/')?;
    let num: f64 = num.parse().ok()?;
    let den: f64 = den.parse().ok()?;
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

/// Decode one frame at `offset` seconds into `frame_path`. Returns false on
/// any decode failure.
async fn extract_frame(video_path: &Path, offset: u64, frame_path: &Path) -> bool {
    let result = Command::new("ffmpeg")
        .args([
            "-ss",
            &offset.to_string(),
            "-i",
            &video_path.to_string_lossy(),
            "-vframes",
            "1",
            "-q:v",
            "2",
            "-y",
            &frame_path.to_string_lossy(),
        ])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .output()
        .await;

    matches!(result, Ok(output) if output.status.success()) && frame_path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_offsets_duration_bounded() {
        // 35 seconds at a 10 second interval: the 40s boundary is past the end
        assert_eq!(sample_offsets(35, 10, 5), vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_sample_offsets_capped_at_max_frames() {
        assert_eq!(sample_offsets(100, 10, 5), vec![0, 10, 20, 30, 40]);
    }

    #[test]
    fn test_sample_offsets_strictly_increasing() {
        let offsets = sample_offsets(120, 7, 20);
        assert!(offsets.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_sample_offsets_zero_interval_clamped() {
        assert_eq!(sample_offsets(3, 0, 10), vec![0, 1, 2]);
    }

    #[test]
    fn test_sample_offsets_zero_duration() {
        assert!(sample_offsets(0, 10, 5).is_empty());
    }

    #[test]
    fn test_parse_frame_rate() {
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("garbage"), None);
    }

    #[test]
    fn test_duration_undefined_without_frame_rate() {
        let probe = VideoProbe {
            frame_count: Some(1050),
            frames_per_second: None,
        };
        assert_eq!(probe.duration_secs(), None);

        let probe = VideoProbe {
            frame_count: Some(1050),
            frames_per_second: Some(0.0),
        };
        assert_eq!(probe.duration_secs(), None);
    }

    #[test]
    fn test_duration_from_frame_count_and_rate() {
        let probe = VideoProbe {
            frame_count: Some(1050),
            frames_per_second: Some(30.0),
        };
        assert_eq!(probe.duration_secs(), Some(35));
    }
}
