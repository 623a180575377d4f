use std::io::Write;
use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::clients::PostDiscovery;
use crate::utils;
use crate::Result;

/// Resolved downloadable media locations for one reel. The URIs are
/// transient and owned by the run that resolved them.
#[derive(Debug, Clone, Default)]
pub struct MediaAsset {
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
}

impl MediaAsset {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Resolve the audio and video locations for a post URL.
///
/// Never fails: any resolver error, malformed payload, empty result set, or
/// timeout is logged and mapped to an empty asset, so one bad reel cannot
/// abort the batch.
pub async fn resolve_assets(
    discovery: &dyn PostDiscovery,
    post_url: &str,
    timeout: Duration,
) -> MediaAsset {
    let medias = match tokio::time::timeout(timeout, discovery.resolve_media(post_url)).await {
        Ok(Ok(medias)) => medias,
        Ok(Err(e)) => {
            tracing::warn!(post_url, error = %e, "Media resolution failed");
            return MediaAsset::none();
        }
        Err(_) => {
            tracing::warn!(post_url, "Media resolution timed out");
            return MediaAsset::none();
        }
    };

    split_media_entries(medias.into_iter().map(|m| m.url).collect())
}

/// The resolver dataset orders media entries [video, audio]; there is no
/// type tag to check against. Entries past the first two are ignored.
fn split_media_entries(urls: Vec<String>) -> MediaAsset {
    let mut urls = urls.into_iter();
    let video_url = urls.next();
    let audio_url = urls.next();

    MediaAsset {
        audio_url,
        video_url,
    }
}

/// A media file downloaded to a transient path.
///
/// The underlying file is removed when the value is dropped, on every exit
/// path including errors and cancellation.
pub struct TempDownload {
    file: NamedTempFile,
}

impl TempDownload {
    /// Stream a URL to a fresh temp file.
    pub async fn fetch(client: &reqwest::Client, url: &str, fallback_ext: &str) -> Result<Self> {
        let suffix = format!(".{}", utils::file_extension_from_url(url, fallback_ext));
        let prefix = format!("reelscribe_{}_", &Uuid::new_v4().to_string()[..8]);
        let file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile()?;

        tracing::debug!(url, path = %file.path().display(), "Downloading media");

        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Failed to download media: HTTP {}", response.status());
        }

        let mut out = file.as_file();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.write_all(&chunk)?;
        }
        out.flush()?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// File name the download was stored under.
    pub fn file_name(&self) -> String {
        self.file
            .path()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string())
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(fs_err::read(self.path())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{MediaEntry, MockPostDiscovery};

    fn entries(urls: &[&str]) -> Vec<MediaEntry> {
        urls.iter()
            .map(|u| MediaEntry {
                url: u.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_split_orders_video_then_audio() {
        let asset = split_media_entries(vec![
            "https://cdn/video.mp4".to_string(),
            "https://cdn/audio.m4a".to_string(),
        ]);
        assert_eq!(asset.video_url.as_deref(), Some("https://cdn/video.mp4"));
        assert_eq!(asset.audio_url.as_deref(), Some("https://cdn/audio.m4a"));
    }

    #[test]
    fn test_split_single_entry_is_video_only() {
        let asset = split_media_entries(vec!["https://cdn/video.mp4".to_string()]);
        assert_eq!(asset.video_url.as_deref(), Some("https://cdn/video.mp4"));
        assert!(asset.audio_url.is_none());
    }

    #[test]
    fn test_split_empty() {
        let asset = split_media_entries(Vec::new());
        assert!(asset.video_url.is_none());
        assert!(asset.audio_url.is_none());
    }

    #[tokio::test]
    async fn test_resolve_assets_success() {
        let mut discovery = MockPostDiscovery::new();
        discovery
            .expect_resolve_media()
            .returning(|_| Ok(entries(&["https://cdn/v.mp4", "https://cdn/a.m4a"])));

        let asset = resolve_assets(&discovery, "https://post/x", Duration::from_secs(5)).await;
        assert_eq!(asset.video_url.as_deref(), Some("https://cdn/v.mp4"));
        assert_eq!(asset.audio_url.as_deref(), Some("https://cdn/a.m4a"));
    }

    #[test]
    fn test_resolve_assets_error_is_soft() {
        let mut discovery = MockPostDiscovery::new();
        discovery
            .expect_resolve_media()
            .returning(|_| Err(anyhow::anyhow!("actor run FAILED")));

        let asset = tokio_test::block_on(resolve_assets(
            &discovery,
            "https://post/x",
            Duration::from_secs(5),
        ));
        assert!(asset.video_url.is_none());
        assert!(asset.audio_url.is_none());
    }

    #[test]
    fn test_temp_download_removed_on_drop() {
        let file = tempfile::Builder::new()
            .prefix("reelscribe_test_")
            .suffix(".mp4")
            .tempfile()
            .unwrap();
        let download = TempDownload { file };
        let path = download.path().to_path_buf();
        assert!(path.exists());
        drop(download);
        assert!(!path.exists());
    }
}
