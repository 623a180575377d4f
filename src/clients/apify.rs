use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::{MediaEntry, PostDiscovery, RawPostRecord};
use crate::Result;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor ID for the Instagram profile reels scraper.
const PROFILE_REELS_SCRAPER: &str = "NNyHXtFNu84OQyAz2";

/// Actor ID for the media URL resolver.
const MEDIA_RESOLVER: &str = "Fj1zYgto86GELL443";

#[derive(Debug, Error)]
pub enum ApifyError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Run failed with status: {0}")]
    RunFailed(String),
}

impl ApifyError {
    /// True for HTTP statuses that indicate a bad or expired token.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApifyError::Api { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ApifyError {
    fn from(err: reqwest::Error) -> Self {
        ApifyError::Network(err.to_string())
    }
}

/// Input for the profile reels scraper actor.
#[derive(Debug, Clone, Serialize)]
struct ProfileScraperInput {
    usernames: Vec<String>,
    #[serde(rename = "maxItems")]
    max_items: u32,
}

/// Input for the media resolver actor.
#[derive(Debug, Clone, Serialize)]
struct MediaResolverInput {
    links: Vec<String>,
    #[serde(rename = "proxyConfiguration")]
    proxy_configuration: ProxyConfiguration,
}

#[derive(Debug, Clone, Serialize)]
struct ProxyConfiguration {
    #[serde(rename = "useApifyProxy")]
    use_apify_proxy: bool,
    #[serde(rename = "apifyProxyGroups")]
    apify_proxy_groups: Vec<String>,
}

impl Default for ProxyConfiguration {
    fn default() -> Self {
        Self {
            use_apify_proxy: true,
            apify_proxy_groups: vec!["RESIDENTIAL".to_string()],
        }
    }
}

/// One dataset item from the media resolver actor.
#[derive(Debug, Clone, Deserialize)]
struct MediaResolverItem {
    result: Option<MediaResolverResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct MediaResolverResult {
    medias: Option<Vec<MediaEntry>>,
}

/// Wrapper for Apify API responses.
#[derive(Debug, Clone, Deserialize)]
struct ApiResponse<T> {
    data: T,
}

/// Apify actor run metadata.
#[derive(Debug, Clone, Deserialize)]
struct RunData {
    id: String,
    status: String,
    #[serde(rename = "defaultDatasetId")]
    default_dataset_id: String,
}

/// Client for the Apify actor API, covering post discovery and media
/// resolution.
pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
}

impl ApifyClient {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
        }
    }

    /// Start an actor run. Returns immediately with run metadata.
    async fn start_run<I: Serialize + Sync>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> std::result::Result<RunData, ApifyError> {
        let url = format!("{}/acts/{}/runs", BASE_URL, actor_id);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let api_resp: ApiResponse<RunData> = resp
            .json()
            .await
            .map_err(|e| ApifyError::Parse(e.to_string()))?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient
    /// long-polling.
    async fn wait_for_run(&self, run_id: &str) -> std::result::Result<RunData, ApifyError> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", BASE_URL, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApifyError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let api_resp: ApiResponse<RunData> = resp
                .json()
                .await
                .map_err(|e| ApifyError::Parse(e.to_string()))?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed(api_resp.data.status));
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    async fn get_dataset_items<T: DeserializeOwned>(
        &self,
        dataset_id: &str,
    ) -> std::result::Result<Vec<T>, ApifyError> {
        let url = format!("{}/datasets/{}/items?format=json", BASE_URL, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApifyError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let items: Vec<T> = resp
            .json()
            .await
            .map_err(|e| ApifyError::Parse(e.to_string()))?;
        Ok(items)
    }

    /// Run an actor end-to-end: start, poll, fetch results.
    async fn run_actor<I: Serialize + Sync, T: DeserializeOwned>(
        &self,
        actor_id: &str,
        input: &I,
    ) -> std::result::Result<Vec<T>, ApifyError> {
        let run = self.start_run(actor_id, input).await?;
        tracing::debug!(run_id = %run.id, actor_id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::debug!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        self.get_dataset_items(&completed.default_dataset_id).await
    }
}

#[async_trait]
impl PostDiscovery for ApifyClient {
    async fn list_posts(&self, handle: &str, limit: u32) -> Result<Vec<RawPostRecord>> {
        tracing::info!(handle, limit, "Starting profile reels scrape");

        let input = ProfileScraperInput {
            usernames: vec![handle.to_string()],
            max_items: limit,
        };

        let records: Vec<RawPostRecord> = self.run_actor(PROFILE_REELS_SCRAPER, &input).await?;
        tracing::info!(count = records.len(), "Fetched reel records");

        Ok(records)
    }

    async fn resolve_media(&self, post_url: &str) -> Result<Vec<MediaEntry>> {
        let input = MediaResolverInput {
            links: vec![post_url.to_string()],
            proxy_configuration: ProxyConfiguration::default(),
        };

        let items: Vec<MediaResolverItem> = self.run_actor(MEDIA_RESOLVER, &input).await?;

        let medias = items
            .into_iter()
            .next()
            .and_then(|item| item.result)
            .and_then(|result| result.medias)
            .unwrap_or_default();

        tracing::debug!(post_url, count = medias.len(), "Resolved media entries");

        Ok(medias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_status_detection() {
        let unauthorized = ApifyError::Api {
            status: 401,
            message: "invalid token".to_string(),
        };
        let forbidden = ApifyError::Api {
            status: 403,
            message: "subscription expired".to_string(),
        };
        let server = ApifyError::Api {
            status: 500,
            message: "oops".to_string(),
        };

        assert!(unauthorized.is_auth());
        assert!(forbidden.is_auth());
        assert!(!server.is_auth());
        assert!(!ApifyError::RunFailed("ABORTED".to_string()).is_auth());
    }

    #[test]
    fn test_media_resolver_item_parsing() {
        let json = r#"[{"result": {"medias": [{"url": "https://cdn/video.mp4"}, {"url": "https://cdn/audio.m4a"}]}}]"#;
        let items: Vec<MediaResolverItem> = serde_json::from_str(json).unwrap();
        let medias = items[0].result.as_ref().unwrap().medias.as_ref().unwrap();
        assert_eq!(medias.len(), 2);
        assert_eq!(medias[0].url, "https://cdn/video.mp4");
    }

    #[test]
    fn test_media_resolver_item_missing_medias() {
        let json = r#"[{"result": {}}]"#;
        let items: Vec<MediaResolverItem> = serde_json::from_str(json).unwrap();
        assert!(items[0]
            .result
            .as_ref()
            .unwrap()
            .medias
            .is_none());
    }

    #[test]
    fn test_profile_scraper_input_shape() {
        let input = ProfileScraperInput {
            usernames: vec!["creator".to_string()],
            max_items: 10,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["usernames"][0], "creator");
        assert_eq!(value["maxItems"], 10);
    }
}
