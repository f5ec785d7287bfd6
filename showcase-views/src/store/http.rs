//! HTTP client for the view counter service

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use showcase_common::db::models::{Video, ViewRecordRequest};
use std::time::Duration;
use tracing::debug;

use super::ViewStore;
use crate::api::types::{ErrorBody, RecordViewBody, RecordViewResponse, ViewCountResponse};
use crate::error::{Error, Result};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// [`ViewStore`] talking to a remote `showcase-views` service
#[derive(Clone)]
pub struct HttpViewStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpViewStore {
    /// Create a client for the service at `base_url` (e.g. `http://127.0.0.1:5780`)
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::InvalidInput(format!("invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!("invalid base URL {}", base_url)));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Build `<base>/api/videos[/<id>[/<tail>]]` with each segment percent-encoded
    fn videos_url(&self, video_id: Option<&str>, tail: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidInput(format!("invalid base URL {}", self.base_url)))?;
            segments.pop_if_empty().extend(["api", "videos"]);
            if let Some(id) = video_id {
                segments.push(id);
            }
            if let Some(tail) = tail {
                segments.push(tail);
            }
        }
        Ok(url)
    }

    /// Turn a non-success response into an error, keeping the server's message
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.canonical_reason().unwrap_or("unknown").to_string(),
        };

        Err(match status {
            StatusCode::NOT_FOUND => Error::NotFound(message),
            StatusCode::BAD_REQUEST => Error::InvalidInput(message),
            _ => Error::Remote {
                status: status.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl ViewStore for HttpViewStore {
    async fn list_videos(&self) -> Result<Vec<Video>> {
        let url = self.videos_url(None, None)?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn record_view(&self, request: &ViewRecordRequest) -> Result<bool> {
        let url = self.videos_url(Some(&request.video_id), Some("views"))?;
        debug!("POST {}", url);
        let body = RecordViewBody {
            session_id: request.session_id.clone(),
            watch_duration_seconds: request.watch_duration_seconds,
        };
        let response = self.client.post(url).json(&body).send().await?;
        let parsed: RecordViewResponse = Self::check(response).await?.json().await?;
        Ok(parsed.counted)
    }

    async fn view_count(&self, video_id: &str) -> Result<i64> {
        let url = self.videos_url(Some(video_id), Some("view_count"))?;
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let parsed: ViewCountResponse = Self::check(response).await?.json().await?;
        Ok(parsed.view_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_built_under_base_path() {
        let store = HttpViewStore::new("http://localhost:5780/showcase/").unwrap();
        let url = store.videos_url(Some("v1"), Some("views")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5780/showcase/api/videos/v1/views");
    }

    #[test]
    fn test_video_ids_are_percent_encoded() {
        let store = HttpViewStore::new("http://localhost:5780").unwrap();
        let url = store.videos_url(Some("a b/c"), Some("view_count")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:5780/api/videos/a%20b%2Fc/view_count");
    }

    #[test]
    fn test_rejects_non_base_urls() {
        assert!(matches!(
            HttpViewStore::new("mailto:someone@example.com"),
            Err(Error::InvalidInput(_))
        ));
        assert!(HttpViewStore::new("not a url").is_err());
    }
}
