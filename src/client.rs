//! Transport client for the remote generation service
//!
//! [`VideoService`] is the seam between the orchestration loop and the network.
//! [`HttpVideoService`] is the reqwest-backed implementation; tests substitute
//! their own implementations.

use crate::error::{Error, Result};
use crate::fetch;
use crate::types::{GenerationRequest, GenerationResponse, StatusResponse};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Operations the orchestrator needs from the generation service
///
/// # Examples
///
/// ```no_run
/// use videogen_dl::client::{HttpVideoService, VideoService};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = HttpVideoService::new("http://localhost:5000", Duration::from_secs(30), 5)?;
///
/// let response = service.submit("A red car at sunset", "hunyuan").await?;
/// println!("{:?}", response.outcome());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Request generation of a video
    ///
    /// # Errors
    ///
    /// [`Error::Api`] when the service answers with a non-success status,
    /// [`Error::Transport`] on network or decode failure.
    async fn submit(&self, prompt: &str, model: &str) -> Result<GenerationResponse>;

    /// Query a job's status
    ///
    /// Returns `Ok(None)` when the service answers with a non-success status;
    /// callers treat that as "no data yet".
    async fn check_status(&self, job_id: &str) -> Result<Option<StatusResponse>>;

    /// Stream `url` into `destination`, returning the number of bytes written
    ///
    /// On failure `destination` does not exist.
    async fn fetch_binary(&self, url: &str, destination: &Path) -> Result<u64>;

    /// Whether the service answers its health endpoint
    async fn health(&self) -> bool;
}

/// [`VideoService`] backed by HTTP
#[derive(Debug, Clone)]
pub struct HttpVideoService {
    client: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    max_redirects: u32,
    download_timeout: Duration,
}

/// Deadline for one artifact fetch unless overridden
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

impl HttpVideoService {
    /// Create a client for the service at `base_url`
    ///
    /// `request_timeout` bounds submit, status and health requests. Artifact
    /// downloads follow at most `max_redirects` hops and must finish within
    /// five minutes; see [`HttpVideoService::with_download_timeout`].
    pub fn new(base_url: &str, request_timeout: Duration, max_redirects: u32) -> Result<Self> {
        // Redirects are followed manually by the artifact fetcher
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            request_timeout,
            max_redirects,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        })
    }

    /// Replace the deadline applied to each artifact fetch
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Create a client from the service and output sections of a [`Config`](crate::Config)
    pub fn from_config(config: &crate::Config) -> Result<Self> {
        Ok(Self::new(
            &config.service.base_url,
            config.service.request_timeout,
            config.output.max_redirects,
        )?
        .with_download_timeout(config.output.download_timeout))
    }

    /// Base URL requests are sent to, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl VideoService for HttpVideoService {
    async fn submit(&self, prompt: &str, model: &str) -> Result<GenerationResponse> {
        let body = GenerationRequest {
            prompt: prompt.to_string(),
            model: model.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint("/api/generate-video"))
            .json(&body)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "generation request rejected");
            return Err(Error::Api {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<GenerationResponse>().await?)
    }

    async fn check_status(&self, job_id: &str) -> Result<Option<StatusResponse>> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/video-status/{}", job_id)))
            .timeout(self.request_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(job_id, status = status.as_u16(), "status check returned no data");
            return Ok(None);
        }

        Ok(Some(response.json::<StatusResponse>().await?))
    }

    async fn fetch_binary(&self, url: &str, destination: &Path) -> Result<u64> {
        fetch::download_to_path(
            &self.client,
            url,
            destination,
            self.max_redirects,
            self.download_timeout,
        )
        .await
    }

    async fn health(&self) -> bool {
        let result = self
            .client
            .get(self.endpoint("/api/health"))
            .timeout(self.request_timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                tracing::warn!(status = response.status().as_u16(), "health check failed");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "health check failed");
                false
            }
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SubmitOutcome;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> HttpVideoService {
        HttpVideoService::new(&server.uri(), Duration::from_secs(5), 5).unwrap()
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let service =
            HttpVideoService::new("http://localhost:5000/ ", Duration::from_secs(1), 5).unwrap();
        assert_eq!(service.base_url(), "http://localhost:5000");
        assert_eq!(
            service.endpoint("/api/health"),
            "http://localhost:5000/api/health"
        );
    }

    #[tokio::test]
    async fn submit_posts_prompt_and_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-video"))
            .and(body_json(json!({"prompt": "a red car", "model": "hunyuan"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prediction_id": "p1"})))
            .expect(1)
            .mount(&server)
            .await;

        let response = service_for(&server)
            .submit("a red car", "hunyuan")
            .await
            .unwrap();
        assert_eq!(response.outcome(), SubmitOutcome::Job("p1"));
    }

    #[tokio::test]
    async fn submit_non_success_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-video"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .submit("a red car", "hunyuan")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 500 }), "got {err:?}");
    }

    #[tokio::test]
    async fn submit_undecodable_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate-video"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = service_for(&server).submit("x", "hunyuan").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn check_status_decodes_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/video-status/p1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "succeeded",
                "video_url": "http://x/a.mp4"
            })))
            .mount(&server)
            .await;

        let status = service_for(&server)
            .check_status("p1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status.succeeded_url(), Some("http://x/a.mp4"));
    }

    #[tokio::test]
    async fn check_status_non_success_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/video-status/p1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let status = service_for(&server).check_status("p1").await.unwrap();
        assert!(status.is_none());
    }

    #[tokio::test]
    async fn fetch_binary_follows_redirect_with_configured_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/out/a.mp4"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/cdn/a.mp4"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cdn/a.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"video".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("a.mp4");
        let url = format!("{}/out/a.mp4", server.uri());

        let bytes = service_for(&server).fetch_binary(&url, &dest).await.unwrap();
        assert_eq!(bytes, 5);
        assert_eq!(std::fs::read(&dest).unwrap(), b"video");
    }

    #[tokio::test]
    async fn health_reports_reachability() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy"})))
            .mount(&server)
            .await;

        assert!(service_for(&server).health().await);

        let unreachable =
            HttpVideoService::new("http://127.0.0.1:9", Duration::from_millis(200), 5).unwrap();
        assert!(!unreachable.health().await);
    }
}
