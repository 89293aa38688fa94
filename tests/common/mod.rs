//! Common test utilities for videogen-dl integration tests

#![allow(dead_code)]

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use videogen_dl::{Config, Event, HttpVideoService, Orchestrator};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock generation service plus an output directory to run against
pub struct TestHarness {
    pub server: MockServer,
    pub output: TempDir,
    pub config: Config,
}

impl TestHarness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let output = tempfile::tempdir().expect("temp dir");

        let mut config = Config::default();
        config.service.base_url = server.uri();
        config.service.request_timeout = Duration::from_secs(5);
        config.polling.max_attempts = 4;
        config.polling.interval = Duration::from_millis(10);
        config.output.download_timeout = Duration::from_secs(5);
        config.output.output_dir = output.path().join("videos");

        Self {
            server,
            output,
            config,
        }
    }

    /// URL on the mock server
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    pub fn orchestrator(&self) -> Orchestrator {
        let service =
            Arc::new(HttpVideoService::from_config(&self.config).expect("http client"));
        Orchestrator::new(service, self.config.clone())
    }

    /// Answer the generation request for `prompt_text` with `template`
    pub async fn on_submit(&self, prompt_text: &str, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/api/generate-video"))
            .and(body_partial_json(json!({ "prompt": prompt_text })))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// Answer successive status checks for `job_id` with `responses` in order;
    /// the last response repeats
    pub async fn on_status_sequence(&self, job_id: &str, responses: Vec<ResponseTemplate>) {
        let status_path = format!("/api/video-status/{}", job_id);
        let last = responses.len().saturating_sub(1);
        for (i, template) in responses.into_iter().enumerate() {
            let mock = Mock::given(method("GET"))
                .and(path(status_path.as_str()))
                .respond_with(template);
            let mock = if i < last { mock.up_to_n_times(1) } else { mock };
            mock.mount(&self.server).await;
        }
    }

    /// Serve `body` at `media_path`
    pub async fn on_media(&self, media_path: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(path(media_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .mount(&self.server)
            .await;
    }

    /// Serve `body` at `media_path` only after `delay`
    pub async fn on_slow_media(&self, media_path: &str, body: &[u8], delay: Duration) {
        Mock::given(method("GET"))
            .and(path(media_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(body.to_vec())
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Redirect `from` to `to` with a 302
    pub async fn on_redirect(&self, from: &str, to: &str) {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", to))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the mock server received for `request_path`
    pub async fn requests_to(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == request_path)
            .count()
    }
}

pub fn job(id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "prediction_id": id }))
}

pub fn ready(url: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "video_url": url }))
}

pub fn status(value: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": value }))
}

pub fn succeeded(url: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": "succeeded", "video_url": url }))
}

pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
