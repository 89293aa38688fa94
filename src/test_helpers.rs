//! Scripted [`VideoService`] double for unit tests

use crate::client::VideoService;
use crate::error::{Error, FetchError, Result};
use crate::types::{GenerationResponse, StatusResponse};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Build a status response
pub(crate) fn status(status: &str, video_url: Option<&str>, error: Option<&str>) -> StatusResponse {
    StatusResponse {
        status: status.to_string(),
        video_url: video_url.map(str::to_string),
        error: error.map(str::to_string),
    }
}

/// Submit behaviour for one prompt text
pub(crate) enum SubmitScript {
    Respond(GenerationResponse),
    HttpStatus(u16),
}

/// Service whose answers are queued up front.
///
/// Status checks pop from a single FIFO queue and answer `pending` once it is
/// empty. Fetches write `b"video"` unless the URL was marked as failing.
#[derive(Default)]
pub(crate) struct ScriptedService {
    submits: Mutex<HashMap<String, SubmitScript>>,
    statuses: Mutex<VecDeque<Result<Option<StatusResponse>>>>,
    failing_urls: Mutex<Vec<String>>,
    submitted: Mutex<Vec<String>>,
    status_calls: Mutex<Vec<String>>,
    fetches: Mutex<Vec<(String, PathBuf)>>,
}

impl ScriptedService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on_submit(&self, prompt_text: &str, script: SubmitScript) {
        self.submits
            .lock()
            .unwrap()
            .insert(prompt_text.to_string(), script);
    }

    pub(crate) fn push_status(&self, response: Result<Option<StatusResponse>>) {
        self.statuses.lock().unwrap().push_back(response);
    }

    pub(crate) fn fail_fetch(&self, url: &str) {
        self.failing_urls.lock().unwrap().push(url.to_string());
    }

    pub(crate) fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status_calls.lock().unwrap().len()
    }

    pub(crate) fn fetches(&self) -> Vec<(String, PathBuf)> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoService for ScriptedService {
    async fn submit(&self, prompt: &str, _model: &str) -> Result<GenerationResponse> {
        self.submitted.lock().unwrap().push(prompt.to_string());
        match self.submits.lock().unwrap().get(prompt) {
            Some(SubmitScript::Respond(response)) => Ok(response.clone()),
            Some(SubmitScript::HttpStatus(status)) => Err(Error::Api { status: *status }),
            None => Ok(GenerationResponse::default()),
        }
    }

    async fn check_status(&self, job_id: &str) -> Result<Option<StatusResponse>> {
        self.status_calls.lock().unwrap().push(job_id.to_string());
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Some(status("pending", None, None))))
    }

    async fn fetch_binary(&self, url: &str, destination: &Path) -> Result<u64> {
        self.fetches
            .lock()
            .unwrap()
            .push((url.to_string(), destination.to_path_buf()));

        if self.failing_urls.lock().unwrap().iter().any(|u| u == url) {
            return Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }
            .into());
        }

        tokio::fs::write(destination, b"video").await?;
        Ok(5)
    }

    async fn health(&self) -> bool {
        true
    }
}
