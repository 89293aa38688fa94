//! Job polling until a terminal state
//!
//! A job starts `pending`. Each attempt performs one status check:
//! - `succeeded` with a video URL resolves the job
//! - `failed` ends it with [`Error::GenerationFailed`]
//! - anything else, including a failed status check, keeps it pending
//!
//! A fixed delay follows every non-terminal attempt. When the attempt budget is
//! spent the job times out, so a poll never takes longer than
//! `max_attempts * interval` plus request time.

use crate::client::VideoService;
use crate::config::PollingConfig;
use crate::error::{Error, Result};
use crate::types::{JobStatus, StatusResponse};
use std::time::Duration;

const GENERIC_FAILURE: &str = "Video generation failed";

/// Polls one job at a time with a fixed delay between status checks
#[derive(Debug, Clone)]
pub struct JobPoller {
    max_attempts: u32,
    interval: Duration,
}

impl Default for JobPoller {
    fn default() -> Self {
        Self::from_config(&PollingConfig::default())
    }
}

impl JobPoller {
    /// Create a poller with an explicit budget and delay
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Create a poller from [`PollingConfig`]
    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(config.max_attempts, config.interval)
    }

    /// Maximum number of status checks
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay between status checks
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Poll `job_id` until it resolves to a video URL
    pub async fn wait_for_video(&self, service: &dyn VideoService, job_id: &str) -> Result<String> {
        self.wait_for_video_with(service, job_id, |_, _| {}).await
    }

    /// Like [`wait_for_video`](Self::wait_for_video), calling `on_status` with
    /// every status response and the time elapsed since polling began.
    pub async fn wait_for_video_with<F>(
        &self,
        service: &dyn VideoService,
        job_id: &str,
        mut on_status: F,
    ) -> Result<String>
    where
        F: FnMut(&StatusResponse, Duration) + Send,
    {
        for attempt in 0..self.max_attempts {
            let elapsed = self.interval * attempt;

            match service.check_status(job_id).await {
                Ok(Some(status)) => {
                    tracing::info!(
                        job_id,
                        status = %status.status,
                        elapsed_secs = elapsed.as_secs(),
                        "Status: {} ({}s elapsed)",
                        status.status,
                        elapsed.as_secs()
                    );
                    on_status(&status, elapsed);

                    if let Some(url) = status.succeeded_url() {
                        return Ok(url.to_string());
                    }
                    if status.job_status().is_failed() {
                        let message = status
                            .error
                            .filter(|m| !m.trim().is_empty())
                            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                        return Err(Error::GenerationFailed { message });
                    }
                    if status.job_status() == JobStatus::Succeeded {
                        tracing::warn!(job_id, "job reported succeeded without a video URL");
                    }
                }
                Ok(None) => {
                    tracing::debug!(job_id, attempt = attempt + 1, "no status data yet");
                }
                Err(e) => {
                    tracing::warn!(
                        job_id,
                        attempt = attempt + 1,
                        error = %e,
                        "status check failed"
                    );
                }
            }

            tokio::time::sleep(self.interval).await;
        }

        Err(Error::Timeout {
            job_id: job_id.to_string(),
            attempts: self.max_attempts,
        })
    }
}
