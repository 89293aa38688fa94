//! Run orchestration: submit → poll → fetch → manifest, one prompt at a time
//!
//! Every prompt is isolated: an error while submitting, polling or fetching is
//! logged against the prompt's title and processing moves on to the next one.
//! Only failures to prepare the output directory or write the manifest abort a
//! run.

use crate::client::VideoService;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::poller::JobPoller;
use crate::types::{Event, ManifestEntry, Prompt, RunSummary, SubmitOutcome};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Drives a batch of prompts through the generation service
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use videogen_dl::{Config, HttpVideoService, Orchestrator, prompts};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::default();
/// let service = Arc::new(HttpVideoService::from_config(&config)?);
/// let orchestrator = Orchestrator::new(service, config);
///
/// let summary = orchestrator.run(&prompts::default_prompts()).await?;
/// println!("{}/{} videos", summary.succeeded, summary.total);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator {
    service: Arc<dyn VideoService>,
    config: Arc<Config>,
    poller: JobPoller,
    event_tx: broadcast::Sender<Event>,
}

impl Orchestrator {
    /// Create an orchestrator using `service` for every remote call
    pub fn new(service: Arc<dyn VideoService>, config: Config) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            service,
            poller: JobPoller::from_config(&config.polling),
            config: Arc::new(config),
            event_tx,
        }
    }

    /// Subscribe to progress events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Configuration this orchestrator runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process every prompt in order and write the manifest
    ///
    /// # Errors
    ///
    /// Only run-level failures are returned: creating the output directory or
    /// writing the manifest. Per-prompt failures are logged and skipped.
    pub async fn run(&self, prompts: &[Prompt]) -> Result<RunSummary> {
        let started_at = chrono::Utc::now();
        let output_dir = self.config.output.output_dir.as_path();
        tracing::info!(
            prompts = prompts.len(),
            output_dir = %output_dir.display(),
            "Starting video generation run"
        );

        tokio::fs::create_dir_all(output_dir).await?;

        let mut manifest = Manifest::new();
        for prompt in prompts {
            match self.process_prompt(prompt, output_dir).await {
                Ok(Some(entry)) => manifest.push(entry),
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(
                        prompt_id = %prompt.id,
                        error = %e,
                        "Error generating {}: {}",
                        prompt.title,
                        e
                    );
                    self.emit(Event::Failed {
                        prompt_id: prompt.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        // Recreate in case the directory disappeared during the run
        tokio::fs::create_dir_all(output_dir).await?;
        let manifest_path = self.config.output.manifest_path();
        manifest.write(&manifest_path).await?;
        tracing::info!(
            path = %manifest_path.display(),
            entries = manifest.len(),
            "Saved metadata"
        );
        self.emit(Event::ManifestWritten {
            path: manifest_path.clone(),
            entries: manifest.len(),
        });

        tracing::info!(
            succeeded = manifest.len(),
            total = prompts.len(),
            "Generated {}/{} videos successfully",
            manifest.len(),
            prompts.len()
        );

        Ok(RunSummary {
            total: prompts.len(),
            succeeded: manifest.len(),
            manifest_path,
            entries: manifest.into_entries(),
            started_at,
            finished_at: chrono::Utc::now(),
        })
    }

    /// Submit, resolve and fetch a single prompt
    ///
    /// Returns `Ok(None)` when the service answered with neither a job id nor a
    /// video URL.
    async fn process_prompt(
        &self,
        prompt: &Prompt,
        output_dir: &Path,
    ) -> Result<Option<ManifestEntry>> {
        tracing::info!(prompt_id = %prompt.id, "Generating video: {}", prompt.title);
        tracing::debug!(prompt_id = %prompt.id, text = %prompt.text, "prompt text");

        if !prompt.has_plain_id() {
            return Err(Error::Config {
                message: format!("prompt id '{}' is not a plain file name", prompt.id),
                key: None,
            });
        }

        let response = self
            .service
            .submit(&prompt.text, &self.config.service.model)
            .await?;
        let outcome = response.outcome();

        let prediction_id = match outcome {
            SubmitOutcome::Job(id) => Some(id.to_string()),
            _ => None,
        };
        tracing::info!(
            prompt_id = %prompt.id,
            "Prediction ID: {}",
            prediction_id.as_deref().unwrap_or("N/A")
        );
        self.emit(Event::Submitted {
            prompt_id: prompt.id.clone(),
            prediction_id,
        });

        let video_url = match outcome {
            SubmitOutcome::Job(job_id) => {
                let events = &self.event_tx;
                self.poller
                    .wait_for_video_with(self.service.as_ref(), job_id, |status, elapsed| {
                        events
                            .send(Event::StatusChecked {
                                prompt_id: prompt.id.clone(),
                                prediction_id: job_id.to_string(),
                                status: status.status.clone(),
                                elapsed_secs: elapsed.as_secs(),
                            })
                            .ok();
                    })
                    .await?
            }
            SubmitOutcome::Ready(url) => url.to_string(),
            SubmitOutcome::Empty => {
                tracing::warn!(
                    prompt_id = %prompt.id,
                    "service returned neither a prediction id nor a video URL for {}",
                    prompt.title
                );
                self.emit(Event::Skipped {
                    prompt_id: prompt.id.clone(),
                });
                return Ok(None);
            }
        };

        let destination = output_dir.join(prompt.filename());
        tracing::info!(
            prompt_id = %prompt.id,
            url = %video_url,
            "Downloading video to: {}",
            destination.display()
        );
        self.emit(Event::Downloading {
            prompt_id: prompt.id.clone(),
            url: video_url.clone(),
            path: destination.clone(),
        });

        let bytes = self.service.fetch_binary(&video_url, &destination).await?;
        tracing::info!(prompt_id = %prompt.id, bytes, "Downloaded: {}", destination.display());
        self.emit(Event::Completed {
            prompt_id: prompt.id.clone(),
            path: destination,
            bytes,
        });

        Ok(Some(ManifestEntry::new(prompt, output_dir, &video_url)))
    }

    fn emit(&self, event: Event) {
        // No subscribers is fine
        self.event_tx.send(event).ok();
    }
}
