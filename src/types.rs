//! Core types and events for videogen-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// A text prompt to generate one video from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Stable identifier, also the output file stem
    pub id: String,
    /// Human-readable title used in logs
    pub title: String,
    /// Prompt text sent to the generation service
    #[serde(rename = "prompt")]
    pub text: String,
}

impl Prompt {
    /// Create a new prompt
    pub fn new(id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
        }
    }

    /// File name of the video produced for this prompt
    pub fn filename(&self) -> String {
        format!("{}.mp4", self.id)
    }

    /// Whether the id is a single plain path component
    ///
    /// Only such ids keep `<output_dir>/<id>.mp4` inside the output directory.
    pub fn has_plain_id(&self) -> bool {
        if self.id.trim().is_empty() || self.id.contains(['/', '\\']) {
            return false;
        }
        let mut components = Path::new(&self.id).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }
}

/// Body of a generation request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Prompt text
    pub prompt: String,
    /// Model name
    pub model: String,
}

/// Response to a generation request
///
/// The service either accepts an asynchronous job (`prediction_id`) or answers
/// with an already-finished video (`video_url`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Identifier of the accepted asynchronous job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_id: Option<String>,
    /// URL of an already-complete video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// How a [`GenerationResponse`] should be handled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitOutcome<'a> {
    /// Poll this job id until it resolves
    Job(&'a str),
    /// Download this URL directly
    Ready(&'a str),
    /// Neither field was present
    Empty,
}

impl GenerationResponse {
    /// Classify the response; `prediction_id` wins when both are present and
    /// empty strings count as absent.
    pub fn outcome(&self) -> SubmitOutcome<'_> {
        if let Some(id) = non_empty(&self.prediction_id) {
            SubmitOutcome::Job(id)
        } else if let Some(url) = non_empty(&self.video_url) {
            SubmitOutcome::Ready(url)
        } else {
            SubmitOutcome::Empty
        }
    }
}

/// Job status reported by the service
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStatus {
    /// Queued, not yet started
    Pending,
    /// Booting the model
    Starting,
    /// Running
    Processing,
    /// Finished successfully
    Succeeded,
    /// Finished with an error
    Failed,
    /// Any other value, kept verbatim
    Other(String),
}

impl JobStatus {
    /// Only `Failed` is terminal by itself; `Succeeded` also needs a video URL.
    pub fn is_failed(&self) -> bool {
        matches!(self, JobStatus::Failed)
    }
}

impl From<&str> for JobStatus {
    fn from(s: &str) -> Self {
        match s {
            "pending" => JobStatus::Pending,
            "starting" => JobStatus::Starting,
            "processing" => JobStatus::Processing,
            "succeeded" => JobStatus::Succeeded,
            "failed" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Starting => "starting",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Other(s) => s.as_str(),
        };
        f.write_str(s)
    }
}

/// Response to a status check
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Raw status string
    #[serde(default)]
    pub status: String,
    /// Video URL, present once the job succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Failure message, present when the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    /// Parsed status
    pub fn job_status(&self) -> JobStatus {
        JobStatus::from(self.status.as_str())
    }

    /// The video URL, only when the job succeeded and the URL is non-empty
    pub fn succeeded_url(&self) -> Option<&str> {
        match self.job_status() {
            JobStatus::Succeeded => non_empty(&self.video_url),
            _ => None,
        }
    }
}

/// One successfully produced video
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Prompt id
    pub id: String,
    /// Prompt title
    pub title: String,
    /// Prompt text
    pub prompt: String,
    /// File name inside the output directory
    pub filename: String,
    /// Output directory joined with the file name
    pub filepath: String,
    /// URL the video was downloaded from
    pub video_url: String,
}

impl ManifestEntry {
    /// Build the entry for a prompt whose video was written to `output_dir`
    pub fn new(prompt: &Prompt, output_dir: &std::path::Path, video_url: &str) -> Self {
        let filename = prompt.filename();
        let filepath = output_dir.join(&filename).to_string_lossy().into_owned();
        Self {
            id: prompt.id.clone(),
            title: prompt.title.clone(),
            prompt: prompt.text.clone(),
            filename,
            filepath,
            video_url: video_url.to_string(),
        }
    }
}

/// Progress events emitted during a run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Generation request accepted by the service
    Submitted {
        /// Prompt id
        prompt_id: String,
        /// Job id, when the service started an asynchronous job
        prediction_id: Option<String>,
    },

    /// A status check returned data
    StatusChecked {
        /// Prompt id
        prompt_id: String,
        /// Job id
        prediction_id: String,
        /// Reported status
        status: String,
        /// Seconds elapsed since polling started
        elapsed_secs: u64,
    },

    /// Artifact download started
    Downloading {
        /// Prompt id
        prompt_id: String,
        /// Source URL
        url: String,
        /// Destination file
        path: PathBuf,
    },

    /// Prompt fully processed and recorded in the manifest
    Completed {
        /// Prompt id
        prompt_id: String,
        /// Written file
        path: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// Prompt aborted by an error
    Failed {
        /// Prompt id
        prompt_id: String,
        /// Error message
        error: String,
    },

    /// Service returned neither a job id nor a video URL
    Skipped {
        /// Prompt id
        prompt_id: String,
    },

    /// Manifest written at the end of the run
    ManifestWritten {
        /// Manifest path
        path: PathBuf,
        /// Number of entries
        entries: usize,
    },
}

/// Outcome of a complete run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of prompts processed
    pub total: usize,
    /// Number of prompts that produced a video
    pub succeeded: usize,
    /// Where the manifest was written
    pub manifest_path: PathBuf,
    /// Entries in the written manifest
    pub entries: Vec<ManifestEntry>,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run end time
    pub finished_at: DateTime<Utc>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
