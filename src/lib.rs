//! # videogen-dl
//!
//! Batch driver for asynchronous remote video generation.
//!
//! For every prompt in a list, videogen-dl asks a generation service for a short
//! video, polls the resulting job until it succeeds, fails or times out,
//! downloads the finished video and finally writes a manifest of everything
//! that was produced.
//!
//! ## Design Philosophy
//!
//! - **Sequential and isolated** - Prompts run one after another; a failing
//!   prompt is logged and skipped, never fatal to the run
//! - **Injectable transport** - The service sits behind the [`VideoService`]
//!   trait and receives its base URL explicitly
//! - **No partial artifacts** - A video file exists only when it was fully
//!   written; the manifest never references anything else
//! - **Event-driven** - Consumers may subscribe to progress events
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use videogen_dl::{Config, Event, HttpVideoService, Orchestrator, prompts};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.service.base_url = "http://localhost:5000".to_string();
//!
//!     let service = Arc::new(HttpVideoService::from_config(&config)?);
//!     let orchestrator = Orchestrator::new(service, config);
//!
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if let Event::Completed { prompt_id, path, .. } = event {
//!                 println!("{prompt_id} -> {}", path.display());
//!             }
//!         }
//!     });
//!
//!     let summary = orchestrator.run(&prompts::default_prompts()).await?;
//!     println!("{}/{} videos", summary.succeeded, summary.total);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Transport client for the generation service
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Artifact download with bounded redirects
pub mod fetch;
/// Manifest persistence
pub mod manifest;
/// Run orchestration
pub mod orchestrator;
/// Job status polling
pub mod poller;
/// Built-in prompts and prompt catalogues
pub mod prompts;
/// Core types and events
pub mod types;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use client::{HttpVideoService, VideoService};
pub use config::{Config, OutputConfig, PollingConfig, ServiceConfig};
pub use error::{Error, FetchError, Result};
pub use manifest::Manifest;
pub use orchestrator::Orchestrator;
pub use poller::JobPoller;
pub use types::{
    Event, GenerationRequest, GenerationResponse, JobStatus, ManifestEntry, Prompt, RunSummary,
    StatusResponse, SubmitOutcome,
};
