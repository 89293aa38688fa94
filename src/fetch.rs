//! Artifact fetching: stream a media URL into a local file
//!
//! The destination either ends up holding the complete body of the final
//! response or does not exist at all. Redirects are followed by a bounded loop;
//! the client passed in must have automatic redirects disabled. The whole fetch,
//! every hop and the body included, shares one deadline.

use crate::error::{Error, FetchError, Result};
use reqwest::StatusCode;
use reqwest::header::LOCATION;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use url::Url;

/// Download `url` into `destination`, following at most `max_redirects` redirects
/// and giving up once `timeout` has elapsed.
///
/// Any file already at `destination` is removed before each hop. On every error
/// path the destination is removed before the error is returned.
///
/// # Returns
///
/// The number of bytes written.
///
/// # Errors
///
/// - [`Error::TooManyRedirects`] when the redirect chain is longer than `max_redirects`
/// - [`FetchError::MissingLocation`] for a redirect without a `Location` header
/// - [`FetchError::Status`] for any other non-success status
/// - [`Error::Transport`] for network failures, including the deadline passing
/// - [`FetchError::Io`] for disk failures
pub async fn download_to_path(
    client: &reqwest::Client,
    url: &str,
    destination: &Path,
    max_redirects: u32,
    timeout: Duration,
) -> Result<u64> {
    let started = Instant::now();
    remove_if_exists(destination).await?;
    let mut current = parse_url(url)?;
    let mut hops = 0u32;

    loop {
        if hops > 0 {
            remove_if_exists(destination).await?;
        }

        // reqwest's request timeout also covers reading the body
        let remaining = timeout.saturating_sub(started.elapsed());
        let response = client
            .get(current.clone())
            .timeout(remaining)
            .send()
            .await?;
        let status = response.status();

        if is_redirect(status) {
            if hops >= max_redirects {
                tracing::warn!(url = %current, limit = max_redirects, "redirect limit reached");
                return Err(Error::TooManyRedirects {
                    limit: max_redirects,
                    url: current.to_string(),
                });
            }
            let next = redirect_target(&current, &response)?;
            hops += 1;
            tracing::debug!(from = %current, to = %next, hop = hops, "following redirect");
            current = next;
            continue;
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: current.to_string(),
            }
            .into());
        }

        return match write_body(response, destination).await {
            Ok(bytes) => {
                tracing::debug!(path = %destination.display(), bytes, "artifact written");
                Ok(bytes)
            }
            Err(e) => {
                if let Err(cleanup) = remove_if_exists(destination).await {
                    tracing::error!(
                        path = %destination.display(),
                        error = %cleanup,
                        "failed to remove partial file"
                    );
                }
                Err(e)
            }
        };
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn redirect_target(current: &Url, response: &reqwest::Response) -> Result<Url> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| FetchError::MissingLocation {
            url: current.to_string(),
        })?;

    // Relative locations resolve against the URL that issued the redirect
    current.join(location).map_err(|e| {
        FetchError::InvalidUrl {
            url: location.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| {
        FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

async fn write_body(mut response: reqwest::Response, destination: &Path) -> Result<u64> {
    let io_err = |source: std::io::Error| FetchError::Io {
        path: destination.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::create(destination).await.map_err(io_err)?;
    let mut written = 0u64;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await.map_err(io_err)?;
        written += chunk.len() as u64;
    }

    file.flush().await.map_err(io_err)?;
    file.sync_all().await.map_err(io_err)?;
    Ok(written)
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(FetchError::Io {
            path: path.to_path_buf(),
            source,
        }
        .into()),
    }
}
