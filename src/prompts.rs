//! Built-in prompt set and JSON prompt catalogues

use crate::error::{Error, Result};
use crate::types::Prompt;
use std::collections::HashSet;
use std::path::Path;

/// The prompts generated when no catalogue file is configured
pub fn default_prompts() -> Vec<Prompt> {
    vec![
        Prompt::new(
            "tesla_delivery",
            "Tesla Delivery Day",
            "Cinematic shot of excited person receiving Tesla Model Y keys at delivery center",
        ),
        Prompt::new(
            "autopilot_demo",
            "Autopilot Demo",
            "Inside Tesla, family amazed as steering wheel drives itself on highway",
        ),
        Prompt::new(
            "supercharger",
            "Supercharger Speed",
            "Tesla Supercharger station, rapid charging with battery percentage increasing",
        ),
    ]
}

/// Load a prompt catalogue: a JSON array of `{id, title, prompt}` objects
///
/// # Errors
///
/// Returns [`Error::Config`] for an empty catalogue, duplicate ids or an id that
/// is not a plain file name (blank, `.`/`..`, or containing a path separator),
/// and I/O or JSON errors for unreadable files.
pub async fn load_prompts(path: &Path) -> Result<Vec<Prompt>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let prompts: Vec<Prompt> = serde_json::from_str(&raw)?;
    check_prompts(&prompts)?;
    tracing::debug!(path = %path.display(), count = prompts.len(), "loaded prompt catalogue");
    Ok(prompts)
}

fn check_prompts(prompts: &[Prompt]) -> Result<()> {
    if prompts.is_empty() {
        return Err(Error::config("prompt catalogue is empty", "VIDEOGEN_PROMPTS_FILE"));
    }
    let mut seen = HashSet::new();
    for prompt in prompts {
        if prompt.id.trim().is_empty() {
            return Err(Error::config(
                format!("prompt '{}' has a blank id", prompt.title),
                "VIDEOGEN_PROMPTS_FILE",
            ));
        }
        if !prompt.has_plain_id() {
            return Err(Error::config(
                format!("prompt id '{}' is not a plain file name", prompt.id),
                "VIDEOGEN_PROMPTS_FILE",
            ));
        }
        if !seen.insert(prompt.id.as_str()) {
            return Err(Error::config(
                format!("duplicate prompt id '{}'", prompt.id),
                "VIDEOGEN_PROMPTS_FILE",
            ));
        }
    }
    Ok(())
}
