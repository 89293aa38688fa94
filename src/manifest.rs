//! Run manifest persistence
//!
//! The manifest is a bare JSON array of [`ManifestEntry`] objects, pretty-printed
//! and rewritten from scratch by every run.

use crate::error::Result;
use crate::types::ManifestEntry;
use std::path::Path;

/// Ordered list of the videos a run produced
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; entries keep insertion order
    pub fn push(&mut self, entry: ManifestEntry) {
        self.entries.push(entry);
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the manifest, returning its entries
    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    /// Write the manifest to `path`, replacing any existing file
    ///
    /// The parent directory is created if it does not exist.
    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Read a manifest written by [`write`](Self::write)
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let entries: Vec<ManifestEntry> = serde_json::from_str(&raw)?;
        Ok(Self { entries })
    }
}

impl From<Vec<ManifestEntry>> for Manifest {
    fn from(entries: Vec<ManifestEntry>) -> Self {
        Self { entries }
    }
}
