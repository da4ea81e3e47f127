//! Collection of proxy URLs emitted during a build.
//!
//! The loader appends to a registry owned by the caller; once every image has been
//! processed the aggregation stage turns it into a sorted, de-duplicated list (for example
//! to warm the proxy cache or to precache the URLs in a service worker).

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};

/// Append-only URL accumulator shared by every loader invocation of a build.
#[derive(Debug, Default)]
pub struct UrlRegistry {
    urls: Mutex<Vec<String>>,
}

impl UrlRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append URLs in the order given.
    pub fn extend<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().extend(urls.into_iter().map(Into::into));
    }

    /// Number of URLs appended so far, duplicates included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted, de-duplicated URLs; independent of append order.
    pub fn aggregate(&self) -> Vec<String> {
        self.lock()
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Consume the registry, returning URLs in append order.
    pub fn into_urls(self) -> Vec<String> {
        self.urls
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Write the aggregated URLs to `path` as a pretty-printed JSON array.
    pub fn write_manifest(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let urls = self.aggregate();
        let json = serde_json::to_string_pretty(&urls).context("failed to serialise URL list")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {} proxy URLs to {}", urls.len(), path.display());
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.urls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
