//! Run the loader over a whole image directory without a bundler.
//!
//! A bundler would emit each image and hand the loader its public path; here the public
//! path is derived from a prefix and the file name, which is enough to preview the
//! descriptors and collect proxy URLs for a directory of breakpoint images.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::loader::{LoaderRequest, ResponsiveImageLoader};
use crate::models::{LoaderResult, SUPPORTED_EXTENSIONS};
use crate::registry::UrlRegistry;

/// Descriptor produced for one file of a directory.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntryResult {
    /// File name within the directory.
    pub file_name: String,
    /// Loader output for the file.
    pub result: LoaderResult,
}

/// Load every image directly inside `dir`, sorted by breakpoint order.
///
/// Hidden files, sub-directories and files without an image extension are skipped. An
/// image whose name does not match a breakpoint aborts the whole directory.
pub fn load_directory(
    loader: &ResponsiveImageLoader<'_>,
    dir: &Path,
    public_path: &str,
    registry: &UrlRegistry,
) -> Result<Vec<DirectoryEntryResult>> {
    let mut images: Vec<PathBuf> = Vec::new();
    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
        let path = entry.path();
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden
            || !entry.file_type().is_ok_and(|ft| ft.is_file())
            || !has_image_extension(&path)
        {
            continue;
        }
        images.push(path);
    }
    images.sort();

    let prefix = public_path.trim_end_matches('/');
    let mut results = Vec::with_capacity(images.len());
    for path in images {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = upstream_source(&format!("{prefix}/{file_name}"))?;
        let request = LoaderRequest {
            resource_path: &path,
            context: dir,
            source: &source,
        };
        let result = loader
            .load(&request, registry)
            .with_context(|| format!("failed to process {}", path.display()))?;
        results.push(DirectoryEntryResult { file_name, result });
    }

    results.sort_by_key(|entry| entry.result.order);
    log::info!("processed {} image(s) in {}", results.len(), dir.display());
    Ok(results)
}

/// Module source a file-emitting bundler step would produce for `public_url`.
pub fn upstream_source(public_url: &str) -> Result<String> {
    Ok(format!(
        "module.exports = {};",
        serde_json::to_string(public_url).context("failed to quote public URL")?
    ))
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
}
