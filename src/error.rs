//! Error types surfaced to the build step invoking the loader.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration problems detected before any image is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON.
    #[error("failed to parse {}", path.display())]
    Json {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The configuration file is not valid YAML.
    #[error("failed to parse {}", path.display())]
    Yaml {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        #[source]
        source: serde_yaml::Error,
    },

    /// No configuration file was found in the searched directory.
    #[error("no loader configuration found in {}", .0.display())]
    NotFound(PathBuf),

    /// A field is missing or has the wrong type.
    #[error("invalid configuration object: {path} {expected}")]
    Schema {
        /// Dotted path of the offending field, rooted at `options`.
        path: String,
        /// Description of the expected shape.
        expected: String,
    },

    /// Two breakpoints share a name.
    #[error("invalid configuration object: breakpoint name `{0}` is declared more than once")]
    DuplicateBreakpoint(String),

    /// A breakpoint uses the reserved catch-all name.
    #[error(
        "invalid configuration object: breakpoint name `all` is reserved for images shared by every breakpoint"
    )]
    ReservedBreakpoint,
}

impl ConfigError {
    pub(crate) fn schema(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// Failures while turning a single image into a descriptor.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The image file name does not follow the breakpoint naming convention.
    #[error(
        "invalid image name {file_name}: image directories may only contain files named after a configured breakpoint or `all`, with extension png, jpg, jpeg or gif"
    )]
    InvalidFileName {
        /// File name relative to the image directory.
        file_name: String,
    },

    /// The upstream module source does not export a single quoted path.
    #[error("unexpected upstream output for {}: expected `module.exports = \"<path>\";`, got `{source_text}`", resource.display())]
    MalformedSource {
        /// Image being processed.
        resource: PathBuf,
        /// Offending module source.
        source_text: String,
    },

    /// The descriptor could not be serialised.
    #[error("failed to serialise loader result")]
    Serialize(#[from] serde_json::Error),
}
