//! Data structures exchanged between the loader, its configuration and downstream consumers.

use serde::{Deserialize, Serialize};

/// Breakpoint token used when a single image serves every breakpoint.
///
/// Images named after it carry no media condition and sort before every configured
/// breakpoint.
pub const ALL_BREAKPOINTS: &str = "all";

/// Image extensions accepted in breakpoint file names.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Modern format requested from the proxy next to the original extension.
pub const WEBP_FORMAT: &str = "webp";

/// Layout breakpoint declared in the loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    /// Name matched against image file stems.
    pub name: String,
    /// Smallest viewport width, in CSS pixels, the breakpoint applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width: Option<u32>,
    /// Largest viewport width, in CSS pixels, the breakpoint applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    /// Explicit media query overriding the width bounds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

impl Breakpoint {
    /// Breakpoint without layout bounds.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_width: None,
            max_width: None,
            media: None,
        }
    }
}

/// Pixel density multipliers generated for every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PixelRatio {
    /// Standard density.
    X1,
    /// Double density.
    X2,
    /// Triple density.
    X3,
}

impl PixelRatio {
    /// All ratios in ascending order.
    pub const ALL: [PixelRatio; 3] = [PixelRatio::X1, PixelRatio::X2, PixelRatio::X3];

    /// Integer multiplier passed to the proxy.
    pub fn multiplier(self) -> u8 {
        match self {
            PixelRatio::X1 => 1,
            PixelRatio::X2 => 2,
            PixelRatio::X3 => 3,
        }
    }

    /// Density descriptor as used in `srcset` attributes.
    pub fn label(self) -> &'static str {
        match self {
            PixelRatio::X1 => "1x",
            PixelRatio::X2 => "2x",
            PixelRatio::X3 => "3x",
        }
    }
}

/// Absolute image URLs keyed by pixel density.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SrcSet {
    /// URL for standard density screens.
    #[serde(rename = "1x")]
    pub x1: String,
    /// URL for double density screens.
    #[serde(rename = "2x")]
    pub x2: String,
    /// URL for triple density screens.
    #[serde(rename = "3x")]
    pub x3: String,
}

impl SrcSet {
    /// Source set whose densities all point at the same URL.
    pub fn uniform(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            x1: url.clone(),
            x2: url.clone(),
            x3: url,
        }
    }

    /// Build a source set by evaluating `url_for` once per density.
    pub fn from_fn(mut url_for: impl FnMut(PixelRatio) -> String) -> Self {
        Self {
            x1: url_for(PixelRatio::X1),
            x2: url_for(PixelRatio::X2),
            x3: url_for(PixelRatio::X3),
        }
    }

    /// URL for the requested density.
    pub fn get(&self, ratio: PixelRatio) -> &str {
        match ratio {
            PixelRatio::X1 => &self.x1,
            PixelRatio::X2 => &self.x2,
            PixelRatio::X3 => &self.x3,
        }
    }

    /// URLs in ascending density order.
    pub fn urls(&self) -> [&str; 3] {
        [&self.x1, &self.x2, &self.x3]
    }
}

/// One format variant of an image for a single breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    /// Breakpoint name parsed from the file name, or [`ALL_BREAKPOINTS`].
    pub breakpoint_name: String,
    /// Media condition for the breakpoint; absent for [`ALL_BREAKPOINTS`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint_media: Option<String>,
    /// Image format of every URL in `src_set`.
    pub extension: String,
    /// Per-density URLs.
    pub src_set: SrcSet,
}

/// Descriptor emitted for each processed image.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderResult {
    /// `-1` for [`ALL_BREAKPOINTS`], otherwise the breakpoint's configuration index.
    pub order: i64,
    /// Variants ordered by preference; the modern format comes first when present.
    pub data: Vec<ImageSource>,
    /// Standard density URL in the original format.
    pub fallback_src: String,
}

impl LoaderResult {
    /// Prefix of the module source emitted for each image.
    pub const MODULE_PREFIX: &'static str = "module.exports = ";

    /// Serialise the result as a CommonJS module body.
    pub fn to_module_source(&self) -> serde_json::Result<String> {
        Ok(format!("{}{}", Self::MODULE_PREFIX, serde_json::to_string(self)?))
    }

    /// Parse a module body produced by [`LoaderResult::to_module_source`].
    ///
    /// Returns `None` when the text does not start with the module prefix or the payload is
    /// not a valid descriptor.
    pub fn from_module_source(source: &str) -> Option<Self> {
        let payload = source.trim().strip_prefix(Self::MODULE_PREFIX)?;
        serde_json::from_str(payload.trim_end_matches(';')).ok()
    }
}
