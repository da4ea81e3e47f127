//! imgproxy URL templating.
//!
//! Every density variant is expressed as an unsigned processing URL:
//!
//! ```text
//! <host>/insecure/dpr:<ratio>/q:<quality>/<base64url(source)>.<format>
//! ```
//!
//! The source URL is encoded with the URL-safe base64 alphabet without padding, and the
//! target format is selected through the extension suffix. Nothing here performs network
//! I/O; the browser resolves the URLs against the proxy later.

use base64::{Engine as _, engine::general_purpose};

use crate::config::ImgproxyOptions;
use crate::models::{PixelRatio, SrcSet};

/// Signature segment imgproxy accepts for unsigned URLs.
const UNSIGNED_SIGNATURE: &str = "insecure";

/// Output quality requested for each density; denser variants compress harder.
pub fn quality_for(ratio: PixelRatio) -> u8 {
    match ratio {
        PixelRatio::X1 => 80,
        PixelRatio::X2 => 65,
        PixelRatio::X3 => 50,
    }
}

/// Builds per-density imgproxy URLs for bundled images.
#[derive(Debug, Clone)]
pub struct ImgproxyUrlBuilder {
    host: String,
    images_host: String,
}

impl ImgproxyUrlBuilder {
    /// Create a builder for the configured proxy and image origin.
    pub fn new(options: &ImgproxyOptions) -> Self {
        Self {
            host: options.host.trim_end_matches('/').to_string(),
            images_host: options.images_host.trim_end_matches('/').to_string(),
        }
    }

    /// Build the 1x/2x/3x URLs for `image_path` converted to `format`.
    pub fn build(&self, image_path: &str, format: &str) -> SrcSet {
        let encoded_source = general_purpose::URL_SAFE_NO_PAD.encode(self.source_url(image_path));
        SrcSet::from_fn(|ratio| {
            format!(
                "{host}/{UNSIGNED_SIGNATURE}/dpr:{dpr}/q:{quality}/{encoded_source}.{format}",
                host = self.host,
                dpr = ratio.multiplier(),
                quality = quality_for(ratio),
            )
        })
    }

    /// Absolute URL the proxy fetches the original image from.
    pub fn source_url(&self, image_path: &str) -> String {
        if is_absolute_url(image_path) {
            return image_path.to_string();
        }
        format!("{}/{}", self.images_host, image_path.trim_start_matches('/'))
    }
}

/// Factory form of [`ImgproxyUrlBuilder::build`].
pub fn url_builder(options: &ImgproxyOptions) -> impl Fn(&str, &str) -> SrcSet + use<> {
    let builder = ImgproxyUrlBuilder::new(options);
    move |image_path, format| builder.build(image_path, format)
}

fn is_absolute_url(value: &str) -> bool {
    if value.starts_with("//") {
        return true;
    }
    value.split_once("://").is_some_and(|(scheme, _)| {
        scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
    })
}
