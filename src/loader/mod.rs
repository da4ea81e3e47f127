//! Turns breakpoint-named images into responsive source descriptors.
//!
//! The loader runs once per image after the host has emitted the file. It receives the
//! upstream module (`module.exports = "<output path>";`), works out which breakpoint the
//! image belongs to from its file name and replaces the module with a serialised
//! [`LoaderResult`].

mod filename;
mod source;

use std::path::Path;

pub use filename::{FileNamePattern, ParsedFileName};
pub use source::parse_exported_path;

use crate::breakpoints::breakpoint_media;
use crate::config::LoaderOptions;
use crate::error::LoaderError;
use crate::imgproxy::ImgproxyUrlBuilder;
use crate::models::{ALL_BREAKPOINTS, ImageSource, LoaderResult, SrcSet, WEBP_FORMAT};
use crate::registry::UrlRegistry;

/// Inputs describing a single image handed over by the host.
#[derive(Debug, Clone, Copy)]
pub struct LoaderRequest<'a> {
    /// Path of the image being processed.
    pub resource_path: &'a Path,
    /// Directory containing the image.
    pub context: &'a Path,
    /// Module source produced by the upstream file-emission step.
    pub source: &'a str,
}

impl LoaderRequest<'_> {
    /// Image path relative to its directory, with forward slashes.
    ///
    /// Images outside the context keep their full path, which never matches the naming
    /// convention.
    pub fn relative_name(&self) -> String {
        let relative = self
            .resource_path
            .strip_prefix(self.context)
            .unwrap_or(self.resource_path);
        relative.to_string_lossy().replace('\\', "/")
    }
}

/// Loader bound to one validated configuration.
#[derive(Debug, Clone)]
pub struct ResponsiveImageLoader<'a> {
    options: &'a LoaderOptions,
    pattern: FileNamePattern,
    url_builder: Option<ImgproxyUrlBuilder>,
}

impl<'a> ResponsiveImageLoader<'a> {
    /// Prepare the file name pattern and, unless remote processing is disabled, the URL
    /// builder.
    pub fn new(options: &'a LoaderOptions) -> Self {
        let url_builder =
            (!options.imgproxy.disable).then(|| ImgproxyUrlBuilder::new(&options.imgproxy));
        Self {
            options,
            pattern: FileNamePattern::new(&options.breakpoints),
            url_builder,
        }
    }

    /// Produce the descriptor for one image.
    ///
    /// Proxy URLs are appended to `registry`; nothing is appended when remote processing is
    /// disabled.
    pub fn load(
        &self,
        request: &LoaderRequest<'_>,
        registry: &UrlRegistry,
    ) -> Result<LoaderResult, LoaderError> {
        let file_name = request.relative_name();
        let ParsedFileName {
            breakpoint_name,
            extension,
        } = self
            .pattern
            .parse(&file_name)
            .ok_or_else(|| LoaderError::InvalidFileName {
                file_name: file_name.clone(),
            })?;

        let (order, breakpoint_media) = self.resolve_breakpoint(breakpoint_name)?;

        let output_path =
            parse_exported_path(request.source).ok_or_else(|| LoaderError::MalformedSource {
                resource: request.resource_path.to_path_buf(),
                source_text: request.source.to_string(),
            })?;

        let source_for = |extension: &str, src_set: SrcSet| ImageSource {
            breakpoint_name: breakpoint_name.to_string(),
            breakpoint_media: breakpoint_media.clone(),
            extension: extension.to_string(),
            src_set,
        };

        let (data, fallback_src) = match &self.url_builder {
            None => {
                let original = SrcSet::uniform(output_path);
                let fallback_src = original.x1.clone();
                (vec![source_for(extension, original)], fallback_src)
            }
            Some(url_builder) => {
                let webp = url_builder.build(&output_path, WEBP_FORMAT);
                let original = url_builder.build(&output_path, extension);
                registry.extend(webp.urls().into_iter().chain(original.urls()));
                let fallback_src = original.x1.clone();
                (
                    vec![source_for(WEBP_FORMAT, webp), source_for(extension, original)],
                    fallback_src,
                )
            }
        };

        log::debug!(
            "{}: breakpoint `{breakpoint_name}` (order {order}), {} variant(s)",
            request.resource_path.display(),
            data.len()
        );

        Ok(LoaderResult {
            order,
            data,
            fallback_src,
        })
    }

    /// Produce the descriptor for one image as a `module.exports = <json>` module.
    pub fn load_module(
        &self,
        request: &LoaderRequest<'_>,
        registry: &UrlRegistry,
    ) -> Result<String, LoaderError> {
        Ok(self.load(request, registry)?.to_module_source()?)
    }

    fn resolve_breakpoint(
        &self,
        breakpoint_name: &str,
    ) -> Result<(i64, Option<String>), LoaderError> {
        if breakpoint_name == ALL_BREAKPOINTS {
            return Ok((-1, None));
        }

        let index = self
            .options
            .breakpoint_index(breakpoint_name)
            .ok_or_else(|| LoaderError::InvalidFileName {
                file_name: breakpoint_name.to_string(),
            })?;
        let media = breakpoint_media(&self.options.breakpoints[index]);
        Ok((index as i64, media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImgproxyOptions;
    use crate::models::Breakpoint;

    fn options(disable: bool) -> LoaderOptions {
        LoaderOptions {
            breakpoints: vec![
                Breakpoint {
                    max_width: Some(767),
                    ..Breakpoint::named("mobile")
                },
                Breakpoint {
                    min_width: Some(768),
                    ..Breakpoint::named("desktop")
                },
            ],
            imgproxy: ImgproxyOptions {
                disable,
                images_host: "https://static.example.com".into(),
                host: "https://img.example.com".into(),
            },
        }
    }

    fn request<'a>(resource_path: &'a Path, source: &'a str) -> LoaderRequest<'a> {
        LoaderRequest {
            resource_path,
            context: Path::new("/src/img/hero"),
            source,
        }
    }

    const SOURCE: &str = r#"module.exports = "/build/img/mobile.all-abc.png";"#;

    #[test]
    fn passes_output_path_through_when_disabled() {
        let options = options(true);
        let loader = ResponsiveImageLoader::new(&options);
        let registry = UrlRegistry::new();

        let result = loader
            .load(&request(Path::new("/src/img/hero/mobile.png"), SOURCE), &registry)
            .unwrap();

        assert_eq!(result.order, 0);
        assert_eq!(result.data.len(), 1);
        let source = &result.data[0];
        assert_eq!(source.breakpoint_name, "mobile");
        assert_eq!(source.breakpoint_media.as_deref(), Some("(max-width: 767px)"));
        assert_eq!(source.extension, "png");
        assert_eq!(source.src_set, SrcSet::uniform("/build/img/mobile.all-abc.png"));
        assert_eq!(result.fallback_src, "/build/img/mobile.all-abc.png");
        assert!(registry.is_empty());
    }

    #[test]
    fn emits_webp_then_original_when_enabled() {
        let options = options(false);
        let loader = ResponsiveImageLoader::new(&options);
        let registry = UrlRegistry::new();

        let result = loader
            .load(&request(Path::new("/src/img/hero/desktop.jpeg"), SOURCE), &registry)
            .unwrap();

        assert_eq!(result.order, 1);
        let extensions: Vec<&str> = result.data.iter().map(|s| s.extension.as_str()).collect();
        assert_eq!(extensions, ["webp", "jpeg"]);
        assert_eq!(result.fallback_src, result.data[1].src_set.x1);
        assert!(result.fallback_src.ends_with(".jpeg"));
        assert!(result.data[0].src_set.x3.ends_with(".webp"));
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn catch_all_sorts_first_without_media() {
        let options = options(true);
        let loader = ResponsiveImageLoader::new(&options);

        let result = loader
            .load(&request(Path::new("/src/img/hero/all.jpg"), SOURCE), &UrlRegistry::new())
            .unwrap();

        assert_eq!(result.order, -1);
        assert_eq!(result.data[0].breakpoint_name, "all");
        assert_eq!(result.data[0].breakpoint_media, None);
    }

    #[test]
    fn rejects_unconfigured_breakpoint() {
        let options = options(true);
        let loader = ResponsiveImageLoader::new(&options);

        let err = loader
            .load(&request(Path::new("/src/img/hero/tablet.png"), SOURCE), &UrlRegistry::new())
            .unwrap_err();

        assert!(
            matches!(&err, LoaderError::InvalidFileName { file_name } if file_name == "tablet.png")
        );
        assert!(err.to_string().contains("tablet.png"));
    }

    #[test]
    fn rejects_images_outside_context() {
        let options = options(true);
        let loader = ResponsiveImageLoader::new(&options);

        let err = loader
            .load(&request(Path::new("/elsewhere/mobile.png"), SOURCE), &UrlRegistry::new())
            .unwrap_err();

        assert!(matches!(err, LoaderError::InvalidFileName { .. }));
    }

    #[test]
    fn rejects_malformed_upstream_source() {
        let options = options(false);
        let loader = ResponsiveImageLoader::new(&options);
        let registry = UrlRegistry::new();

        let err = loader
            .load(
                &request(Path::new("/src/img/hero/mobile.png"), "export default '/a.png';"),
                &registry,
            )
            .unwrap_err();

        assert!(matches!(err, LoaderError::MalformedSource { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_breakpoint_is_never_treated_as_catch_all() {
        let options = options(true);
        let loader = ResponsiveImageLoader::new(&options);

        assert_eq!(loader.resolve_breakpoint("all").unwrap(), (-1, None));
        assert_eq!(
            loader.resolve_breakpoint("desktop").unwrap(),
            (1, Some("(min-width: 768px)".to_string()))
        );
        assert!(matches!(
            loader.resolve_breakpoint("tablet"),
            Err(LoaderError::InvalidFileName { file_name }) if file_name == "tablet"
        ));
    }

    #[test]
    fn relative_name_uses_forward_slashes() {
        let request = LoaderRequest {
            resource_path: Path::new("/src/img/nested/mobile.png"),
            context: Path::new("/src/img"),
            source: SOURCE,
        };
        assert_eq!(request.relative_name(), "nested/mobile.png");
    }
}
