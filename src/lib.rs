#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod batch;
pub mod breakpoints;
pub mod config;
pub mod error;
pub mod imgproxy;
pub mod loader;
pub mod models;
pub mod registry;

pub use config::{ImgproxyOptions, LoaderOptions};
pub use error::{ConfigError, LoaderError};
pub use imgproxy::{ImgproxyUrlBuilder, url_builder};
pub use loader::{LoaderRequest, ResponsiveImageLoader};
pub use models::{Breakpoint, ImageSource, LoaderResult, SrcSet};
pub use registry::UrlRegistry;
