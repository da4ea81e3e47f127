//! Loader configuration: breakpoints and imgproxy settings.
//!
//! Options arrive either as an already-parsed JSON value (from a host that embeds the
//! loader) or as a JSON/YAML file on disk. In both cases the value is checked against a
//! fixed schema first, so that a mistyped field is reported by its path instead of as a
//! generic deserialisation failure.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::models::{ALL_BREAKPOINTS, Breakpoint};

/// File names checked by [`LoaderOptions::discover`], in order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = [
    "imgproxy.config.json",
    "imgproxy.config.yaml",
    "imgproxy.config.yml",
];

const ROOT_PATH: &str = "options";

/// Remote processing settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImgproxyOptions {
    /// Serve the bundler output directly instead of proxy URLs.
    pub disable: bool,
    /// Origin the proxy fetches source images from.
    pub images_host: String,
    /// Public origin of the imgproxy service.
    pub host: String,
}

/// Validated loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderOptions {
    /// Breakpoints in ascending display order.
    pub breakpoints: Vec<Breakpoint>,
    /// Remote processing settings.
    pub imgproxy: ImgproxyOptions,
}

impl LoaderOptions {
    /// Validate a raw options value and convert it into typed options.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        validate_schema(&value)?;
        let options: Self = serde_json::from_value(value)
            .map_err(|err| ConfigError::schema(ROOT_PATH, err.to_string()))?;
        options.validate_breakpoint_names()?;
        Ok(options)
    }

    /// Read options from a JSON or YAML file, chosen by extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml")
            });

        let value: Value = if is_yaml {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        log::debug!("loaded loader options from {}", path.display());
        Self::from_value(value)
    }

    /// Load the first default configuration file present in `dir`.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidate =
            discover_config_file(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;
        Self::from_path(&candidate)
    }

    /// Position of the breakpoint called `name` in the configured list.
    pub fn breakpoint_index(&self, name: &str) -> Option<usize> {
        self.breakpoints
            .iter()
            .position(|breakpoint| breakpoint.name == name)
    }

    fn validate_breakpoint_names(&self) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for breakpoint in &self.breakpoints {
            if breakpoint.name == ALL_BREAKPOINTS {
                return Err(ConfigError::ReservedBreakpoint);
            }
            if !seen.insert(breakpoint.name.as_str()) {
                return Err(ConfigError::DuplicateBreakpoint(breakpoint.name.clone()));
            }
        }
        Ok(())
    }
}

/// Path of the first default configuration file present in `dir`.
pub fn discover_config_file(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn validate_schema(value: &Value) -> Result<(), ConfigError> {
    let root = expect_object(value, ROOT_PATH)?;

    let breakpoints_path = format!("{ROOT_PATH}.breakpoints");
    let breakpoints = root
        .get("breakpoints")
        .ok_or_else(|| missing(&breakpoints_path))?
        .as_array()
        .ok_or_else(|| ConfigError::schema(&breakpoints_path, "should be an array"))?;

    for (index, breakpoint) in breakpoints.iter().enumerate() {
        let path = format!("{breakpoints_path}[{index}]");
        let fields = expect_object(breakpoint, &path)?;

        let name_path = format!("{path}.name");
        let name = fields
            .get("name")
            .ok_or_else(|| missing(&name_path))?
            .as_str()
            .ok_or_else(|| ConfigError::schema(&name_path, "should be a string"))?;
        if name.is_empty() {
            return Err(ConfigError::schema(&name_path, "should be a non-empty string"));
        }

        for key in ["minWidth", "maxWidth"] {
            if let Some(width) = fields.get(key) {
                let in_range = width.as_u64().is_some_and(|width| u32::try_from(width).is_ok());
                if !in_range {
                    return Err(ConfigError::schema(
                        format!("{path}.{key}"),
                        "should be a non-negative integer",
                    ));
                }
            }
        }

        if let Some(media) = fields.get("media")
            && !media.is_string()
        {
            return Err(ConfigError::schema(format!("{path}.media"), "should be a string"));
        }
    }

    let imgproxy_path = format!("{ROOT_PATH}.imgproxy");
    let imgproxy = expect_object(
        root.get("imgproxy").ok_or_else(|| missing(&imgproxy_path))?,
        &imgproxy_path,
    )?;

    let disable_path = format!("{imgproxy_path}.disable");
    if !imgproxy
        .get("disable")
        .ok_or_else(|| missing(&disable_path))?
        .is_boolean()
    {
        return Err(ConfigError::schema(&disable_path, "should be a boolean"));
    }

    for key in ["imagesHost", "host"] {
        let path = format!("{imgproxy_path}.{key}");
        if !imgproxy.get(key).ok_or_else(|| missing(&path))?.is_string() {
            return Err(ConfigError::schema(&path, "should be a string"));
        }
    }

    Ok(())
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| ConfigError::schema(path, "should be an object"))
}

fn missing(path: &str) -> ConfigError {
    ConfigError::schema(path, "is required")
}
