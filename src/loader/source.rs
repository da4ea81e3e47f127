//! Extraction of the output path from the upstream module source.

use std::sync::OnceLock;

use regex::Regex;

fn exported_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^module\.exports = ("(?:[^"\\]|\\.)+");$"#)
            .expect("invalid module.exports regex")
    })
}

/// Extract the output path from an upstream `module.exports = "<path>";` module.
///
/// The quoted literal is decoded as a JSON string so escaped characters survive. Trailing
/// whitespace is ignored; any other deviation from the shape yields `None`.
pub fn parse_exported_path(source: &str) -> Option<String> {
    let captures = exported_path_pattern().captures(source.trim_end())?;
    let literal = captures.get(1)?.as_str();
    serde_json::from_str::<String>(literal)
        .ok()
        .filter(|path| !path.is_empty())
}
