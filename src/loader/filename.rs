//! Breakpoint file name parsing.

use regex::Regex;

use crate::models::{ALL_BREAKPOINTS, Breakpoint, SUPPORTED_EXTENSIONS};

/// Breakpoint token and extension split from an image file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedFileName<'a> {
    /// Configured breakpoint name or the catch-all token.
    pub breakpoint_name: &'a str,
    /// Original image extension.
    pub extension: &'a str,
}

/// Matcher for `<breakpoint|all>.<png|jpg|jpeg|gif>` file names.
///
/// The alternation is generated from the configured breakpoints, so only exact,
/// case-sensitive breakpoint names are accepted.
#[derive(Debug, Clone)]
pub struct FileNamePattern {
    pattern: Regex,
}

impl FileNamePattern {
    /// Compile the pattern for the given breakpoints.
    pub fn new(breakpoints: &[Breakpoint]) -> Self {
        let names = breakpoints
            .iter()
            .map(|breakpoint| regex::escape(&breakpoint.name))
            .chain(std::iter::once(ALL_BREAKPOINTS.to_string()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(
            r"^(?P<breakpoint>{names})\.(?P<extension>{})$",
            SUPPORTED_EXTENSIONS.join("|")
        );
        // Every name is escaped, leaving only literal alternations.
        let pattern = Regex::new(&pattern).expect("invalid breakpoint file name regex");
        Self { pattern }
    }

    /// Split `file_name` into breakpoint and extension, or `None` when it does not follow
    /// the naming convention.
    pub fn parse<'a>(&self, file_name: &'a str) -> Option<ParsedFileName<'a>> {
        let captures = self.pattern.captures(file_name)?;
        Some(ParsedFileName {
            breakpoint_name: captures.name("breakpoint")?.as_str(),
            extension: captures.name("extension")?.as_str(),
        })
    }
}
