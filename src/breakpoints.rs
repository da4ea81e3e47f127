//! Media conditions for configured breakpoints.

use crate::models::Breakpoint;

/// Media condition describing the viewports a breakpoint applies to.
///
/// An explicit `media` value wins over the width bounds. A breakpoint without any layout
/// field has no condition.
pub fn breakpoint_media(breakpoint: &Breakpoint) -> Option<String> {
    if let Some(media) = breakpoint.media.as_deref() {
        return Some(media.to_string());
    }

    let conditions: Vec<String> = [
        breakpoint.min_width.map(|width| format!("(min-width: {width}px)")),
        breakpoint.max_width.map(|width| format!("(max-width: {width}px)")),
    ]
    .into_iter()
    .flatten()
    .collect();

    (!conditions.is_empty()).then(|| conditions.join(" and "))
}
