use std::sync::LazyLock;

use docvault_core::models::TextQuality;
use regex::Regex;

// OCR engines and upstream converters leave placeholders such as
// `[unreadable]`, `[illegible]` or `[image]` where they gave up.
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[\p{L}][\p{L} ._-]{1,29}\]").expect("marker pattern is valid")
});

/// Flag bracketed placeholder markers, in order of first appearance.
pub fn assess_quality(text: &str) -> TextQuality {
    let mut markers: Vec<String> = Vec::new();
    for m in MARKER_RE.find_iter(text) {
        let marker = m.as_str();
        if !markers.iter().any(|seen| seen == marker) {
            markers.push(marker.to_string());
        }
    }

    if markers.is_empty() {
        TextQuality::Clean
    } else {
        TextQuality::ContainsMarkers { markers }
    }
}
