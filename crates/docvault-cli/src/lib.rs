//! Helpers shared by the `docvault` command-line tool.

use std::path::Path;
use std::time::Duration;

use docvault_core::models::ExtractionAttempt;
use docvault_core::ClassifierSettings;

/// Truncate to `max_chars` characters, appending "..." if truncated.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Command-line flags win over the environment-derived settings.
pub fn override_classifier_settings(
    mut settings: ClassifierSettings,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
) -> ClassifierSettings {
    if let Some(base_url) = base_url {
        settings.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(model) = model {
        settings.model = model;
    }
    if let Some(secs) = timeout_secs {
        settings.timeout = Duration::from_secs(secs);
    }
    settings
}

/// MIME type for the file extensions the pipeline accepts.
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "txt" | "text" => Some("text/plain"),
        _ => None,
    }
}

/// One line per attempt: strategy, outcome, elapsed time and a text preview
/// or the diagnostic.
pub fn render_attempts(attempts: &[ExtractionAttempt]) -> String {
    let mut out = format!(
        "{:<20} {:<8} {:>8}  {}\n",
        "STRATEGY", "RESULT", "MS", "DETAIL"
    );
    for attempt in attempts {
        let (result, detail) = match (&attempt.diagnostic, attempt.succeeded) {
            (_, true) => ("ok", truncate_chars(&attempt.text.replace('\n', " "), 60)),
            (Some(diagnostic), false) => ("failed", truncate_chars(diagnostic, 60)),
            (None, false) => ("empty", String::new()),
        };
        out.push_str(&format!(
            "{:<20} {:<8} {:>8}  {}\n",
            attempt.strategy.as_str(), result, attempt.elapsed_ms, detail
        ));
    }
    out
}

/// Initialize tracing for the CLI; logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}
