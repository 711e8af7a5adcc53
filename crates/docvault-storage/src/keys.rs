//! Shared key generation for storage backends.

use uuid::Uuid;

/// `documents/{user_id}/{filename}`. All backends must use this format.
pub fn generate_storage_key(user_id: Uuid, filename: &str) -> String {
    format!("documents/{}/{}", user_id, filename)
}

/// Reduce a client-supplied filename to a safe basename.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX: usize = 255;
    let path = std::path::Path::new(filename);
    let base = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);
    if base.contains("..") {
        return "invalid_filename".to_string();
    }
    let s: String = base
        .chars()
        .take(MAX)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if s.trim_matches('_').is_empty() {
        "file".to_string()
    } else {
        s
    }
}
