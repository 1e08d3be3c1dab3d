//! Shared utility functions used across multiple modules.

use std::sync::atomic::{AtomicI64, Ordering};

use base64::Engine as _;
use uuid::Uuid;

/// Generate a new collision-safe record id (UUID v7, time-sortable).
#[must_use]
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Current Unix timestamp in milliseconds, strictly increasing per process.
///
/// Notification ordering and uniqueness both rely on this value, so two
/// calls in the same millisecond still return distinct timestamps.
#[must_use]
pub fn unique_millis() -> i64 {
    static LAST: AtomicI64 = AtomicI64::new(0);

    let now = chrono::Utc::now().timestamp_millis();
    let mut prev = LAST.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Embed raw image bytes as a self-contained `data:` URL.
#[must_use]
pub fn data_url(content_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{content_type};base64,{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_unique() {
        assert_ne!(new_id(), new_id());
    }

    #[test]
    fn unique_millis_is_strictly_increasing() {
        let a = unique_millis();
        let b = unique_millis();
        let c = unique_millis();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" https://example.com ".to_string())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn is_http_url_accepts_valid_schemes() {
        assert!(is_http_url("http://localhost"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn data_url_embeds_content_type() {
        let url = data_url("image/png", &[1, 2, 3]);
        assert!(url.starts_with("data:image/png;base64,"));
    }
}
