//! Data URI helpers
//!
//! Images travel through the store as `data:<mime>;base64,<payload>` strings.
//! These helpers classify such strings and build them from raw file bytes.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::errors::{AppError, AppResult};

const DATA_PREFIX: &str = "data:";
const IMAGE_DATA_PREFIX: &str = "data:image/";
const CACHE_BUSTER: &str = "#t=";

/// Any data URI (`data:` prefix).
pub fn is_data_uri(value: &str) -> bool {
    value.starts_with(DATA_PREFIX)
}

/// Data URI with an `image/*` media type.
pub fn is_image_data_uri(value: &str) -> bool {
    value.starts_with(IMAGE_DATA_PREFIX)
}

/// Append a `#t=<timestamp>` cache-busting fragment.
pub fn with_cache_buster(data_uri: &str, timestamp: i64) -> String {
    format!("{data_uri}{CACHE_BUSTER}{timestamp}")
}

/// Remove a trailing cache-busting fragment, if any.
pub fn strip_cache_buster(value: &str) -> &str {
    match value.rfind(CACHE_BUSTER) {
        Some(idx) if value[idx + CACHE_BUSTER.len()..].bytes().all(|b| b.is_ascii_digit()) => {
            &value[..idx]
        }
        _ => value,
    }
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Encode raw image bytes as a data URI, detecting the media type from magic numbers.
///
/// `fallback_mime` is used when detection fails (e.g. SVG, which has no signature).
pub fn encode_image(bytes: &[u8], fallback_mime: Option<&str>) -> AppResult<String> {
    let mime = match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => kind.mime_type(),
        Some(kind) => {
            return Err(AppError::Validation {
                message: format!("Not an image: detected {}", kind.mime_type()),
            });
        }
        None => fallback_mime.ok_or_else(|| AppError::Validation {
            message: "Unrecognised image format".to_string(),
        })?,
    };

    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

/// Media type guessed from a file extension, for formats without magic numbers.
pub fn mime_from_extension(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "svg" => Some("image/svg+xml"),
        "ico" => Some("image/x-icon"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
