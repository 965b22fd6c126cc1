//! GitHub File Operations
//!
//! Decoding of file bodies returned by the contents API.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::types::ContentFile;
use crate::error::ScanError;

/// Decode a contents API response into raw bytes.
///
/// The API wraps base64 bodies at 60 columns, so whitespace is stripped first.
pub fn decode_content(file: &ContentFile) -> Result<Vec<u8>, ScanError> {
    let body = file.content.as_deref().unwrap_or_default();
    let encoding = file.encoding.as_deref().unwrap_or("base64");

    match encoding {
        "base64" => {
            let cleaned: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
            STANDARD.decode(cleaned).map_err(|e| {
                ScanError::PartialData(format!("Failed to decode {}: {}", file.path, e))
            })
        }
        "utf-8" | "utf8" => Ok(body.as_bytes().to_vec()),
        // Files above the inline size limit come back with encoding "none"
        other => Err(ScanError::PartialData(format!(
            "Unsupported encoding '{}' for {}",
            other, file.path
        ))),
    }
}
