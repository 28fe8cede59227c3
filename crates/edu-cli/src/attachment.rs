//! Image files to `data:` URLs for the solver.

use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

fn mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Reads an image and encodes it as a base64 `data:` URL.
pub fn image_data_url(path: &Path) -> Result<String> {
    let Some(mime_type) = mime_type(path) else {
        bail!("Unsupported image type: {}", path.display());
    };
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    Ok(format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(bytes)))
}
