use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use agentchat_types::MAX_LOGO_BYTES;

use crate::ChatError;

/// Image MIME type for a logo file, by extension
pub fn logo_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "ico" => Some("image/x-icon"),
        _ => None,
    }
}

/// Read an image file into a `data:` URL, enforcing the 2 MB limit
pub fn logo_data_url(path: &Path) -> Result<String, ChatError> {
    let io_err = |source| ChatError::Io {
        path: path.display().to_string(),
        source,
    };

    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_LOGO_BYTES {
        return Err(ChatError::LogoTooLarge {
            size,
            max: MAX_LOGO_BYTES,
        });
    }

    let mime = logo_mime_type(path).ok_or_else(|| {
        ChatError::UnsupportedLogo(
            path.extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "(no extension)".to_string()),
        )
    })?;

    let bytes = std::fs::read(path).map_err(io_err)?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}
