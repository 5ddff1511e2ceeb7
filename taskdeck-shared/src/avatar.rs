//! Avatar image processing
//!
//! Uploaded avatars are JPEG or PNG files of at most [`AVATAR_MAX_BYTES`].
//! They are cropped and scaled to fill a [`AVATAR_SIZE`]×[`AVATAR_SIZE`]
//! square and stored re-encoded as PNG.

use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;

/// Largest accepted upload, in bytes
pub const AVATAR_MAX_BYTES: usize = 1_000_000;

/// Edge length of the stored avatar, in pixels
pub const AVATAR_SIZE: u32 = 250;

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Error type for avatar processing
#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("Please upload an image")]
    UnsupportedType,

    #[error("File too large")]
    TooLarge,

    #[error("Could not read image: {0}")]
    Decode(String),

    #[error("Could not encode avatar: {0}")]
    Encode(String),
}

/// True if the filename ends in .jpg, .jpeg or .png (any case)
pub fn is_allowed_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Decodes an uploaded image and returns the 250×250 PNG to store
///
/// This is CPU-bound; async callers should run it on the blocking pool.
pub fn process_avatar(bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    if bytes.len() > AVATAR_MAX_BYTES {
        return Err(AvatarError::TooLarge);
    }

    let format = image::guess_format(bytes).map_err(|e| AvatarError::Decode(e.to_string()))?;
    if !matches!(format, ImageFormat::Jpeg | ImageFormat::Png) {
        return Err(AvatarError::UnsupportedType);
    }

    let decoded = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| AvatarError::Decode(e.to_string()))?;

    let resized = decoded.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle);

    let mut png = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| AvatarError::Encode(e.to_string()))?;

    Ok(png)
}
