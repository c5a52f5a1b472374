//! Reference frame to inline base64 image.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use framecast_core::frames::Frame;
use framecast_veo::messages::InlineImage;

use crate::error::GenerationError;

/// Sent when neither the file nor its header identify the image type.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Read the frame's file and encode it for the submission body.
///
/// The declared mime type wins; otherwise the type is sniffed from the
/// image header.
pub async fn encode_frame(frame: &Frame) -> Result<InlineImage, GenerationError> {
    let file = frame.file();
    let bytes = file
        .read()
        .await
        .map_err(|source| GenerationError::Encoding {
            name: file.name().to_string(),
            source,
        })?;

    let mime_type = file
        .mime_type()
        .map(str::to_string)
        .or_else(|| sniff_mime_type(&bytes))
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

    tracing::debug!(
        frame_id = %frame.id(),
        bytes = bytes.len(),
        mime_type = %mime_type,
        "Encoded reference frame",
    );

    Ok(InlineImage {
        bytes_base64_encoded: STANDARD.encode(&bytes),
        mime_type,
    })
}

/// Identify an image format from its magic bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<String> {
    image::guess_format(bytes)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}
