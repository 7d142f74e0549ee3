// src/core/snapshot.rs — Image payloads, history snapshots, and data URIs

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::infra::errors::PixshopError;

/// An image payload that is not (yet) part of a history.
///
/// The byte buffer is shared, so clones are cheap and never copy pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    media_type: String,
    bytes: Arc<[u8]>,
}

impl ImageData {
    pub fn new(media_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file, detecting its media type from content first and the
    /// extension second. Unknown files get `application/octet-stream` and
    /// are rejected later by `History::load`.
    pub async fn read(path: &Path) -> Result<Self, PixshopError> {
        let bytes = tokio::fs::read(path).await?;
        let media_type = sniff_media_type(&bytes)
            .or_else(|| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .and_then(media_type_for_extension)
            })
            .unwrap_or("application/octet-stream");
        tracing::debug!(path = %path.display(), media_type, size = bytes.len(), "Image read");
        Ok(Self::new(media_type, bytes))
    }

    /// Decode a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, PixshopError> {
        let (header, payload) = uri
            .split_once(',')
            .ok_or_else(|| PixshopError::invalid_input("Invalid data URL"))?;

        let mime = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime.trim())
            .filter(|mime| !mime.is_empty())
            .ok_or_else(|| {
                PixshopError::invalid_input("Could not parse MIME type from data URL")
            })?;

        if !header.ends_with(";base64") {
            return Err(PixshopError::invalid_input(
                "Data URL payload is not base64-encoded",
            ));
        }

        let bytes = BASE64.decode(payload.trim()).map_err(|e| {
            PixshopError::invalid_input(format!("Invalid base64 payload in data URL: {e}"))
        })?;

        Ok(Self::new(mime, bytes))
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.to_base64())
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }

    /// File extension (without dot) matching the media type.
    pub fn extension(&self) -> &'static str {
        extension_for_media_type(&self.media_type)
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// One immutable version of the image, positioned in a history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    seq: u64,
    image: ImageData,
}

impl Snapshot {
    pub(crate) fn new(seq: u64, image: ImageData) -> Self {
        Self { seq, image }
    }

    /// Sequence position assigned by the owning history. Strictly increasing
    /// across every snapshot that history ever created.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn image(&self) -> &ImageData {
        &self.image
    }

    pub fn media_type(&self) -> &str {
        self.image.media_type()
    }

    pub fn bytes(&self) -> &[u8] {
        self.image.bytes()
    }
}

pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

/// Detect a media type from magic bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        match &bytes[8..12] {
            b"heic" | b"heix" | b"mif1" => Some("image/heic"),
            b"avif" => Some("image/avif"),
            _ => None,
        }
    } else if bytes.starts_with(b"BM") {
        Some("image/bmp")
    } else {
        None
    }
}

pub fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" | "heif" => Some("image/heic"),
        "avif" => Some("image/avif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Unknown image types fall back to `png`, which is what the generator
/// returns in practice.
pub fn extension_for_media_type(media_type: &str) -> &'static str {
    match media_type.trim().to_ascii_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/heic" | "image/heif" => "heic",
        "image/avif" => "avif",
        "image/bmp" => "bmp",
        _ => "png",
    }
}
