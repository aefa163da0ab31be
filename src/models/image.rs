//! Encoded image payloads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::{Error, Result};

/// Largest accepted photo (1 MiB).
pub const MAX_IMAGE_BYTES: u64 = 1024 * 1024;

/// Fails with [`Error::PayloadTooLarge`] when `size` exceeds `limit`.
pub fn check_image_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(Error::PayloadTooLarge { size, limit });
    }
    Ok(())
}

/// A photo read into memory and ready to embed or upload.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Original file name, used for multipart uploads.
    pub file_name: String,
    /// MIME type guessed from the file name.
    pub mime: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true for an empty payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fails with [`Error::PayloadTooLarge`] when over [`MAX_IMAGE_BYTES`].
    pub fn ensure_within_ceiling(&self) -> Result<()> {
        check_image_size(self.bytes.len() as u64, MAX_IMAGE_BYTES)
    }

    /// Returns a self-contained `data:` URI for the payload.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

// Raw bytes are omitted so debug logs stay readable.
impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        let image = EncodedImage {
            file_name: "dot.png".to_string(),
            mime: "image/png".to_string(),
            bytes: b"hello".to_vec(),
        };
        assert_eq!(image.data_uri(), "data:image/png;base64,aGVsbG8=");
        assert_eq!(image.len(), 5);
        assert!(!format!("{image:?}").contains("104"));
        assert!(image.ensure_within_ceiling().is_ok());
    }

    #[test]
    fn test_check_image_size() {
        assert!(check_image_size(MAX_IMAGE_BYTES, MAX_IMAGE_BYTES).is_ok());
        assert!(matches!(
            check_image_size(MAX_IMAGE_BYTES + 1, MAX_IMAGE_BYTES),
            Err(Error::PayloadTooLarge { size, limit }) if size == MAX_IMAGE_BYTES + 1 && limit == MAX_IMAGE_BYTES
        ));
    }
}
