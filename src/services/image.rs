//! Photo encoding.
//!
//! Reads an attached file into memory under a size ceiling. The size is
//! checked from metadata before reading and again on the bytes actually
//! read, so a file that grows mid-read is still rejected. No decoding or
//! resizing happens here.

use std::path::Path;
use tokio::io::AsyncReadExt;

use crate::models::{EncodedImage, MAX_IMAGE_BYTES, check_image_size};
use crate::{Error, Result};

/// Reads photos under a size ceiling.
#[derive(Debug, Clone, Copy)]
pub struct ImageEncoder {
    limit: u64,
}

impl Default for ImageEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageEncoder {
    /// Creates an encoder with the default 1 MiB ceiling.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            limit: MAX_IMAGE_BYTES,
        }
    }

    /// Creates an encoder with a custom ceiling.
    ///
    /// The ceiling is capped at the 1 MiB storage limit.
    #[must_use]
    pub const fn with_limit(limit: u64) -> Self {
        Self {
            limit: if limit < MAX_IMAGE_BYTES {
                limit
            } else {
                MAX_IMAGE_BYTES
            },
        }
    }

    /// Returns the ceiling in bytes.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Reads the file at `path`.
    ///
    /// Dropping the returned future abandons the read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if the file exceeds the ceiling,
    /// or [`Error::EncodingFailed`] if it cannot be read.
    pub async fn encode(&self, path: &Path) -> Result<EncodedImage> {
        let encoding_failed = |e: std::io::Error| {
            Error::EncodingFailed(format!("{}: {e}", path.display()))
        };

        let metadata = tokio::fs::metadata(path).await.map_err(encoding_failed)?;
        if !metadata.is_file() {
            return Err(Error::EncodingFailed(format!(
                "{} is not a file",
                path.display()
            )));
        }
        check_image_size(metadata.len(), self.limit)?;

        let file = tokio::fs::File::open(path).await.map_err(encoding_failed)?;
        let mut bytes = Vec::new();
        file.take(self.limit + 1)
            .read_to_end(&mut bytes)
            .await
            .map_err(encoding_failed)?;

        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        tracing::debug!(file = %file_name, size = bytes.len(), "Read image");
        self.encode_bytes(file_name, bytes)
    }

    /// Wraps in-memory bytes, applying the same ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if `bytes` exceeds the ceiling.
    pub fn encode_bytes(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> Result<EncodedImage> {
        check_image_size(bytes.len() as u64, self.limit)?;

        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(EncodedImage {
            file_name,
            mime,
            bytes,
        })
    }
}
