//! Uploaded deal images: acceptance rules and stored references.
//!
//! An [`ImageUpload`] is the raw file as received. [`ImageUpload::validate`]
//! applies the type and size rules before anything touches the content root.
//! An [`AssetReference`] is what a deal record stores: either the shared
//! placeholder or `/uploads/<stored-name>` for a file the asset store wrote.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Error;

/// Largest accepted image, in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix under which stored images are served.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// Reference used when a deal has no uploaded image.
pub const PLACEHOLDER_IMAGE: &str = "/uploads/default.png";

const ALLOWED_EXTENSIONS: [&str; 3] = ["jpeg", "jpg", "png"];
const ALLOWED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

/// Reasons an upload is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetRejection {
    /// Extension or declared MIME type is outside the image allow-list.
    #[error("Only .jpeg, .jpg, and .png images are allowed")]
    UnsupportedMediaType {
        /// File name as declared by the client.
        file_name: String,
        /// MIME type as declared by the client.
        content_type: String,
    },
    /// File is larger than [`MAX_IMAGE_BYTES`].
    #[error("Image must be 5 MB or smaller")]
    PayloadTooLarge {
        /// Observed size in bytes (may be a lower bound when streaming stopped early).
        size: usize,
    },
}

impl From<AssetRejection> for Error {
    fn from(value: AssetRejection) -> Self {
        let message = value.to_string();
        match value {
            AssetRejection::UnsupportedMediaType { .. } => Self::unsupported_media_type(message),
            AssetRejection::PayloadTooLarge { .. } => Self::payload_too_large(message),
        }
    }
}

/// Image file received from a client, held in memory.
///
/// An upload whose body went past [`MAX_IMAGE_BYTES`] is kept as a
/// [`ImageUpload::truncated`] marker without its bytes, so the rejection can
/// be reported by whoever validates it rather than by the body reader.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    size: usize,
    bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish()
    }
}

/// Upload that passed [`ImageUpload::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedImage {
    extension: String,
    bytes: Vec<u8>,
}

impl AcceptedImage {
    /// Lowercase extension without the leading dot (`png`, `jpg`, `jpeg`).
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// File contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ImageUpload {
    /// Wrap a received file.
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size: bytes.len(),
            bytes,
        }
    }

    /// Record a file whose body exceeded [`MAX_IMAGE_BYTES`] after `size`
    /// bytes were seen. The bytes are dropped; validation always fails.
    #[must_use]
    pub fn truncated(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size: usize,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size: size.max(MAX_IMAGE_BYTES + 1),
            bytes: Vec::new(),
        }
    }

    /// Name declared by the client.
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// MIME type declared by the client.
    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size in bytes, as observed while reading the body.
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// True for a zero-byte upload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    fn type_is_allowed(&self) -> Option<String> {
        let extension = self.extension()?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return None;
        }
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        ALLOWED_MIME_TYPES
            .contains(&essence.as_str())
            .then_some(extension)
    }

    /// Apply the type and size rules, converting into an [`AcceptedImage`].
    ///
    /// The type is judged first, so an oversized `.gif` reports the type.
    ///
    /// # Errors
    /// [`AssetRejection::UnsupportedMediaType`] when the extension or MIME
    /// type is outside {jpeg, jpg, png}; [`AssetRejection::PayloadTooLarge`]
    /// when the file exceeds [`MAX_IMAGE_BYTES`].
    pub fn validate(self) -> Result<AcceptedImage, AssetRejection> {
        let Some(extension) = self.type_is_allowed() else {
            return Err(AssetRejection::UnsupportedMediaType {
                file_name: self.file_name,
                content_type: self.content_type,
            });
        };
        if self.size > MAX_IMAGE_BYTES {
            return Err(AssetRejection::PayloadTooLarge { size: self.size });
        }
        Ok(AcceptedImage {
            extension,
            bytes: self.bytes,
        })
    }
}

/// True when `name` is a single, plain path segment safe to resolve inside
/// the content root.
#[must_use]
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Image reference stored on a deal.
///
/// # Examples
/// ```
/// use deals_backend::domain::AssetReference;
///
/// let stored = AssetReference::for_stored_name("1735689600000.png");
/// assert_eq!(stored.as_str(), "/uploads/1735689600000.png");
/// assert_eq!(stored.file_name(), Some("1735689600000.png"));
/// assert!(AssetReference::placeholder().is_placeholder());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AssetReference(String);

impl AssetReference {
    /// The shared placeholder reference.
    #[must_use]
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_IMAGE.to_owned())
    }

    /// Reference for a file stored under `name` in the content root.
    #[must_use]
    pub fn for_stored_name(name: &str) -> Self {
        Self(format!("{UPLOADS_PREFIX}{name}"))
    }

    /// True for the placeholder, which is never deleted.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0 == PLACEHOLDER_IMAGE
    }

    /// Stored file name, when this reference points inside the content root.
    ///
    /// Returns `None` for references with another prefix or an unsafe name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0
            .strip_prefix(UPLOADS_PREFIX)
            .filter(|name| is_safe_file_name(name))
    }

    /// Reference text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AssetReference {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AssetReference {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<AssetReference> for String {
    fn from(value: AssetReference) -> Self {
        value.0
    }
}
