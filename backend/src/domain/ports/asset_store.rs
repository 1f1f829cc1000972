//! Port for the uploaded-image content root.

use async_trait::async_trait;

use crate::domain::{AcceptedImage, AssetReference};

use super::define_port_error;

define_port_error! {
    /// Errors raised by asset store adapters.
    pub enum AssetStoreError {
        /// The reference does not name a file inside the content root.
        InvalidReference { reference: String } =>
            "asset reference is outside the content root: {reference}",
        /// No stored file has this name.
        Missing { name: String } => "asset not found: {name}",
        /// Filesystem operation failed.
        Io { message: String } => "asset store I/O failed: {message}",
    }
}

/// Port managing stored deal images.
///
/// ## Invariants
/// - `accept` generates names and never overwrites an existing file.
/// - `discard` never removes the placeholder and treats a missing file as
///   already discarded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist an image that already passed the upload rules, returning its
    /// reference.
    async fn accept(&self, image: AcceptedImage) -> Result<AssetReference, AssetStoreError>;

    /// Delete the file behind `reference`, if any.
    async fn discard(&self, reference: &AssetReference) -> Result<(), AssetStoreError>;

    /// Read a stored file by name for serving back to clients.
    ///
    /// The whole file is returned in memory; accepted images never exceed
    /// [`crate::domain::MAX_IMAGE_BYTES`], which bounds the buffer.
    async fn open(&self, name: &str) -> Result<Vec<u8>, AssetStoreError>;
}
