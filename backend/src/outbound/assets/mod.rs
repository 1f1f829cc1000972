//! Filesystem asset store confined to a `cap_std` directory handle.
//!
//! The store only ever resolves single path segments inside its content
//! root. Names are generated from the injected clock so tests can predict
//! them; existing files are never overwritten.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::fs::{Dir, OpenOptions};
use cap_std::ambient_authority;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{AssetStore, AssetStoreError};
use crate::domain::{AcceptedImage, AssetReference, is_safe_file_name};

/// Upper bound on `-<n>` suffixes tried for one timestamp.
const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// [`AssetStore`] writing into a directory handle.
#[derive(Clone)]
pub struct CapStdAssetStore {
    root: Arc<Dir>,
    clock: Arc<dyn Clock>,
}

impl CapStdAssetStore {
    /// Wrap an already opened content root.
    pub fn new(root: Dir, clock: Arc<dyn Clock>) -> Self {
        Self {
            root: Arc::new(root),
            clock,
        }
    }

    /// Create `path` if needed and open it as the content root.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open_in(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> io::Result<Self> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self::new(root, clock))
    }

    async fn blocking<T, F>(&self, task: F) -> Result<T, AssetStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, AssetStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || task(&root))
            .await
            .map_err(|err| AssetStoreError::io(err.to_string()))?
    }
}

fn io_error(err: &io::Error) -> AssetStoreError {
    AssetStoreError::io(err.to_string())
}

fn candidate_name(stamp: i64, attempt: u32, extension: &str) -> String {
    if attempt == 0 {
        format!("{stamp}.{extension}")
    } else {
        format!("{stamp}-{attempt}.{extension}")
    }
}

/// Write `image` under the first free name for `stamp`.
fn write_new(root: &Dir, stamp: i64, image: &AcceptedImage) -> Result<String, AssetStoreError> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = candidate_name(stamp, attempt, image.extension());
        let mut file = match root.open_with(&name, &options) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(io_error(&err)),
        };
        if let Err(err) = file.write_all(image.bytes()).and_then(|()| file.sync_all()) {
            drop(file);
            drop(root.remove_file(&name));
            return Err(io_error(&err));
        }
        return Ok(name);
    }

    Err(AssetStoreError::io(format!(
        "no free file name for timestamp {stamp}"
    )))
}

#[async_trait]
impl AssetStore for CapStdAssetStore {
    async fn accept(&self, image: AcceptedImage) -> Result<AssetReference, AssetStoreError> {
        let stamp = self.clock.utc().timestamp_millis();

        let name = self
            .blocking(move |root| write_new(root, stamp, &image))
            .await?;
        debug!(file = %name, "stored uploaded image");
        Ok(AssetReference::for_stored_name(&name))
    }

    async fn discard(&self, reference: &AssetReference) -> Result<(), AssetStoreError> {
        if reference.is_placeholder() {
            return Ok(());
        }
        let name = reference
            .file_name()
            .ok_or_else(|| AssetStoreError::invalid_reference(reference.as_str()))?
            .to_owned();

        self.blocking(move |root| match root.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&err)),
        })
        .await
    }

    async fn open(&self, name: &str) -> Result<Vec<u8>, AssetStoreError> {
        if !is_safe_file_name(name) {
            return Err(AssetStoreError::missing(name));
        }
        let name = name.to_owned();
        self.blocking(move |root| match root.read(&name) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(AssetStoreError::missing(name))
            }
            Err(err) => Err(io_error(&err)),
        })
        .await
    }
}
