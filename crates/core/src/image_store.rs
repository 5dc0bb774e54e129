//! Filesystem storage for uploaded animal images.
//!
//! Files are named `<uuid>.<extension>`, where the extension is derived from
//! the upload's `image/*` content type. The returned location is the absolute
//! path of the stored file and is what gets persisted in `animal_images`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::CoreError;

/// Content types accepted by [`ImageStore::save`] start with this prefix.
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Derive a file extension from an `image/*` content type.
///
/// Parameters (`; charset=...`) are ignored and a structured-syntax suffix is
/// dropped, so `image/svg+xml` yields `svg`.
pub fn image_extension(content_type: &str) -> Result<String, CoreError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let subtype = essence
        .strip_prefix(IMAGE_CONTENT_TYPE_PREFIX)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "The content type must be an image, not '{content_type}'"
            ))
        })?;

    let extension = subtype.split('+').next().unwrap_or_default();
    let well_formed = !extension.is_empty()
        && extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !well_formed {
        return Err(CoreError::Validation(format!(
            "Unsupported image content type '{content_type}'"
        )));
    }

    Ok(extension.to_string())
}

/// Persists and removes binary image content.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `content`, returning an opaque location handle.
    ///
    /// Fails with [`CoreError::Validation`] if `content_type` is not an image.
    async fn save(&self, content: &[u8], content_type: &str) -> Result<String, CoreError>;

    /// Remove the image at `location`. Removing an absent image succeeds.
    async fn delete(&self, location: &str) -> Result<(), CoreError>;

    /// Check that the store can currently accept new images.
    async fn health_check(&self) -> Result<(), CoreError>;
}

/// [`ImageStore`] backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalFileSystemImageStore {
    directory: PathBuf,
}

impl LocalFileSystemImageStore {
    /// Open a store rooted at `directory`, creating it if needed.
    pub async fn new(directory: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let directory = directory.into();
        tokio::fs::create_dir_all(&directory).await?;
        let directory = tokio::fs::canonicalize(&directory).await?;
        Ok(Self { directory })
    }

    /// The absolute directory images are written to.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, CoreError> {
        let path = PathBuf::from(location);
        if path.parent() != Some(self.directory.as_path()) {
            return Err(CoreError::Validation(format!(
                "Image location '{location}' is outside the image directory"
            )));
        }
        Ok(path)
    }
}

#[async_trait]
impl ImageStore for LocalFileSystemImageStore {
    async fn save(&self, content: &[u8], content_type: &str) -> Result<String, CoreError> {
        let extension = image_extension(content_type)?;
        let path = self
            .directory
            .join(format!("{}.{extension}", Uuid::new_v4()));

        // create_new: a name collision is an error, never an overwrite.
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(content).await?;
            file.sync_all().await
        }
        .await;

        if let Err(err) = written {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %cleanup, "Failed to remove partial image");
            }
            return Err(err.into());
        }

        tracing::debug!(path = %path.display(), bytes = content.len(), "Image stored");
        Ok(path.to_string_lossy().into_owned())
    }

    async fn delete(&self, location: &str) -> Result<(), CoreError> {
        let path = self.resolve(location)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Image deleted");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        let metadata = tokio::fs::metadata(&self.directory).await?;
        if !metadata.is_dir() {
            return Err(CoreError::Internal(format!(
                "Image directory '{}' is not a directory",
                self.directory.display()
            )));
        }
        if metadata.permissions().readonly() {
            return Err(CoreError::Internal(format!(
                "Image directory '{}' is read-only",
                self.directory.display()
            )));
        }
        Ok(())
    }
}

/// An image that has been written to the store but whose metadata has not
/// been committed yet.
///
/// Exactly one of [`commit`](Self::commit) or [`rollback`](Self::rollback)
/// should be called. Rollback runs the inverse of the save (a delete).
#[must_use = "a staged image must be committed or rolled back"]
pub struct StagedImage<'a> {
    store: &'a dyn ImageStore,
    location: String,
}

impl<'a> StagedImage<'a> {
    /// Forward step: write the image to `store`.
    pub async fn stage(
        store: &'a dyn ImageStore,
        content: &[u8],
        content_type: &str,
    ) -> Result<Self, CoreError> {
        let location = store.save(content, content_type).await?;
        Ok(Self { store, location })
    }

    /// Location of the staged file.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Keep the file; its metadata is now durable.
    pub fn commit(self) -> String {
        self.location
    }

    /// Inverse step: delete the file. Failures are logged, not returned, so
    /// the caller can still report the error that caused the rollback.
    pub async fn rollback(self) {
        match self.store.delete(&self.location).await {
            Ok(()) => tracing::warn!(location = %self.location, "Rolled back staged image"),
            Err(err) => tracing::error!(
                location = %self.location,
                error = %err,
                "Failed to roll back staged image"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    async fn store() -> (tempfile::TempDir, LocalFileSystemImageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileSystemImageStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    fn file_count(store: &LocalFileSystemImageStore) -> usize {
        std::fs::read_dir(store.directory()).unwrap().count()
    }

    #[test]
    fn extension_from_simple_subtype() {
        assert_eq!(image_extension("image/png").unwrap(), "png");
        assert_eq!(image_extension("image/jpeg").unwrap(), "jpeg");
    }

    #[test]
    fn extension_ignores_parameters_and_case() {
        assert_eq!(image_extension("Image/WebP; q=0.9").unwrap(), "webp");
    }

    #[test]
    fn extension_drops_structured_suffix() {
        assert_eq!(image_extension("image/svg+xml").unwrap(), "svg");
    }

    #[test]
    fn non_image_content_type_is_rejected() {
        assert_matches!(image_extension("text/plain"), Err(CoreError::Validation(_)));
        assert_matches!(image_extension("image/"), Err(CoreError::Validation(_)));
        assert_matches!(image_extension("image/../x"), Err(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn new_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = LocalFileSystemImageStore::new(&nested).await.unwrap();
        assert!(store.directory().is_dir());
    }

    #[tokio::test]
    async fn save_writes_file_with_matching_extension() {
        let (_dir, store) = store().await;
        let location = store.save(b"\x89PNG", "image/png").await.unwrap();

        let path = Path::new(&location);
        assert_eq!(path.parent(), Some(store.directory()));
        assert_eq!(path.extension().unwrap(), "png");
        assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn save_uses_distinct_names() {
        let (_dir, store) = store().await;
        let a = store.save(b"a", "image/gif").await.unwrap();
        let b = store.save(b"b", "image/gif").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(file_count(&store), 2);
    }

    #[tokio::test]
    async fn save_rejects_non_image_without_writing() {
        let (_dir, store) = store().await;
        let result = store.save(b"hello", "text/plain").await;
        assert_matches!(result, Err(CoreError::Validation(_)));
        assert_eq!(file_count(&store), 0);
    }

    #[tokio::test]
    async fn delete_removes_file_and_is_idempotent() {
        let (_dir, store) = store().await;
        let location = store.save(b"img", "image/png").await.unwrap();

        store.delete(&location).await.unwrap();
        assert!(!Path::new(&location).exists());

        store.delete(&location).await.unwrap();
    }

    #[tokio::test]
    async fn delete_refuses_paths_outside_directory() {
        let (_dir, store) = store().await;
        let outside = tempfile::NamedTempFile::new().unwrap();
        let location = outside.path().to_string_lossy().into_owned();

        assert_matches!(store.delete(&location).await, Err(CoreError::Validation(_)));
        assert!(outside.path().exists());
    }

    #[tokio::test]
    async fn health_check_tracks_directory() {
        let (dir, store) = store().await;
        store.health_check().await.unwrap();

        std::fs::remove_dir(dir.path()).unwrap();
        assert_matches!(store.health_check().await, Err(CoreError::Io(_)));
    }

    #[tokio::test]
    async fn staged_image_commit_keeps_file() {
        let (_dir, store) = store().await;
        let staged = StagedImage::stage(&store, b"img", "image/png").await.unwrap();
        let location = staged.commit();
        assert!(Path::new(&location).exists());
    }

    #[tokio::test]
    async fn staged_image_rollback_deletes_file() {
        let (_dir, store) = store().await;
        let staged = StagedImage::stage(&store, b"img", "image/png").await.unwrap();
        let location = staged.location().to_string();
        assert!(Path::new(&location).exists());

        staged.rollback().await;
        assert!(!Path::new(&location).exists());
        assert_eq!(file_count(&store), 0);
    }
}
