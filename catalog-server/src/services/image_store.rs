//! Image Store
//!
//! Validates and persists product images under the uploads directory.
//! Stored files are handed back behind a scoped guard: until the owning
//! relational write commits, dropping the guard removes the file again.

use std::fs;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::utils::AppError;

/// Maximum file size (2 MiB)
const MAX_FILE_SIZE: usize = 2 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Namespace under the uploads root for product images
const PRODUCTS_DIR: &str = "products";

/// Image submitted to product creation
#[derive(Debug, Clone)]
pub enum ImageUpload {
    /// Uploaded file contents (HTTP multipart path)
    Bytes { filename: String, data: Vec<u8> },
    /// File on the local filesystem (command-line originated path)
    File(PathBuf),
}

/// Image storage service rooted at the uploads directory
#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Validate and persist an upload under `products/`.
    ///
    /// The returned guard deletes the stored file on drop unless
    /// [`StoredImage::commit`] is called.
    pub fn store(&self, upload: ImageUpload) -> Result<StoredImage, AppError> {
        let (data, ext) = match upload {
            ImageUpload::Bytes { filename, data } => {
                let ext = extension_of(Path::new(&filename)).ok_or_else(|| {
                    AppError::validation(format!("Invalid file extension for: {filename}"))
                })?;
                validate_extension(&ext)?;
                validate_size(data.len())?;
                if data.is_empty() {
                    return Err(AppError::validation("Empty file provided"));
                }
                // Verify it's actually an image by trying to load it
                if let Err(e) = image::load_from_memory(&data) {
                    return Err(AppError::validation(format!(
                        "Invalid image file ({ext}): {e}"
                    )));
                }
                (data, ext)
            }
            ImageUpload::File(path) => {
                let ext = extension_of(&path).ok_or_else(|| {
                    AppError::validation(format!(
                        "Invalid file extension for: {}",
                        path.display()
                    ))
                })?;
                validate_extension(&ext)?;
                let data = fs::read(&path).map_err(|e| {
                    AppError::validation(format!("Image file not found: {}: {e}", path.display()))
                })?;
                validate_size(data.len())?;
                (data, ext)
            }
        };

        let dir = self.root.join(PRODUCTS_DIR);
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::internal(format!("Failed to create images directory: {e}")))?;

        let file_name = format!("{}.{ext}", Uuid::new_v4());
        let file_path = dir.join(&file_name);
        fs::write(&file_path, &data)
            .map_err(|e| AppError::internal(format!("Failed to save file: {e}")))?;

        tracing::info!(path = %file_path.display(), size = data.len(), "Image stored");

        Ok(StoredImage {
            file_path,
            relative: format!("{PRODUCTS_DIR}/{file_name}"),
            committed: false,
        })
    }

    /// Best-effort delete of a stored image; failures are logged, never raised.
    pub fn delete(&self, relative: &str) -> bool {
        let Some(path) = self.resolve(relative) else {
            tracing::warn!(path = %relative, "Refusing to delete image outside the uploads root");
            return false;
        };
        match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "Failed to delete image");
                false
            }
        }
    }

    /// Resolve a stored path to a file path under the root, rejecting traversal
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let rel = Path::new(relative);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(rel))
    }
}

/// A stored image that has not been committed yet.
///
/// Dropping the guard removes the file (best effort, errors logged); call
/// [`commit`](Self::commit) once the owning relational write succeeded.
#[derive(Debug)]
pub struct StoredImage {
    file_path: PathBuf,
    relative: String,
    committed: bool,
}

impl StoredImage {
    /// Path stored on the product row (`products/<uuid>.<ext>`)
    pub fn relative_path(&self) -> &str {
        &self.relative
    }

    /// Keep the file: the relational write committed
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for StoredImage {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.file_path) {
            tracing::warn!(path = %self.file_path.display(), error = %e, "Failed to clean up uncommitted image");
        } else {
            tracing::info!(path = %self.file_path.display(), "Uncommitted image cleaned up");
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn validate_extension(ext: &str) -> Result<(), AppError> {
    if !SUPPORTED_FORMATS.contains(&ext) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{ext}'. Supported: {}",
            SUPPORTED_FORMATS.join(", ")
        )));
    }
    Ok(())
}

fn validate_size(len: usize) -> Result<(), AppError> {
    if len > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {} bytes ({}MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }
    Ok(())
}
