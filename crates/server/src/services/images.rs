//! Local image storage for product uploads.
//!
//! Images are written below a single directory that is also served under
//! `/static`. The uploaded filename is kept when it is safe and free;
//! otherwise a unique name is generated. Files are opened with
//! `create_new`, so an existing image is never overwritten.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Public URL prefix for stored images (relative, matches the `/static` mount).
pub const PUBLIC_IMAGE_PREFIX: &str = "static/images";

const MAX_NAME_ATTEMPTS: usize = 8;
const MAX_FILE_NAME_LEN: usize = 128;
const MAX_EXTENSION_LEN: usize = 8;

/// Errors from the image store.
#[derive(Debug, Error)]
pub enum ImageStoreError {
    /// Filesystem operation failed.
    #[error("image storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every candidate filename was already taken.
    #[error("could not find a free filename for '{0}'")]
    NoFreeName(String),
}

/// An image that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Name of the file inside the image directory.
    pub file_name: String,
    /// Path clients use to fetch the image (e.g. `static/images/bike.jpg`).
    pub public_path: String,
    /// Location on disk.
    pub disk_path: PathBuf,
}

/// Directory-backed store for product images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    public_prefix: String,
}

impl ImageStore {
    /// Create a store writing into `dir` and publishing paths under `public_prefix`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, public_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_owned(),
        }
    }

    /// Directory images are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the image directory if it is missing.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::Io` if the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<(), ImageStoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Public path for a file stored in this directory.
    #[must_use]
    pub fn public_path(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.public_prefix)
    }

    /// Write an uploaded image and return where it was stored.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::Io` if writing fails (a partial file is removed),
    /// or `ImageStoreError::NoFreeName` if no unused filename could be found.
    pub async fn save(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, ImageStoreError> {
        let preferred = sanitize_file_name(original_name)
            .unwrap_or_else(|| generated_name(extension_of(original_name).as_deref()));

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                preferred.clone()
            } else {
                with_unique_suffix(&preferred)
            };
            let disk_path = self.dir.join(&candidate);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&disk_path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(file_name = %candidate, "Image name taken, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Err(e) = write_all(&mut file, bytes).await {
                drop(file);
                if let Err(cleanup) = fs::remove_file(&disk_path).await {
                    warn!(path = %disk_path.display(), error = %cleanup, "Failed to remove partial image");
                }
                return Err(e.into());
            }

            debug!(file_name = %candidate, bytes = bytes.len(), "Image stored");
            return Ok(StoredImage {
                public_path: self.public_path(&candidate),
                file_name: candidate,
                disk_path,
            });
        }

        Err(ImageStoreError::NoFreeName(preferred))
    }

    /// Remove a stored image.
    ///
    /// # Errors
    ///
    /// Returns `ImageStoreError::Io` if the file exists but cannot be removed.
    pub async fn remove(&self, image: &StoredImage) -> Result<(), ImageStoreError> {
        match fs::remove_file(&image.disk_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_all(file: &mut fs::File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Reduce an uploaded filename to a safe, portable basename.
///
/// Directory components are stripped and whitespace becomes `-`. Returns
/// `None` when nothing usable remains or the name contains characters
/// outside `[A-Za-z0-9._-]`.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();

    if base.is_empty() || base.starts_with('.') || base.len() > MAX_FILE_NAME_LEN {
        return None;
    }

    let mut name = String::with_capacity(base.len());
    for c in base.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => name.push(c),
            c if c.is_whitespace() => name.push('-'),
            _ => return None,
        }
    }

    Some(name)
}

/// Lowercased extension of a filename if it is short and alphanumeric.
fn extension_of(raw: &str) -> Option<String> {
    let ext = Path::new(raw.rsplit(['/', '\\']).next()?)
        .extension()?
        .to_str()?;

    let usable = !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric());
    usable.then(|| ext.to_ascii_lowercase())
}

fn generated_name(extension: Option<&str>) -> String {
    let id = Uuid::new_v4().simple();
    extension.map_or_else(|| id.to_string(), |ext| format!("{id}.{ext}"))
}

/// `bike.jpg` -> `bike-1a2b3c4d.jpg`
fn with_unique_suffix(name: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    let suffix = simple.get(..8).unwrap_or(&simple);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{suffix}.{ext}"),
        _ => format!("{name}-{suffix}"),
    }
}
