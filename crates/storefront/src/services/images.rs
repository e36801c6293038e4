//! Product and order image files.
//!
//! Product images are either absolute `http(s)` URLs or local paths of the
//! form `/uploads/<file>`, served from the upload directory. When an order is
//! placed, local images are copied into the order-image directory so the
//! order keeps its picture after the product (and its file) is deleted.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::MediaConfig;

/// URL prefix for product images.
pub const UPLOADS_PREFIX: &str = "/uploads/";

/// URL prefix for order image snapshots.
pub const ORDER_UPLOADS_PREFIX: &str = "/order_uploads/";

/// Filesystem access for product and order images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    upload_dir: PathBuf,
    order_upload_dir: PathBuf,
    base_url: String,
}

impl ImageStore {
    /// Create an image store.
    ///
    /// `base_url` is the public server URL without a trailing slash.
    #[must_use]
    pub fn new(media: &MediaConfig, base_url: &str) -> Self {
        Self {
            upload_dir: media.upload_dir.clone(),
            order_upload_dir: media.order_upload_dir.clone(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    #[must_use]
    pub fn order_upload_dir(&self) -> &Path {
        &self.order_upload_dir
    }

    /// Create both image directories if missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if a directory cannot be created.
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::create_dir_all(&self.order_upload_dir).await
    }

    /// Produce the image reference to store on an order line item.
    ///
    /// Remote URLs are kept as they are. A local image is copied into the
    /// order-image directory (unless already there) and referenced by its
    /// absolute order-image URL. Copy failures are logged and the URL is
    /// still returned.
    pub async fn snapshot(&self, image: Option<&str>) -> Option<String> {
        let image = image?.trim();
        if image.is_empty() {
            return None;
        }

        if is_remote(image) {
            return Some(image.to_owned());
        }

        let Some(file_name) = file_name_of(image) else {
            warn!(image, "product image has no file name, dropping from order");
            return None;
        };

        let source = self.upload_dir.join(file_name);
        let dest = self.order_upload_dir.join(file_name);

        if let Err(error) = copy_if_absent(&source, &dest).await {
            warn!(
                source = %source.display(),
                dest = %dest.display(),
                %error,
                "failed to snapshot product image"
            );
        }

        Some(format!("{}{ORDER_UPLOADS_PREFIX}{file_name}", self.base_url))
    }

    /// Best-effort removal of a product's local image file.
    ///
    /// Only `/uploads/<file>` references are touched. Failures are logged.
    pub async fn remove_product_image(&self, image: Option<&str>) {
        let Some(file_name) = image
            .and_then(|i| i.trim().strip_prefix(UPLOADS_PREFIX))
            .and_then(file_name_of)
        else {
            return;
        };

        let path = self.upload_dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => debug!(path = %path.display(), "removed product image"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to remove product image");
            }
        }
    }
}

fn is_remote(image: &str) -> bool {
    image.starts_with("http://") || image.starts_with("https://")
}

/// Final path component, which also strips any directory traversal.
fn file_name_of(image: &str) -> Option<&str> {
    Path::new(image).file_name().and_then(|name| name.to_str())
}

async fn copy_if_absent(source: &Path, dest: &Path) -> io::Result<()> {
    if tokio::fs::try_exists(dest).await? {
        return Ok(());
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(source, dest).await?;
    Ok(())
}
