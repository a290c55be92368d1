//! PNG export of finished rasters

use crate::io::error::{IfsError, Result};
use crate::io::persistence::create_parent;
use image::RgbImage;
use std::path::Path;
use tracing::info;

/// Save a finalized raster as PNG, creating parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be encoded or written to `path`
pub fn export_png(image: &RgbImage, path: &Path) -> Result<()> {
    create_parent(path)?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|source| IfsError::ImageExport {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "exported image"
    );
    Ok(())
}
