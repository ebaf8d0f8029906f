// SPDX-FileCopyrightText: 2020 Robin Krahl <robin.krahl@ireas.org>
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Decorative images and logos.
//!
//! Assets are best-effort: an [`AssetProvider`][] returns an [`AssetError`][] if an image cannot be
//! loaded, and the report builder records the error as a warning instead of failing the report.
//!
//! [`AssetProvider`]: trait.AssetProvider.html
//! [`AssetError`]: ../error/struct.AssetError.html

use std::path;

use crate::error::AssetError;
use crate::surface::Surface;
use crate::LayoutBox;

/// A source of decorative images.
pub trait AssetProvider {
    /// Loads the image with the given name.
    fn load(&self, name: &str) -> Result<image::DynamicImage, AssetError>;
}

/// An asset provider without any assets.
///
/// Every lookup fails, so reports drawn with this provider contain no images.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

impl AssetProvider for NoAssets {
    fn load(&self, name: &str) -> Result<image::DynamicImage, AssetError> {
        Err(AssetError::new(name, "no asset source configured"))
    }
}

/// An asset provider that reads images from a directory.
#[derive(Clone, Debug)]
pub struct DirAssetProvider {
    dir: path::PathBuf,
}

impl DirAssetProvider {
    /// Creates a new provider that loads images from the given directory.
    pub fn new(dir: impl Into<path::PathBuf>) -> DirAssetProvider {
        DirAssetProvider { dir: dir.into() }
    }
}

impl AssetProvider for DirAssetProvider {
    fn load(&self, name: &str) -> Result<image::DynamicImage, AssetError> {
        let path = self.dir.join(name);
        let image =
            image::open(&path).map_err(|err| AssetError::new(path.display().to_string(), err))?;
        log::debug!("Loaded asset {}", path.display());
        Ok(image)
    }
}

/// Returns the largest box with the aspect ratio of a `width` x `height` image that fits into the
/// given box, centered in it.
///
/// Returns `None` for images without pixels.
pub fn fit_into(width: u32, height: u32, rect: LayoutBox) -> Option<LayoutBox> {
    if width == 0 || height == 0 {
        return None;
    }
    let ratio = f64::from(width) / f64::from(height);
    let (mut target_width, mut target_height) = (rect.width, rect.width / ratio);
    if target_height > rect.height {
        target_height = rect.height;
        target_width = rect.height * ratio;
    }
    Some(LayoutBox::new(
        rect.x + (rect.width - target_width) / 2.0,
        rect.y + (rect.height - target_height) / 2.0,
        target_width,
        target_height,
    ))
}

/// Draws the given image into the given box, keeping its aspect ratio.
///
/// Images without pixels are skipped.
pub fn draw_image_fitted<S: Surface + ?Sized>(
    surface: &mut S,
    image: &image::DynamicImage,
    rect: LayoutBox,
) {
    use image::GenericImageView as _;

    let (width, height) = image.dimensions();
    if let Some(target) = fit_into(width, height, rect) {
        surface.draw_image(target, image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawOp, RecordingSurface};
    use crate::{Mm, PaperSize};

    #[test]
    fn images_keep_their_aspect_ratio() {
        let mut surface = RecordingSurface::new();
        surface.add_page(PaperSize::A4.into());
        let image = image::DynamicImage::new_rgb8(40, 20);
        draw_image_fitted(&mut surface, &image, LayoutBox::new(10, 10, 20, 20));
        match &surface.page(1).unwrap().ops[0] {
            DrawOp::Image { rect: target, .. } => {
                assert_eq!(target.width, Mm::from(20));
                assert_eq!(target.height, Mm::from(10));
                assert_eq!(target.y, Mm::from(15));
            }
            op => panic!("Unexpected draw call {:?}", op),
        }
        assert_eq!(fit_into(0, 10, LayoutBox::new(0, 0, 10, 10)), None);
    }

    #[test]
    fn missing_assets_are_reported() {
        let provider = DirAssetProvider::new("/nonexistent");
        let err = provider.load("logo.png").unwrap_err();
        assert!(err.asset().ends_with("logo.png"));
        assert!(NoAssets.load("logo.png").is_err());
    }
}
