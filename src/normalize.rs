// src/normalize.rs - Bring every photo to a canonical size and color space

use image::{Rgb, RgbImage};
use tracing::debug;

use crate::errors::{FruitCountError, Result};
use crate::image_utils::{convert_to_hsv, gaussian_blur, resize_image, AspectBucket, HsvImage};

/// A blurred HSV image at one of the three canonical resolutions
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    hsv: HsvImage,
    bucket: AspectBucket,
}

impl NormalizedImage {
    /// Wrap an HSV raster that is already at a canonical resolution
    pub fn from_hsv(hsv: HsvImage) -> Result<Self> {
        let (width, height) = hsv.dimensions();
        let bucket = AspectBucket::classify(width, height);

        if bucket.dimensions() != (width, height) {
            return Err(FruitCountError::decode(
                "<normalized>",
                format!(
                    "{}x{} is not a canonical resolution (expected {}x{})",
                    width,
                    height,
                    bucket.dimensions().0,
                    bucket.dimensions().1
                ),
            ));
        }

        Ok(Self { hsv, bucket })
    }

    /// Uniform HSV image of the given bucket, handy for building test scenes
    pub fn filled(bucket: AspectBucket, hsv: [u8; 3]) -> Self {
        let (width, height) = bucket.dimensions();
        Self {
            hsv: HsvImage::from_pixel(width, height, Rgb(hsv)),
            bucket,
        }
    }

    pub fn bucket(&self) -> AspectBucket {
        self.bucket
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.hsv.dimensions()
    }

    /// [H, S, V] at (x, y)
    #[inline]
    pub fn hsv_at(&self, x: u32, y: u32) -> [u8; 3] {
        self.hsv.get_pixel(x, y).0
    }

    pub fn as_hsv(&self) -> &HsvImage {
        &self.hsv
    }

    pub fn into_hsv(self) -> HsvImage {
        self.hsv
    }
}

/// Resize to the orientation bucket, blur, then convert to HSV.
///
/// The input is only read; a zero-area raster is a decode failure.
pub fn normalize(raw: &RgbImage, blur_kernel_size: u32) -> Result<NormalizedImage> {
    let (width, height) = raw.dimensions();
    if width == 0 || height == 0 {
        return Err(FruitCountError::decode("<memory>", "image has zero width or height"));
    }

    let bucket = AspectBucket::classify(width, height);
    let target = bucket.dimensions();
    debug!(width, height, ?bucket, "normalizing image");

    let resized = resize_image(raw, target);
    let blurred = gaussian_blur(&resized, blur_kernel_size);

    Ok(NormalizedImage {
        hsv: convert_to_hsv(&blurred),
        bucket,
    })
}
