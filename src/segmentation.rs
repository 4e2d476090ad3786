// src/segmentation.rs - Binary masks from HSV ranges

use image::{GrayImage, Luma};

use crate::config::ColorClassSpec;
use crate::normalize::NormalizedImage;

/// Value written for foreground pixels
pub const FOREGROUND: u8 = 255;
/// Value written for background pixels
pub const BACKGROUND: u8 = 0;

/// A binary foreground/background raster. Any non-zero pixel is foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pixels: GrayImage,
}

impl Mask {
    /// All-background mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: GrayImage::new(width, height),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    #[inline]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.pixels.get_pixel(x, y)[0] != BACKGROUND
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        let value = if foreground { FOREGROUND } else { BACKGROUND };
        self.pixels.put_pixel(x, y, Luma([value]));
    }

    /// Mark an axis-aligned rectangle as foreground, clipped to the mask
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
        let (mask_width, mask_height) = self.dimensions();
        for yy in y..(y + height).min(mask_height) {
            for xx in x..(x + width).min(mask_width) {
                self.set(xx, yy, true);
            }
        }
    }

    pub fn foreground_count(&self) -> usize {
        self.pixels.pixels().filter(|p| p[0] != BACKGROUND).count()
    }

    pub fn is_empty(&self) -> bool {
        self.foreground_count() == 0
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.pixels
    }
}

/// Mask of every pixel inside any of the class's ranges (bounds inclusive)
pub fn segment(image: &NormalizedImage, spec: &ColorClassSpec) -> Mask {
    let (width, height) = image.dimensions();
    let mut mask = Mask::new(width, height);

    for (x, y, pixel) in image.as_hsv().enumerate_pixels() {
        if spec.matches(pixel.0) {
            mask.set(x, y, true);
        }
    }

    mask
}
