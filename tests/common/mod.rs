//! Shared helpers for building synthetic scenes.

#![allow(dead_code)]

use std::path::Path;

use fruit_count_lib::image_utils::{AspectBucket, HsvImage};
use fruit_count_lib::NormalizedImage;
use image::{Rgb, RgbImage};

pub const LABELS: [&str; 4] = ["red", "yellow", "green", "purple"];

/// HSV value well inside the default green range
pub const GREEN_HSV: [u8; 3] = [60, 200, 200];

pub const GREEN_RGB: [u8; 3] = [30, 200, 30];
pub const PURPLE_RGB: [u8; 3] = [120, 40, 160];

/// Paint filled squares given as (x, y, side) onto a black RGB canvas
pub fn rgb_scene(width: u32, height: u32, color: [u8; 3], squares: &[(u32, u32, u32)]) -> RgbImage {
    let mut img = RgbImage::new(width, height);
    for &(x0, y0, side) in squares {
        for y in y0..(y0 + side).min(height) {
            for x in x0..(x0 + side).min(width) {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }
    img
}

/// Same as `rgb_scene` but directly in normalized HSV space
pub fn hsv_scene(bucket: AspectBucket, hsv: [u8; 3], squares: &[(u32, u32, u32)]) -> NormalizedImage {
    let mut img: HsvImage = NormalizedImage::filled(bucket, [0, 0, 0]).into_hsv();
    let (width, height) = img.dimensions();
    for &(x0, y0, side) in squares {
        for y in y0..(y0 + side).min(height) {
            for x in x0..(x0 + side).min(width) {
                img.put_pixel(x, y, Rgb(hsv));
            }
        }
    }
    NormalizedImage::from_hsv(img).expect("canonical size")
}

pub fn save_png(img: &RgbImage, path: &Path) {
    img.save(path).expect("write test image");
}
