use std::path::{Path, PathBuf};
use std::fs;
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};

use crate::errors::{FruitCountError, Result};

/// A decoded 8-bit RGB photograph with its metadata
#[derive(Debug)]
pub struct InputImage {
    pub image: RgbImage,
    pub path: PathBuf,
    /// File name including extension; used as the output key
    pub filename: String,
}

impl InputImage {
    /// Wrap an in-memory image, rejecting zero-area rasters
    pub fn from_dynamic(image: DynamicImage, path: PathBuf) -> Result<Self> {
        let filename = file_name_of(&path)?;

        if image.width() == 0 || image.height() == 0 {
            return Err(FruitCountError::decode(path, "image has zero width or height"));
        }

        // Grayscale and alpha inputs are widened/flattened to RGB
        Ok(InputImage {
            image: image.to_rgb8(),
            path,
            filename,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| FruitCountError::InvalidPath(path.to_path_buf()))
}

/// Get all image files directly inside a directory, sorted by file name.
///
/// Subdirectories are not searched. Extensions are compared case-insensitively.
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(FruitCountError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(FruitCountError::Config(format!(
            "{} is not a directory", dir_path.display()
        )));
    }

    let mut image_files = Vec::new();
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();
        if path.is_file() && has_image_extension(&path, extensions) {
            image_files.push(path);
        }
    }

    image_files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(image_files)
}

fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Load an image from disk as RGB.
///
/// Unreadable, corrupt or zero-area files all yield `FruitCountError::Decode`.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let bytes = fs::read(path)
        .map_err(|e| FruitCountError::decode(path, e.to_string()))?;

    decode_image(&bytes, path)
}

/// Decode an encoded image held in memory; the format is guessed from its contents
pub fn decode_image<P: AsRef<Path>>(bytes: &[u8], path: P) -> Result<InputImage> {
    let path = path.as_ref();

    let img = image::load_from_memory(bytes)
        .map_err(|e| FruitCountError::decode(path, e.to_string()))?;

    InputImage::from_dynamic(img, path.to_path_buf())
}

/// Save a binary mask as PNG
pub fn save_mask<P: AsRef<Path>>(mask: &GrayImage, path: P) -> Result<()> {
    mask.save_with_format(path, ImageFormat::Png)
        .map_err(FruitCountError::Image)?;

    Ok(())
}
