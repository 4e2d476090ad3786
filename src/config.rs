// src/config.rs - Thresholds and tunables for the counting pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::errors::{FruitCountError, Result};

/// Largest hue value a bound may name (hue itself lives in 0..=179 and wraps)
pub const HUE_BOUND_MAX: u8 = 180;

/// Inclusive per-channel bounds in HSV space, channels ordered [H, S, V]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Inclusive on both ends of every channel
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

/// A named color class, e.g. "red", with one or more HSV ranges.
///
/// Classes whose hue wraps past the top of the hue circle (red) need two
/// ranges; the class mask is the union of all of them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ColorClassSpec {
    pub label: String,
    pub ranges: Vec<HsvRange>,
}

impl ColorClassSpec {
    pub fn new<S: Into<String>>(label: S, ranges: Vec<HsvRange>) -> Self {
        Self {
            label: label.into(),
            ranges,
        }
    }

    #[inline]
    pub fn matches(&self, hsv: [u8; 3]) -> bool {
        self.ranges.iter().any(|range| range.contains(hsv))
    }

    /// Check bounds ordering and channel limits
    pub fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(FruitCountError::Config(
                "color class label must not be empty".to_string(),
            ));
        }

        if self.ranges.is_empty() {
            return Err(FruitCountError::Config(format!(
                "color class '{}' must have at least one range",
                self.label
            )));
        }

        for (idx, range) in self.ranges.iter().enumerate() {
            for (channel, name) in ["hue", "saturation", "value"].iter().enumerate() {
                if range.lower[channel] > range.upper[channel] {
                    return Err(FruitCountError::Config(format!(
                        "color class '{}' range {}: {} lower bound {} exceeds upper bound {}",
                        self.label, idx, name, range.lower[channel], range.upper[channel]
                    )));
                }
            }

            if range.upper[0] > HUE_BOUND_MAX {
                return Err(FruitCountError::Config(format!(
                    "color class '{}' range {}: hue bound {} is outside 0..={}",
                    self.label, idx, range.upper[0], HUE_BOUND_MAX
                )));
            }
        }

        Ok(())
    }
}

/// Configuration for fruit_count
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_input_path")]
    pub input_path: String,

    #[serde(default = "default_output_path")]
    pub output_path: String,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,

    // Normalization
    #[serde(default = "default_blur_kernel_size")]
    pub blur_kernel_size: u32,

    // Morphological cleaning
    #[serde(default = "default_structuring_element_size")]
    pub structuring_element_size: u32,

    #[serde(default = "default_erosion_iterations")]
    pub erosion_iterations: u32,

    // Region filtering
    #[serde(default = "default_min_region_area")]
    pub min_region_area: f64,

    #[serde(default = "default_color_classes")]
    pub color_classes: Vec<ColorClassSpec>,
}

fn default_input_path() -> String {
    "./data".to_string()
}

fn default_output_path() -> String {
    "./results.json".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()]
}

fn default_parallel() -> bool {
    true
}

fn default_blur_kernel_size() -> u32 {
    5
}

fn default_structuring_element_size() -> u32 {
    7 // Sized for the 1280-pixel canonical resolutions
}

fn default_erosion_iterations() -> u32 {
    1
}

fn default_min_region_area() -> f64 {
    150.0 // Polygon area in pixels at canonical resolution
}

/// Calibrated HSV bounds for the four fruit colors
pub fn default_color_classes() -> Vec<ColorClassSpec> {
    vec![
        ColorClassSpec::new(
            "red",
            vec![
                HsvRange::new([175, 0, 68], [180, 255, 255]),
                HsvRange::new([0, 83, 61], [4, 255, 255]),
            ],
        ),
        ColorClassSpec::new("yellow", vec![HsvRange::new([2, 80, 100], [33, 255, 255])]),
        ColorClassSpec::new("green", vec![HsvRange::new([31, 38, 18], [90, 255, 255])]),
        ColorClassSpec::new("purple", vec![HsvRange::new([115, 25, 0], [177, 255, 230])]),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            extensions: default_extensions(),
            use_parallel: default_parallel(),
            blur_kernel_size: default_blur_kernel_size(),
            structuring_element_size: default_structuring_element_size(),
            erosion_iterations: default_erosion_iterations(),
            min_region_area: default_min_region_area(),
            color_classes: default_color_classes(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            FruitCountError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| FruitCountError::ConfigParse {
            source: e,
            path: path.to_path_buf(),
        })?;

        Ok(config)
    }

    /// Labels in configuration order
    pub fn labels(&self) -> Vec<String> {
        self.color_classes.iter().map(|spec| spec.label.clone()).collect()
    }

    /// Validate configuration. Any failure here aborts the run before processing.
    pub fn validate(&self) -> Result<()> {
        if self.color_classes.is_empty() {
            return Err(FruitCountError::Config(
                "at least one color class must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for spec in &self.color_classes {
            spec.validate()?;
            if !seen.insert(spec.label.as_str()) {
                return Err(FruitCountError::Config(format!(
                    "duplicate color class label '{}'",
                    spec.label
                )));
            }
        }

        if self.structuring_element_size == 0 || self.structuring_element_size % 2 == 0 {
            return Err(FruitCountError::Config(
                "structuring_element_size must be an odd number > 0".to_string(),
            ));
        }

        // 0 disables blurring
        if self.blur_kernel_size % 2 == 0 && self.blur_kernel_size != 0 {
            return Err(FruitCountError::Config(
                "blur_kernel_size must be odd, or 0 to disable blurring".to_string(),
            ));
        }

        if !self.min_region_area.is_finite() || self.min_region_area < 0.0 {
            return Err(FruitCountError::Config(
                "min_region_area must be a finite value >= 0.0".to_string(),
            ));
        }

        if self.extensions.is_empty() {
            return Err(FruitCountError::Config(
                "extensions must list at least one file extension".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            FruitCountError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content).map_err(FruitCountError::Io)?;

        Ok(())
    }
}
