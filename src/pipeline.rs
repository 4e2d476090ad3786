// src/pipeline.rs - Single-image detection: normalize, segment, clean, extract, aggregate

use image::RgbImage;
use rayon::prelude::*;
use tracing::debug;

use crate::config::{ColorClassSpec, Config};
use crate::count::{aggregate, CountRecord};
use crate::errors::Result;
use crate::image_io::InputImage;
use crate::image_utils::AspectBucket;
use crate::morphology::{clean, CleaningParams};
use crate::normalize::{normalize, NormalizedImage};
use crate::regions::{extract, Region};
use crate::segmentation::{segment, Mask};

/// Everything one color class produced for one image
#[derive(Debug, Clone)]
pub struct ClassAnalysis {
    pub label: String,
    /// Mask after morphological cleaning
    pub mask: Mask,
    /// Regions that were counted as objects
    pub regions: Vec<Region>,
}

impl ClassAnalysis {
    pub fn count(&self) -> usize {
        self.regions.len()
    }
}

/// Full result of running the pipeline on one image
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    pub bucket: AspectBucket,
    pub classes: Vec<ClassAnalysis>,
    pub record: CountRecord,
}

/// The per-image pipeline with a validated, read-only configuration
#[derive(Debug, Clone)]
pub struct Detector {
    classes: Vec<ColorClassSpec>,
    cleaning: CleaningParams,
    blur_kernel_size: u32,
    min_region_area: f64,
    parallel_classes: bool,
}

impl Detector {
    /// Validates the configuration; a bad configuration never reaches an image
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            classes: config.color_classes.clone(),
            cleaning: CleaningParams::from_config(config)?,
            blur_kernel_size: config.blur_kernel_size,
            min_region_area: config.min_region_area,
            parallel_classes: config.use_parallel,
        })
    }

    pub fn classes(&self) -> &[ColorClassSpec] {
        &self.classes
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|spec| spec.label.as_str())
    }

    pub fn normalize(&self, raw: &RgbImage) -> Result<NormalizedImage> {
        normalize(raw, self.blur_kernel_size)
    }

    /// Segment, clean and extract regions for a single class
    pub fn analyze_class(&self, image: &NormalizedImage, spec: &ColorClassSpec) -> ClassAnalysis {
        let raw_mask = segment(image, spec);
        let mask = clean(&raw_mask, &self.cleaning);
        let regions = extract(&mask, self.min_region_area);

        debug!(
            label = %spec.label,
            segmented = raw_mask.foreground_count(),
            cleaned = mask.foreground_count(),
            objects = regions.len(),
            "class analyzed"
        );

        ClassAnalysis {
            label: spec.label.clone(),
            mask,
            regions,
        }
    }

    /// Run every class over a shared normalized image and merge the counts.
    ///
    /// Classes fan out over the rayon pool when parallelism is enabled; the
    /// result keeps configuration order either way.
    pub fn analyze_normalized(&self, image: &NormalizedImage) -> ImageAnalysis {
        let classes: Vec<ClassAnalysis> = if self.parallel_classes {
            self.classes
                .par_iter()
                .map(|spec| self.analyze_class(image, spec))
                .collect()
        } else {
            self.classes
                .iter()
                .map(|spec| self.analyze_class(image, spec))
                .collect()
        };

        let record = aggregate(
            self.labels(),
            classes.iter().map(|c| (c.label.as_str(), c.count())),
        );

        ImageAnalysis {
            bucket: image.bucket(),
            classes,
            record,
        }
    }

    /// Full pipeline on a decoded image
    pub fn analyze(&self, raw: &RgbImage) -> Result<ImageAnalysis> {
        let normalized = self.normalize(raw)?;
        Ok(self.analyze_normalized(&normalized))
    }

    /// Counts only
    pub fn detect(&self, raw: &RgbImage) -> Result<CountRecord> {
        Ok(self.analyze(raw)?.record)
    }
}

/// Process a single loaded image
pub fn process_image(input_image: &InputImage, detector: &Detector) -> Result<ImageAnalysis> {
    let (width, height) = input_image.dimensions();
    debug!(file = %input_image.filename, width, height, "processing image");

    detector.analyze(&input_image.image)
}
