// src/lib.rs - Library interface for fruit_count

pub mod batch;
pub mod config;
pub mod count;
pub mod errors;
pub mod image_io;
pub mod image_utils;
pub mod morphology;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod regions;
pub mod segmentation;

// Re-export commonly used types and functions
pub use errors::{FruitCountError, Result};
pub use config::{ColorClassSpec, Config, HsvRange};
pub use count::{aggregate, CountRecord};
pub use image_io::{InputImage, load_image, decode_image};
pub use pipeline::{process_image, Detector, ImageAnalysis};
pub use batch::{run_batch, BatchOptions, BatchReport, BatchResults};
pub use output::{write_results, OutputFormat};

// Re-export the pipeline stages
pub use normalize::{normalize, NormalizedImage};
pub use segmentation::{segment, Mask};
pub use morphology::{clean, CleaningParams, StructuringElement};
pub use regions::{extract, extract_regions, Region, Nesting, BorderKind};
