// src/batch.rs - Directory driver: one count record per decodable image

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::count::CountRecord;
use crate::errors::{FruitCountError, Result};
use crate::image_io::{get_image_files_in_dir, load_image, save_mask};
use crate::pipeline::{process_image, Detector, ImageAnalysis};

/// Results keyed by file name; iteration order is sorted file name order
pub type BatchResults = BTreeMap<String, CountRecord>;

/// An image that could not be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: BatchResults,
    pub skipped: Vec<SkippedImage>,
}

/// Options that affect how a batch runs but not what it counts
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub parallel: bool,
    /// Save every cleaned mask here when set
    pub debug_dir: Option<PathBuf>,
}

/// Process one file. Per-image failures come back as `Ok(Err(skipped))`;
/// only batch-level failures are returned as `Err`.
fn process_path(
    path: &Path,
    detector: &Detector,
    options: &BatchOptions,
) -> Result<std::result::Result<(String, CountRecord), SkippedImage>> {
    let analysis = load_image(path).and_then(|input| {
        process_image(&input, detector).map(|analysis| (input.filename, analysis))
    });

    match analysis {
        Ok((filename, analysis)) => {
            if let Some(debug_dir) = &options.debug_dir {
                save_debug_masks(debug_dir, &filename, &analysis)?;
            }
            info!(file = %filename, counts = ?analysis.record, "image processed");
            Ok(Ok((filename, analysis.record)))
        }
        Err(e) if e.is_per_image() => {
            warn!(path = %path.display(), error = %e, "skipping image");
            Ok(Err(SkippedImage {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }))
        }
        Err(e) => Err(e),
    }
}

fn save_debug_masks(debug_dir: &Path, filename: &str, analysis: &ImageAnalysis) -> Result<()> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);

    for class in &analysis.classes {
        let path = debug_dir.join(format!("{}_{}_mask.png", stem, class.label));
        save_mask(class.mask.as_image(), path)?;
    }

    Ok(())
}

/// Keep the first path for each file name. Later paths with the same name
/// would overwrite its result, so they are reported as skipped instead.
fn unique_file_names(paths: &[PathBuf]) -> (Vec<&PathBuf>, Vec<SkippedImage>) {
    let mut first_seen: HashMap<&str, &PathBuf> = HashMap::new();
    let mut unique = Vec::with_capacity(paths.len());
    let mut duplicates = Vec::new();

    for path in paths {
        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            unique.push(path);
            continue;
        };
        match first_seen.get(name) {
            Some(kept) => {
                warn!(path = %path.display(), kept = %kept.display(), "duplicate file name");
                duplicates.push(SkippedImage {
                    path: path.clone(),
                    reason: format!("duplicate file name {}, already provided by {}", name, kept.display()),
                });
            }
            None => {
                first_seen.insert(name, path);
                unique.push(path);
            }
        }
    }

    (unique, duplicates)
}

/// Run the detector over an explicit list of files.
///
/// Corrupt or undecodable files are skipped and reported; they never abort the
/// batch. Results land in a shared sorted map, one insert per finished image.
pub fn run_batch_on_files(paths: &[PathBuf], detector: &Detector, options: &BatchOptions) -> Result<BatchReport> {
    if let Some(debug_dir) = &options.debug_dir {
        fs::create_dir_all(debug_dir).map_err(FruitCountError::Io)?;
    }

    let (paths, duplicates) = unique_file_names(paths);
    let results = Mutex::new(BatchResults::new());
    let skipped = Mutex::new(duplicates);

    let handle = |path: &&PathBuf| -> Result<()> {
        match process_path(path, detector, options)? {
            Ok((filename, record)) => {
                results
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .insert(filename, record);
            }
            Err(skip) => {
                skipped
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(skip);
            }
        }
        Ok(())
    };

    if options.parallel {
        paths.par_iter().try_for_each(handle)?;
    } else {
        paths.iter().try_for_each(handle)?;
    }

    let mut skipped = skipped.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    skipped.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(BatchReport {
        results: results.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
        skipped,
    })
}

/// Run the detector over every matching image directly inside `dir`
pub fn run_batch<P: AsRef<Path>>(
    dir: P,
    extensions: &[String],
    detector: &Detector,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let dir = dir.as_ref();
    let files = get_image_files_in_dir(dir, extensions)?;
    info!(dir = %dir.display(), count = files.len(), "found images");

    let report = run_batch_on_files(&files, detector, options)?;
    info!(
        processed = report.results.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );

    Ok(report)
}
