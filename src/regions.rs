// src/regions.rs - Connected regions with explicit nesting, and the count policy

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use crate::segmentation::Mask;

/// Which side of the foreground a border runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    /// Outside edge of a foreground component
    Outer,
    /// Edge of a hole inside a foreground component
    Hole,
}

/// Position of a region in the border hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    TopLevel,
    /// Enclosed by the region at `parent` in the same extraction result
    Nested { parent: usize },
}

/// A traced border of a connected foreground component
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Boundary polygon in pixel coordinates
    pub boundary: Vec<(i32, i32)>,
    pub border: BorderKind,
    pub nesting: Nesting,
    /// Area enclosed by the boundary polygon
    pub area: f64,
}

impl Region {
    pub fn is_top_level(&self) -> bool {
        self.nesting == Nesting::TopLevel
    }

    /// A region counts as an object when it is not nested inside another
    /// region and encloses at least `min_area` square pixels.
    pub fn is_countable(&self, min_area: f64) -> bool {
        self.is_top_level() && self.area >= min_area
    }
}

/// Shoelace area of a closed polygon
pub fn polygon_area(points: &[(i32, i32)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let twice_area: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&(x0, y0), &(x1, y1))| x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64)
        .sum();

    (twice_area as f64).abs() / 2.0
}

/// Trace every border in the mask, keeping the parent/child hierarchy.
///
/// A ring-shaped component yields two regions: its outer border (top level)
/// and its hole border (nested under the outer one).
pub fn extract_regions(mask: &Mask) -> Vec<Region> {
    // Border following misreads foreground on the frame edge, so trace a copy
    // with one background pixel all round and shift the points back.
    find_contours::<i32>(&pad_with_background(mask.as_image()))
        .into_iter()
        .map(|contour| {
            let boundary: Vec<(i32, i32)> = contour.points.iter().map(|p| (p.x - 1, p.y - 1)).collect();
            let area = polygon_area(&boundary);
            Region {
                boundary,
                border: match contour.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                },
                nesting: match contour.parent {
                    Some(parent) => Nesting::Nested { parent },
                    None => Nesting::TopLevel,
                },
                area,
            }
        })
        .collect()
}

fn pad_with_background(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    image::imageops::replace(&mut padded, image, 1, 1);
    padded
}

/// Regions that count as distinct objects; empty when none qualify
pub fn extract(mask: &Mask, min_area: f64) -> Vec<Region> {
    extract_regions(mask)
        .into_iter()
        .filter(|region| region.is_countable(min_area))
        .collect()
}

/// Number of countable regions in the mask
pub fn count_objects(mask: &Mask, min_area: f64) -> usize {
    extract(mask, min_area).len()
}
