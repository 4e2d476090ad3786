// src/morphology.rs - Speckle removal and gap closing on binary masks

use crate::config::Config;
use crate::errors::{FruitCountError, Result};
use crate::segmentation::Mask;

/// Square structuring element with odd side length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuringElement {
    size: u32,
}

impl StructuringElement {
    pub fn square(size: u32) -> Result<Self> {
        if size == 0 || size % 2 == 0 {
            return Err(FruitCountError::Config(format!(
                "structuring element size must be odd and > 0, got {}",
                size
            )));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Distance from the anchor to the element's edge
    pub fn radius(&self) -> usize {
        (self.size / 2) as usize
    }
}

/// Parameters of the erode / open / close sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningParams {
    pub element: StructuringElement,
    pub erosion_iterations: u32,
}

impl CleaningParams {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            element: StructuringElement::square(config.structuring_element_size)?,
            erosion_iterations: config.erosion_iterations,
        })
    }
}

#[derive(Clone, Copy)]
enum Operation {
    Erode,
    Dilate,
}

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// One 1-D pass of a square morphological operation.
///
/// A square element is separable, so the full operation is a horizontal pass
/// followed by a vertical one. Each output uses a running foreground count over
/// the window, clipped at the image border: out-of-bounds pixels neither erode
/// nor dilate.
fn sweep(mask: &Mask, radius: usize, op: Operation, axis: Axis) -> Mask {
    let (width, height) = mask.dimensions();
    let (lines, len) = match axis {
        Axis::Horizontal => (height, width as usize),
        Axis::Vertical => (width, height as usize),
    };

    let coords = |line: u32, i: usize| -> (u32, u32) {
        match axis {
            Axis::Horizontal => (i as u32, line),
            Axis::Vertical => (line, i as u32),
        }
    };

    let mut result = Mask::new(width, height);
    let mut prefix = vec![0usize; len + 1];

    for line in 0..lines {
        for i in 0..len {
            let (x, y) = coords(line, i);
            prefix[i + 1] = prefix[i] + mask.is_foreground(x, y) as usize;
        }

        for i in 0..len {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(len - 1);
            let count = prefix[hi + 1] - prefix[lo];

            let keep = match op {
                Operation::Erode => count == hi - lo + 1,
                Operation::Dilate => count > 0,
            };

            if keep {
                let (x, y) = coords(line, i);
                result.set(x, y, true);
            }
        }
    }

    result
}

/// Applies morphological erosion: a pixel survives only if the whole element fits
pub fn erode(mask: &Mask, element: StructuringElement) -> Mask {
    let r = element.radius();
    let horizontal = sweep(mask, r, Operation::Erode, Axis::Horizontal);
    sweep(&horizontal, r, Operation::Erode, Axis::Vertical)
}

/// Applies morphological dilation: a pixel is set if the element touches foreground
pub fn dilate(mask: &Mask, element: StructuringElement) -> Mask {
    let r = element.radius();
    let horizontal = sweep(mask, r, Operation::Dilate, Axis::Horizontal);
    sweep(&horizontal, r, Operation::Dilate, Axis::Vertical)
}

/// Apply morphological opening (erosion followed by dilation)
pub fn open(mask: &Mask, element: StructuringElement) -> Mask {
    dilate(&erode(mask, element), element)
}

/// Apply morphological closing (dilation followed by erosion)
pub fn close(mask: &Mask, element: StructuringElement) -> Mask {
    erode(&dilate(mask, element), element)
}

/// Erode, open, then close. The input mask is left untouched.
pub fn clean(mask: &Mask, params: &CleaningParams) -> Mask {
    let mut current = mask.clone();
    for _ in 0..params.erosion_iterations {
        current = erode(&current, params.element);
    }
    let opened = open(&current, params.element);
    close(&opened, params.element)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
    }

    fn element(size: u32) -> StructuringElement {
        StructuringElement::square(size).unwrap()
    }

    /// Direct kernel scan used as a reference for the separable passes
    fn naive(mask: &Mask, size: u32, erode: bool) -> Mask {
        let (width, height) = mask.dimensions();
        let r = (size / 2) as i32;
        let mut result = Mask::new(width, height);

        for y in 0..height {
            for x in 0..width {
                let mut all = true;
                let mut any = false;
                for ky in -r..=r {
                    for kx in -r..=r {
                        let nx = x as i32 + kx;
                        let ny = y as i32 + ky;
                        if in_bounds(nx, ny, width, height) {
                            let fg = mask.is_foreground(nx as u32, ny as u32);
                            all &= fg;
                            any |= fg;
                        }
                    }
                }
                result.set(x, y, if erode { all } else { any });
            }
        }
        result
    }

    fn scattered_mask() -> Mask {
        let mut mask = Mask::new(40, 30);
        mask.fill_rect(3, 3, 12, 9);
        mask.fill_rect(20, 5, 3, 3);
        mask.fill_rect(0, 20, 40, 6);
        mask.set(30, 15, true);
        mask.set(16, 26, true);
        mask
    }

    #[test]
    fn separable_passes_match_direct_scan() {
        let mask = scattered_mask();
        for size in [1, 3, 5, 7] {
            assert_eq!(erode(&mask, element(size)), naive(&mask, size, true));
            assert_eq!(dilate(&mask, element(size)), naive(&mask, size, false));
        }
    }

    #[test]
    fn rejects_even_or_zero_element() {
        assert!(StructuringElement::square(0).is_err());
        assert!(StructuringElement::square(4).is_err());
        assert_eq!(element(7).radius(), 3);
    }

    #[test]
    fn erosion_removes_isolated_specks() {
        let mut mask = Mask::new(20, 20);
        mask.set(5, 5, true);
        mask.fill_rect(10, 10, 2, 2);
        assert!(erode(&mask, element(3)).is_empty());
    }

    #[test]
    fn border_does_not_erode_foreground() {
        let mut mask = Mask::new(10, 10);
        mask.fill_rect(0, 0, 10, 10);
        assert_eq!(erode(&mask, element(7)).foreground_count(), 100);
    }

    #[test]
    fn closing_fills_small_hole() {
        let mut mask = Mask::new(30, 30);
        mask.fill_rect(5, 5, 20, 20);
        mask.set(15, 15, false);
        let closed = close(&mask, element(3));
        assert!(closed.is_foreground(15, 15));
    }

    #[test]
    fn opening_drops_blobs_smaller_than_element() {
        let mut mask = Mask::new(40, 40);
        mask.fill_rect(2, 2, 4, 4);
        mask.fill_rect(15, 15, 15, 15);
        let opened = open(&mask, element(7));
        assert!(!opened.is_foreground(3, 3));
        assert!(opened.is_foreground(20, 20));
        assert_eq!(opened.foreground_count(), 15 * 15);
    }

    #[test]
    fn clean_leaves_input_untouched() {
        let mask = scattered_mask();
        let before = mask.clone();
        let params = CleaningParams { element: element(3), erosion_iterations: 1 };
        let cleaned = clean(&mask, &params);
        assert_eq!(mask, before);
        assert_ne!(cleaned, mask);
    }
}
