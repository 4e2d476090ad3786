use image::{imageops, ImageBuffer, Rgb, RgbImage};

/// Hue is stored halved so the full circle fits in a byte: 0..=179
pub const HUE_PERIOD: u16 = 180;

/// An image whose three channels hold [H, S, V] instead of [R, G, B]
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Canonical working resolutions, chosen by the input's orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectBucket {
    Wide,
    Tall,
    Square,
}

impl AspectBucket {
    pub fn classify(width: u32, height: u32) -> Self {
        if height < width {
            AspectBucket::Wide
        } else if height > width {
            AspectBucket::Tall
        } else {
            AspectBucket::Square
        }
    }

    /// (width, height) of the bucket
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectBucket::Wide => (1280, 720),
            AspectBucket::Tall => (720, 1280),
            AspectBucket::Square => (1280, 1280),
        }
    }
}

/// Resize an image to the specified dimensions.
///
/// Shrinking averages every source pixel into its target cell; enlarging
/// falls back to bilinear interpolation.
pub fn resize_image(image: &RgbImage, dimensions: (u32, u32)) -> RgbImage {
    let (width, height) = dimensions;
    let (src_width, src_height) = image.dimensions();

    if (src_width, src_height) == (width, height) {
        return image.clone();
    }

    if width <= src_width && height <= src_height {
        imageops::thumbnail(image, width, height)
    } else {
        imageops::resize(image, width, height, imageops::FilterType::Triangle)
    }
}

/// Gaussian sigma for a square kernel of the given size, matching the
/// conventional automatic choice for a fixed-size kernel
pub fn sigma_for_kernel_size(kernel_size: u32) -> f32 {
    0.3 * ((kernel_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights of length `kernel_size`
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let sigma = sigma_for_kernel_size(kernel_size);
    let center = (kernel_size / 2) as f32;
    let weights: Vec<f32> = (0..kernel_size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Mirror an out-of-range index back into 0..len without repeating the edge pixel
#[inline]
fn reflect_101(index: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let i = index.rem_euclid(period);
    (if i < len { i } else { period - i }) as usize
}

/// Blur with a `kernel_size` x `kernel_size` Gaussian.
///
/// The kernel is applied as a horizontal then a vertical pass in floating
/// point and rounded once at the end, so a uniform image comes back unchanged.
/// Sizes below 3 leave the image untouched.
pub fn gaussian_blur(image: &RgbImage, kernel_size: u32) -> RgbImage {
    if kernel_size < 3 {
        return image.clone();
    }

    let kernel = gaussian_kernel(kernel_size);
    let radius = (kernel_size / 2) as i64;
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);

    let mut horizontal = vec![[0f32; 3]; w * h];
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x as i64 + k as i64 - radius, w as i64);
                let p = image.get_pixel(sx as u32, y as u32);
                for c in 0..3 {
                    acc[c] += weight * p[c] as f32;
                }
            }
            horizontal[y * w + x] = acc;
        }
    }

    let mut result = RgbImage::new(width, height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = reflect_101(y as i64 + k as i64 - radius, h as i64);
                let p = horizontal[sy * w + x];
                for c in 0..3 {
                    acc[c] += weight * p[c];
                }
            }
            result.put_pixel(x as u32, y as u32, Rgb(acc.map(|v| v.round().clamp(0.0, 255.0) as u8)));
        }
    }

    result
}

/// Convert one RGB pixel to 8-bit HSV.
///
/// V = max(R, G, B), S = 255 * (max - min) / max, H = hue in degrees / 2.
/// Gray pixels get H = 0 and S = 0.
#[inline]
pub fn rgb_to_hsv(pixel: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = pixel.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let saturation = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let hue_degrees = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    let hue_degrees = if hue_degrees < 0.0 { hue_degrees + 360.0 } else { hue_degrees };

    // Rounding 359.x degrees lands on 180, which is the same hue as 0
    let hue = ((hue_degrees / 2.0).round() as u16) % HUE_PERIOD;

    [hue as u8, saturation.round() as u8, max as u8]
}

/// Convert a whole RGB image to HSV
pub fn convert_to_hsv(image: &RgbImage) -> HsvImage {
    let (width, height) = image.dimensions();
    let mut hsv = HsvImage::new(width, height);

    for (src, dst) in image.pixels().zip(hsv.pixels_mut()) {
        *dst = Rgb(rgb_to_hsv(src.0));
    }

    hsv
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn buckets_follow_orientation() {
        assert_eq!(AspectBucket::classify(4000, 3000), AspectBucket::Wide);
        assert_eq!(AspectBucket::classify(3000, 4000), AspectBucket::Tall);
        assert_eq!(AspectBucket::classify(500, 500), AspectBucket::Square);
        assert_eq!(AspectBucket::Tall.dimensions(), (720, 1280));
    }

    #[test]
    fn primary_colors_convert_to_expected_hsv() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [60, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [120, 255, 255]);
        assert_eq!(rgb_to_hsv([255, 255, 0]), [30, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
    }

    #[test]
    fn hue_wraps_instead_of_reaching_period() {
        // 359.5 degrees rounds up to the top of the circle
        let hsv = rgb_to_hsv([255, 0, 2]);
        assert!(hsv[0] < HUE_PERIOD as u8);
        assert!(hsv[0] == 0 || hsv[0] == 179);
    }

    #[test]
    fn blur_sigma_for_five_by_five() {
        assert_approx_eq!(sigma_for_kernel_size(5), 1.1, 1e-6);
    }

    #[test]
    fn blur_keeps_uniform_image_uniform() {
        let img = RgbImage::from_pixel(16, 16, Rgb([10, 200, 30]));
        let blurred = gaussian_blur(&img, 5);
        assert!(blurred.pixels().all(|p| *p == Rgb([10, 200, 30])));

        let wide = RgbImage::from_pixel(1280, 720, Rgb([30, 200, 30]));
        assert_eq!(gaussian_blur(&wide, 5), wide);
    }

    #[test]
    fn blur_kernel_is_normalized_and_symmetric() {
        let kernel = gaussian_kernel(5);
        assert_eq!(kernel.len(), 5);
        assert_approx_eq!(kernel.iter().sum::<f32>(), 1.0, 1e-6);
        assert_approx_eq!(kernel[0], kernel[4], 1e-7);
        assert!(kernel[2] > kernel[1]);
    }

    #[test]
    fn blur_softens_a_step_edge_without_overshoot() {
        let mut img = RgbImage::new(20, 5);
        for y in 0..5 {
            for x in 10..20 {
                img.put_pixel(x, y, Rgb([200, 200, 200]));
            }
        }
        let blurred = gaussian_blur(&img, 5);
        assert_eq!(blurred.get_pixel(0, 2)[0], 0);
        assert_eq!(blurred.get_pixel(19, 2)[0], 200);
        let left = blurred.get_pixel(9, 2)[0];
        let right = blurred.get_pixel(10, 2)[0];
        assert!(left > 0 && left < 100);
        assert!(right > 100 && right < 200);
    }

    #[test]
    fn shrink_and_enlarge_hit_target_size() {
        let img = RgbImage::from_pixel(300, 200, Rgb([1, 2, 3]));
        assert_eq!(resize_image(&img, (150, 100)).dimensions(), (150, 100));
        assert_eq!(resize_image(&img, (1280, 720)).dimensions(), (1280, 720));
    }
}
