use crate::core::Image;
use crate::imgproc::separable_filter;

/// Kernel size for a given sigma. Always odd, at least 3, and wide enough
/// that the truncated tails stay negligible.
fn kernel_size(sigma: f32) -> usize {
    let size = (2.0 * (1.0 + (sigma - 0.8) / 0.3)).ceil().max(3.0) as usize;
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Create a normalized 1-D Gaussian kernel of odd length.
#[must_use]
pub fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let size = kernel_size(sigma);
    let half = (size / 2) as i64;

    let mut kernel = Vec::with_capacity(size);
    let mut sum = 0.0f32;
    for i in -half..=half {
        let x = i as f32;
        let value = (-x * x / (2.0 * sigma * sigma)).exp();
        kernel.push(value);
        sum += value;
    }
    for value in &mut kernel {
        *value /= sum;
    }

    kernel
}

/// Separable Gaussian blur with replicated borders.
pub fn gaussian_blur(src: &Image, dst: &mut Image, sigma: f32) {
    let kernel = gaussian_kernel(sigma);
    separable_filter(src, dst, &kernel, &kernel);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized_and_odd() {
        for &sigma in &[0.5f32, 1.0, 1.6, 3.2, 8.0] {
            let kernel = gaussian_kernel(sigma);
            assert_eq!(kernel.len() % 2, 1, "kernel length must be odd");

            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-5, "kernel sum was {sum}");
        }
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let kernel = gaussian_kernel(2.0);
        let n = kernel.len();
        for i in 0..n / 2 {
            assert!((kernel[i] - kernel[n - 1 - i]).abs() < 1e-7);
        }
    }

    #[test]
    fn test_blur_preserves_constant_image() {
        let mut src = Image::new(16, 16);
        src.fill(0.25);

        let mut dst = Image::new(16, 16);
        gaussian_blur(&src, &mut dst, 1.6);

        for &v in dst.data() {
            assert!((v - 0.25).abs() < 1e-5, "constant image changed: {v}");
        }
    }

    #[test]
    fn test_blur_flattens_pulse() {
        let mut src = Image::new(17, 17);
        src.set(8, 8, 1.0);

        let mut dst = Image::new(17, 17);
        gaussian_blur(&src, &mut dst, 2.0);

        let peak = dst.get(8, 8);
        assert!(peak < 1.0, "pulse should spread, peak = {peak}");
        assert!(peak > dst.get(0, 0), "center should still dominate");
        assert!(dst.get(7, 8) > 0.0, "neighbors should receive mass");
    }
}
