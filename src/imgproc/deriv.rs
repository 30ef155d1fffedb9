use crate::core::Image;
use crate::imgproc::separable_filter;

/// Scharr smoothing weight for the derivative kernels.
const SCHARR_W: f32 = 10.0 / 3.0;

/// Build the separable Scharr-family kernels for a first derivative at an
/// integer scale.
///
/// `scale = 1` yields the classic normalized 3x3 Scharr pair
/// (`[-1, 0, 1]` and `[3, 10, 3] / 32`); larger scales spread the taps to
/// `3 + 2 * (scale - 1)` samples so the stencil matches the evolution
/// level's sigma. Exactly one of `order_x`, `order_y` must be 1.
#[must_use]
pub fn derivative_kernels(order_x: usize, order_y: usize, scale: usize) -> (Vec<f32>, Vec<f32>) {
    debug_assert_eq!(order_x + order_y, 1, "exactly one first-order direction");
    let scale = scale.max(1);
    let ksize = 3 + 2 * (scale - 1);
    let norm = 1.0 / (2.0 * scale as f32 * (SCHARR_W + 2.0));

    let mut smooth = vec![0.0f32; ksize];
    smooth[0] = norm;
    smooth[ksize / 2] = SCHARR_W * norm;
    smooth[ksize - 1] = norm;

    let mut diff = vec![0.0f32; ksize];
    diff[0] = -1.0;
    diff[ksize - 1] = 1.0;

    if order_x == 1 {
        (diff, smooth)
    } else {
        (smooth, diff)
    }
}

/// Scharr-family first derivative at integer scale, replicated borders.
pub fn scharr_derivatives(src: &Image, dst: &mut Image, order_x: usize, order_y: usize, scale: usize) {
    let (kx, ky) = derivative_kernels(order_x, order_y, scale);
    separable_filter(src, dst, &kx, &ky);
}
