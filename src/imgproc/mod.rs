pub mod deriv;
pub mod gaussian;

pub use deriv::{derivative_kernels, scharr_derivatives};
pub use gaussian::gaussian_blur;

use crate::core::Image;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Run `f` once per image row with a mutable row slice, in parallel when the
/// `rayon` feature is enabled. Rows are independent in every caller.
pub(crate) fn for_each_row_mut<F>(img: &mut Image, f: F)
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    let width = img.width();
    if width == 0 {
        return;
    }

    #[cfg(feature = "rayon")]
    img.data_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "rayon"))]
    for (y, row) in img.data_mut().chunks_mut(width).enumerate() {
        f(y, row);
    }
}

/// Separable 2-D correlation with replicated borders.
///
/// `kernel_x` runs along rows, `kernel_y` along columns. Both passes are
/// parallel over output rows.
pub fn separable_filter(src: &Image, dst: &mut Image, kernel_x: &[f32], kernel_y: &[f32]) {
    debug_assert_eq!(src.width(), dst.width());
    debug_assert_eq!(src.height(), dst.height());

    let width = src.width();
    let height = src.height();
    if width == 0 || height == 0 {
        return;
    }

    let half_x = kernel_x.len() / 2;
    let half_y = kernel_y.len() / 2;

    // Horizontal pass
    let mut tmp = Image::new(width, height);
    for_each_row_mut(&mut tmp, |y, tmp_row| {
        let src_row = src.row(y);
        for x in 0..width {
            let mut acc = 0.0f32;
            for (i, &k) in kernel_x.iter().enumerate() {
                let xx = (x as i64 + i as i64 - half_x as i64).clamp(0, width as i64 - 1) as usize;
                acc += src_row[xx] * k;
            }
            tmp_row[x] = acc;
        }
    });

    // Vertical pass
    for_each_row_mut(dst, |y, dst_row| {
        for (i, &k) in kernel_y.iter().enumerate() {
            let yy = (y as i64 + i as i64 - half_y as i64).clamp(0, height as i64 - 1) as usize;
            let tmp_row = tmp.row(yy);
            if i == 0 {
                for x in 0..width {
                    dst_row[x] = tmp_row[x] * k;
                }
            } else {
                for x in 0..width {
                    dst_row[x] += tmp_row[x] * k;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_kernel() {
        let mut src = Image::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                src.set(x, y, (y * 4 + x) as f32);
            }
        }

        let mut dst = Image::new(4, 3);
        separable_filter(&src, &mut dst, &[1.0], &[1.0]);

        assert_eq!(src, dst);
    }

    #[test]
    fn test_box_kernel_averages() {
        let mut src = Image::new(3, 1);
        src.set(0, 0, 3.0);
        src.set(1, 0, 6.0);
        src.set(2, 0, 9.0);

        let mut dst = Image::new(3, 1);
        let k = [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0];
        separable_filter(&src, &mut dst, &k, &[1.0]);

        // Border replicates: (3+3+6)/3 = 4
        assert!((dst.get(0, 0) - 4.0).abs() < 1e-6);
        assert!((dst.get(1, 0) - 6.0).abs() < 1e-6);
        assert!((dst.get(2, 0) - 8.0).abs() < 1e-6);
    }
}
