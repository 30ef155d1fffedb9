use crate::core::Image;
use crate::imgproc::{gaussian_blur, scharr_derivatives};

/// Histogram resolution of the gradient magnitude estimate.
pub const KCONTRAST_NBINS: usize = 300;
/// Percentile of nonzero gradient magnitudes taken as k.
pub const KCONTRAST_PERCENTILE: f32 = 0.7;
/// Fallback when the image carries no gradient information.
pub const DEFAULT_KCONTRAST: f32 = 0.01;

/// Estimate the diffusion contrast parameter k from gradient statistics.
///
/// The input is smoothed with sigma 1, differentiated with the 3x3 Scharr
/// pair, and the k value is read off a 300-bin histogram of gradient
/// magnitudes at the 70th percentile of nonzero entries. The 1-pixel
/// border is ignored.
#[must_use]
pub fn compute_k_percentile(image: &Image) -> f32 {
    let width = image.width();
    let height = image.height();
    if width < 3 || height < 3 {
        return DEFAULT_KCONTRAST;
    }

    let mut smoothed = Image::new(width, height);
    gaussian_blur(image, &mut smoothed, 1.0);

    let mut lx = Image::new(width, height);
    let mut ly = Image::new(width, height);
    scharr_derivatives(&smoothed, &mut lx, 1, 0, 1);
    scharr_derivatives(&smoothed, &mut ly, 0, 1, 1);

    let mut hmax = 0.0f32;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = lx.get(x, y);
            let gy = ly.get(x, y);
            let modg = (gx * gx + gy * gy).sqrt();
            if modg > hmax {
                hmax = modg;
            }
        }
    }
    if hmax == 0.0 {
        return DEFAULT_KCONTRAST;
    }

    let mut hist = [0u32; KCONTRAST_NBINS];
    let mut npoints = 0u32;
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let gx = lx.get(x, y);
            let gy = ly.get(x, y);
            let modg = (gx * gx + gy * gy).sqrt();
            if modg != 0.0 {
                let bin = ((modg / hmax) * KCONTRAST_NBINS as f32) as usize;
                hist[bin.min(KCONTRAST_NBINS - 1)] += 1;
                npoints += 1;
            }
        }
    }
    if npoints == 0 {
        return DEFAULT_KCONTRAST;
    }

    let threshold = (npoints as f32 * KCONTRAST_PERCENTILE) as u32;
    let mut nelements = 0u32;
    let mut nbin = 0usize;
    while nbin < KCONTRAST_NBINS && nelements < threshold {
        nelements += hist[nbin];
        nbin += 1;
    }

    let k = hmax * nbin as f32 / KCONTRAST_NBINS as f32;
    if nelements < threshold || k <= 0.0 {
        DEFAULT_KCONTRAST
    } else {
        k
    }
}
