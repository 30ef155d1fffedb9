use crate::imgproc::for_each_row_mut;
use crate::scalespace::NonlinearScaleSpace;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Hessian determinant response per level.
///
/// The derivative bank already carries the sigma normalization, so
/// `lxx * lyy - lxy^2` equals sigma^4 det H. Level 0 carries no response.
pub fn compute_detector_response(space: &mut NonlinearScaleSpace) {
    let rest = &mut space.levels[1..];

    #[cfg(feature = "rayon")]
    rest.par_iter_mut().for_each(level_response);

    #[cfg(not(feature = "rayon"))]
    rest.iter_mut().for_each(level_response);
}

fn level_response(level: &mut crate::scalespace::EvolutionLevel) {
    let width = level.ldet.width();
    let (lxx, lxy, lyy) = (&level.lxx, &level.lxy, &level.lyy);

    for_each_row_mut(&mut level.ldet, |y, row| {
        let xx = &lxx.data()[y * width..(y + 1) * width];
        let xy = &lxy.data()[y * width..(y + 1) * width];
        let yy = &lyy.data()[y * width..(y + 1) * width];
        for x in 0..width {
            row[x] = xx[x] * yy[x] - xy[x] * xy[x];
        }
    });
}
