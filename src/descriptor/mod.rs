pub mod orientation;
pub mod sampler;

pub use orientation::dominant_orientation;

use ndarray::Array2;

use crate::core::KeyPoint;
use crate::scalespace::{KazeConfig, NonlinearScaleSpace};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Compute descriptors for every keypoint, one matrix row per point in
/// keypoint order.
///
/// Orientation runs here unless the configuration is upright; the
/// estimated angle is written back into the keypoint. Keypoints are
/// independent and processed in parallel.
pub fn compute_descriptors(
    space: &NonlinearScaleSpace,
    config: &KazeConfig,
    keypoints: &mut [KeyPoint],
) -> Array2<f32> {
    let len = config.descriptor_len();

    let describe = |kp: &mut KeyPoint| {
        let level = &space.levels[kp.class_id as usize];
        if config.upright {
            kp.angle = 0.0;
        } else {
            kp.angle = dominant_orientation(level, kp);
        }
        sampler::describe_keypoint(level, kp, config)
    };

    #[cfg(feature = "rayon")]
    let rows: Vec<Vec<f32>> = keypoints.par_iter_mut().map(describe).collect();

    #[cfg(not(feature = "rayon"))]
    let rows: Vec<Vec<f32>> = keypoints.iter_mut().map(describe).collect();

    let mut descriptors = Array2::zeros((rows.len(), len));
    for (mut out, row) in descriptors.rows_mut().into_iter().zip(&rows) {
        for (slot, &value) in out.iter_mut().zip(row) {
            *slot = value;
        }
    }
    descriptors
}
