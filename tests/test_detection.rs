// Detector end-to-end scenarios: empty inputs, the single-blob contract,
// multi-scale localization, and determinism on dense noise.

use kaze_rust::prelude::*;
use ndarray::Array2;

fn gaussian_blob(n: usize, cx: f32, cy: f32, sigma: f32, amplitude: f32) -> Array2<f32> {
    Array2::from_shape_fn((n, n), |(row, col)| {
        let dx = col as f32 - cx;
        let dy = row as f32 - cy;
        amplitude * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
    })
}

/// Deterministic pseudo-noise, linear congruential
fn noise_image(n: usize, seed: u32) -> Array2<f32> {
    let mut state = seed;
    Array2::from_shape_fn((n, n), |_| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 8) as f32 / 16_777_216.0
    })
}

#[test]
fn test_all_zero_image_yields_nothing() {
    let kaze = Kaze::new(KazeConfig::new(128, 128)).unwrap();
    let image = Array2::<f32>::zeros((128, 128));

    let (keypoints, descriptors) = kaze.detect_and_describe(image.view()).unwrap();
    assert!(keypoints.is_empty(), "flat image produced {} points", keypoints.len());
    assert_eq!(descriptors.nrows(), 0);
}

#[test]
fn test_single_blob_yields_single_centered_keypoint() {
    let n = 256;
    let (cx, cy) = (128.5f32, 128.5f32);
    let image = gaussian_blob(n, cx, cy, 3.2, 0.8);

    let kaze = Kaze::new(KazeConfig::new(n, n)).unwrap();
    let (keypoints, descriptors) = kaze.detect_and_describe(image.view()).unwrap();

    // Every detection an isolated blob produces must sit on the blob; the
    // integer derivative stencils can report the same spot at more than one
    // scale, but never anywhere else.
    assert!(!keypoints.is_empty(), "an isolated blob must be detected");
    for kp in &keypoints {
        let dist = ((kp.x - cx).powi(2) + (kp.y - cy).powi(2)).sqrt();
        assert!(dist < 0.5, "keypoint at ({}, {}), {dist} px off center", kp.x, kp.y);
    }

    for row in descriptors.rows() {
        let norm: f32 = row.iter().map(|&v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "descriptor norm was {norm}");
    }
}

#[test]
fn test_blob_scale_matches_detection_scale() {
    let n = 256;
    let blob_sigma = 3.2f32;
    let image = gaussian_blob(n, 128.5, 128.5, blob_sigma, 0.8);

    let kaze = Kaze::new(KazeConfig::new(n, n)).unwrap();
    let keypoints = kaze.detect(image.view()).unwrap();

    assert!(!keypoints.is_empty());
    let best_ratio = keypoints
        .iter()
        .map(|kp| {
            let r = kp.sigma / blob_sigma;
            if r >= 1.0 {
                r
            } else {
                1.0 / r
            }
        })
        .fold(f32::INFINITY, f32::min);
    assert!(
        best_ratio <= 2.0,
        "no detection within an octave of the blob scale, closest ratio {best_ratio}"
    );
}

#[test]
fn test_separated_blobs_are_each_localized() {
    let n = 256;
    let centers = [(64.5f32, 64.5f32, 2.5f32), (192.5, 64.5, 3.5), (128.5, 192.5, 5.0)];

    let mut image = Array2::<f32>::zeros((n, n));
    for &(cx, cy, sigma) in &centers {
        let blob = gaussian_blob(n, cx, cy, sigma, 0.8);
        image += &blob;
    }

    let kaze = Kaze::new(KazeConfig::new(n, n)).unwrap();
    let keypoints = kaze.detect(image.view()).unwrap();

    for &(cx, cy, sigma) in &centers {
        let nearest = keypoints
            .iter()
            .map(|kp| ((kp.x - cx).powi(2) + (kp.y - cy).powi(2)).sqrt())
            .fold(f32::INFINITY, f32::min);
        assert!(
            nearest < 0.5,
            "blob at ({cx}, {cy}) sigma {sigma} missed, nearest keypoint {nearest} px away"
        );
    }
}

#[test]
fn test_tiny_images_yield_nothing() {
    for n in [1usize, 2] {
        let kaze = Kaze::new(KazeConfig::new(n, n)).unwrap();
        let mut image = Array2::<f32>::zeros((n, n));
        image[(0, 0)] = 1.0;

        let keypoints = kaze.detect(image.view()).unwrap();
        assert!(keypoints.is_empty(), "{n}x{n} image produced keypoints");
    }
}

#[test]
fn test_empty_view_yields_nothing() {
    let kaze = Kaze::new(KazeConfig::new(64, 64)).unwrap();
    let image = Array2::<f32>::zeros((0, 0));

    let (keypoints, descriptors) = kaze.detect_and_describe(image.view()).unwrap();
    assert!(keypoints.is_empty());
    assert_eq!(descriptors.nrows(), 0);
    assert_eq!(descriptors.ncols(), 64);
}

#[test]
fn test_shape_mismatch_is_an_error() {
    let kaze = Kaze::new(KazeConfig::new(64, 64)).unwrap();
    let image = Array2::<f32>::zeros((64, 96));

    assert!(matches!(
        kaze.detect(image.view()),
        Err(Error::ImageShapeMismatch { .. })
    ));
}

#[test]
fn test_detection_is_deterministic_on_noise() {
    let n = 512;
    let image = noise_image(n, 0xC0FFEE);
    let kaze = Kaze::new(KazeConfig::new(n, n)).unwrap();

    let first = kaze.detect(image.view()).unwrap();
    let second = kaze.detect(image.view()).unwrap();

    assert_eq!(first.len(), second.len(), "keypoint count must be stable");
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        assert_eq!(a.sigma, b.sigma);
        assert_eq!(a.response, b.response);
        assert_eq!(a.class_id, b.class_id);
    }
}

#[test]
fn test_detection_order_is_canonical() {
    let n = 256;
    let image = noise_image(n, 42);
    let kaze = Kaze::new(KazeConfig::new(n, n)).unwrap();

    let keypoints = kaze.detect(image.view()).unwrap();
    for pair in keypoints.windows(2) {
        assert!(
            pair[0].class_id <= pair[1].class_id,
            "keypoints must keep the ascending level order of the candidate scan"
        );
    }

    // Every reported level must be an interior evolution level
    let n_levels = KazeConfig::new(n, n).levels() as i32;
    for kp in &keypoints {
        assert!(kp.class_id >= 1 && kp.class_id < n_levels - 1);
    }
}

#[test]
fn test_strict_threshold_prunes_keypoints() {
    let n = 256;
    let image = noise_image(n, 7);

    let loose = Kaze::new(KazeConfig::new(n, n)).unwrap();
    let strict = Kaze::new(KazeConfig::new(n, n).with_detector_threshold(1e-1)).unwrap();

    let loose_count = loose.detect(image.view()).unwrap().len();
    let strict_count = strict.detect(image.view()).unwrap().len();
    assert!(
        strict_count <= loose_count,
        "raising the threshold must not add keypoints: {strict_count} > {loose_count}"
    );
}
