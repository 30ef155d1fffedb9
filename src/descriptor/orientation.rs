use std::f32::consts::PI;

use crate::core::KeyPoint;
use crate::scalespace::EvolutionLevel;

/// Width of the sliding angular sector.
const SECTOR_WIDTH: f32 = PI / 3.0;
/// Rotation step of the sliding sector.
const SECTOR_STEP: f32 = PI / 36.0;

/// Map a response vector to an angle in [0, 2pi).
fn response_angle(x: f32, y: f32) -> f32 {
    let a = y.atan2(x);
    if a >= 0.0 {
        a
    } else {
        a + 2.0 * PI
    }
}

/// Dominant orientation of a keypoint.
///
/// Gaussian-weighted first-derivative responses are collected on a
/// circular grid of radius 6s with step s around the point, then a pi/3
/// sector is rotated in pi/36 steps; the sector whose summed response
/// vector is longest gives the angle.
#[must_use]
pub fn dominant_orientation(level: &EvolutionLevel, kp: &KeyPoint) -> f32 {
    let s = kp.sigma.round().max(1.0);
    let width = level.lx.width() as i64;
    let height = level.lx.height() as i64;
    let inv_two_sigma2 = 1.0 / (2.0 * (2.5 * s) * (2.5 * s));

    // At most the 109 grid nodes inside the radius-6 disc
    let mut res_x: Vec<f32> = Vec::with_capacity(109);
    let mut res_y: Vec<f32> = Vec::with_capacity(109);
    let mut angles: Vec<f32> = Vec::with_capacity(109);

    for i in -6i32..=6 {
        for j in -6i32..=6 {
            if i * i + j * j >= 36 {
                continue;
            }
            let ix = (kp.x + i as f32 * s).round() as i64;
            let iy = (kp.y + j as f32 * s).round() as i64;
            if ix < 0 || iy < 0 || ix >= width || iy >= height {
                continue;
            }

            let dx = ix as f32 - kp.x;
            let dy = iy as f32 - kp.y;
            let weight = (-(dx * dx + dy * dy) * inv_two_sigma2).exp();

            let rx = weight * level.lx.get(ix as usize, iy as usize);
            let ry = weight * level.ly.get(ix as usize, iy as usize);
            res_x.push(rx);
            res_y.push(ry);
            angles.push(response_angle(rx, ry));
        }
    }

    let mut best_norm2 = 0.0f32;
    let mut best_angle = 0.0f32;

    let steps = (2.0 * PI / SECTOR_STEP) as usize;
    for step in 0..steps {
        let start = step as f32 * SECTOR_STEP;
        let end = (start + SECTOR_WIDTH) % (2.0 * PI);

        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        for ((&ang, &rx), &ry) in angles.iter().zip(&res_x).zip(&res_y) {
            let inside = if start < end {
                ang >= start && ang < end
            } else {
                ang >= start || ang < end
            };
            if inside {
                sum_x += rx;
                sum_y += ry;
            }
        }

        let norm2 = sum_x * sum_x + sum_y * sum_y;
        if norm2 > best_norm2 {
            best_norm2 = norm2;
            best_angle = response_angle(sum_x, sum_y);
        }
    }

    best_angle
}
