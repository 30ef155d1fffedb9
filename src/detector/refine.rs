use crate::core::KeyPoint;
use crate::detector::Candidate;
use crate::scalespace::{KazeConfig, NonlinearScaleSpace};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Determinant floor below which the quadratic fit is considered singular.
const SINGULAR_EPS: f32 = 1e-10;

/// Subpixel refinement of discrete extrema.
///
/// Fits a 3-D quadratic to the response around each candidate by finite
/// differences in (x, y, level) and solves for the stationary offset.
/// Candidates with a singular system or an offset beyond one cell are
/// dropped; survivors keep the deterministic candidate order.
#[must_use]
pub fn subpixel_refinement(
    space: &NonlinearScaleSpace,
    config: &KazeConfig,
    candidates: &[Candidate],
) -> Vec<KeyPoint> {
    let refine = |cand: &Candidate| refine_candidate(space, config, cand);

    #[cfg(feature = "rayon")]
    let refined: Vec<Option<KeyPoint>> = candidates.par_iter().map(refine).collect();

    #[cfg(not(feature = "rayon"))]
    let refined: Vec<Option<KeyPoint>> = candidates.iter().map(refine).collect();

    refined.into_iter().flatten().collect()
}

fn refine_candidate(
    space: &NonlinearScaleSpace,
    config: &KazeConfig,
    cand: &Candidate,
) -> Option<KeyPoint> {
    let level = &space.levels[cand.level];
    let prev = &space.levels[cand.level - 1].ldet;
    let curr = &level.ldet;
    let next = &space.levels[cand.level + 1].ldet;
    let (x, y) = (cand.x, cand.y);

    let v = curr.get(x, y);

    // Gradient
    let dx = 0.5 * (curr.get(x + 1, y) - curr.get(x - 1, y));
    let dy = 0.5 * (curr.get(x, y + 1) - curr.get(x, y - 1));
    let ds = 0.5 * (next.get(x, y) - prev.get(x, y));

    // Hessian
    let dxx = curr.get(x + 1, y) + curr.get(x - 1, y) - 2.0 * v;
    let dyy = curr.get(x, y + 1) + curr.get(x, y - 1) - 2.0 * v;
    let dss = next.get(x, y) + prev.get(x, y) - 2.0 * v;
    let dxy = 0.25
        * (curr.get(x + 1, y + 1) + curr.get(x - 1, y - 1)
            - curr.get(x + 1, y - 1)
            - curr.get(x - 1, y + 1));
    let dxs = 0.25
        * (next.get(x + 1, y) + prev.get(x - 1, y) - next.get(x - 1, y) - prev.get(x + 1, y));
    let dys = 0.25
        * (next.get(x, y + 1) + prev.get(x, y - 1) - next.get(x, y - 1) - prev.get(x, y + 1));

    let offset = solve_3x3(
        [[dxx, dxy, dxs], [dxy, dyy, dys], [dxs, dys, dss]],
        [-dx, -dy, -ds],
    )?;

    if offset.iter().any(|o| !o.is_finite() || o.abs() > 1.0) {
        return None;
    }

    let sublevel = level.sublevel as f32 + offset[2];
    let exponent = level.octave as f32 + sublevel / config.sublevels as f32;
    let sigma = config.base_sigma * 2.0f32.powf(exponent);

    Some(KeyPoint {
        x: x as f32 + offset[0],
        y: y as f32 + offset[1],
        sigma,
        response: cand.response,
        octave: level.octave as i32,
        sublevel,
        angle: 0.0,
        class_id: cand.level as i32,
    })
}

/// Solve a symmetric 3x3 system by Cramer's rule; `None` when singular.
fn solve_3x3(a: [[f32; 3]; 3], b: [f32; 3]) -> Option<[f32; 3]> {
    let det = a[0][0] * (a[1][1] * a[2][2] - a[1][2] * a[2][1])
        - a[0][1] * (a[1][0] * a[2][2] - a[1][2] * a[2][0])
        + a[0][2] * (a[1][0] * a[2][1] - a[1][1] * a[2][0]);
    if det.abs() < SINGULAR_EPS || !det.is_finite() {
        return None;
    }

    let mut x = [0.0f32; 3];
    for col in 0..3 {
        let mut m = a;
        for row in 0..3 {
            m[row][col] = b[row];
        }
        let det_col = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
        x[col] = det_col / det;
    }
    Some(x)
}
