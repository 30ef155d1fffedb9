use crate::scalespace::NonlinearScaleSpace;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Discrete detector-response maximum prior to subpixel refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub x: usize,
    pub y: usize,
    /// Evolution level index, always in [1, N-2].
    pub level: usize,
    pub response: f32,
}

/// Find 3-D response maxima across space and scale.
///
/// A candidate must exceed the detector threshold and be a strict maximum
/// over its 3x3x3 neighborhood in (x, y, level). Levels are scanned in
/// parallel into worker-local buckets; the joined list is re-ordered by
/// the deterministic (level, y, x) tie-break and then thinned by the
/// cross-level sigma-distance suppression.
#[must_use]
pub fn find_scale_space_extrema(space: &NonlinearScaleSpace, threshold: f32) -> Vec<Candidate> {
    let n = space.levels.len();
    if n < 3 {
        return Vec::new();
    }

    let scan = |i: usize| scan_level(space, i, threshold);

    #[cfg(feature = "rayon")]
    let buckets: Vec<Vec<Candidate>> = (1..n - 1).into_par_iter().map(scan).collect();

    #[cfg(not(feature = "rayon"))]
    let buckets: Vec<Vec<Candidate>> = (1..n - 1).map(scan).collect();

    let mut candidates: Vec<Candidate> = buckets.into_iter().flatten().collect();
    candidates.sort_unstable_by(|a, b| {
        (a.level, a.y, a.x).cmp(&(b.level, b.y, b.x))
    });

    suppress_neighbors(space, candidates)
}

fn scan_level(space: &NonlinearScaleSpace, i: usize, threshold: f32) -> Vec<Candidate> {
    let level = &space.levels[i];
    let prev = &space.levels[i - 1].ldet;
    let curr = &level.ldet;
    let next = &space.levels[i + 1].ldet;

    let width = curr.width();
    let height = curr.height();
    let border = 1 + level.sigma_px;
    if width <= 2 * border || height <= 2 * border {
        return Vec::new();
    }

    let mut found = Vec::new();
    for y in border..height - border {
        for x in border..width - border {
            let value = curr.get(x, y);
            if value <= threshold {
                continue;
            }
            if is_strict_maximum(prev, curr, next, x, y, value) {
                found.push(Candidate {
                    x,
                    y,
                    level: i,
                    response: value,
                });
            }
        }
    }
    found
}

fn is_strict_maximum(
    prev: &crate::core::Image,
    curr: &crate::core::Image,
    next: &crate::core::Image,
    x: usize,
    y: usize,
    value: f32,
) -> bool {
    for img in [prev, curr, next] {
        for yy in y - 1..=y + 1 {
            for xx in x - 1..=x + 1 {
                if std::ptr::eq(img, curr) && xx == x && yy == y {
                    continue;
                }
                if img.get(xx, yy) >= value {
                    return false;
                }
            }
        }
    }
    true
}

/// Cross-level spatial suppression.
///
/// Processed in the deterministic order established by the caller: a
/// candidate within sigma of an accepted one on a neighboring level
/// survives only if its response is strictly larger, in which case the
/// weaker point is evicted. Same-level candidates are left alone, the
/// 3x3x3 strict-maximum test is the only filter within a level.
fn suppress_neighbors(space: &NonlinearScaleSpace, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut accepted: Vec<Candidate> = Vec::with_capacity(candidates.len());

    'next_candidate: for cand in candidates {
        let radius = space.levels[cand.level].sigma;
        let radius2 = radius * radius;
        let mut evicted: Vec<usize> = Vec::new();

        for (idx, kept) in accepted.iter().enumerate() {
            let level_gap = kept.level.abs_diff(cand.level);
            if level_gap == 0 || level_gap > 1 {
                continue;
            }
            let dx = kept.x as f32 - cand.x as f32;
            let dy = kept.y as f32 - cand.y as f32;
            if dx * dx + dy * dy <= radius2 {
                if kept.response >= cand.response {
                    continue 'next_candidate;
                }
                evicted.push(idx);
            }
        }

        for idx in evicted.into_iter().rev() {
            accepted.remove(idx);
        }
        accepted.push(cand);
    }

    accepted
}
