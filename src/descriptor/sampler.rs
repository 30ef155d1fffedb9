use crate::core::KeyPoint;
use crate::scalespace::{DescriptorKind, EvolutionLevel, KazeConfig};

/// Clip-and-renormalize parameters of the optional descriptor clipping.
const CLIPPING_RATIO: f32 = 1.6;
const CLIPPING_NITER: usize = 5;

/// Sampling layout shared by the descriptor variants.
///
/// A 4x4 grid of subregions covers a window of `2 * pattern_half` sample
/// steps; subregions hold `subregion_samples` samples per axis and start
/// every `subregion_step` samples, which lets M-SURF style subregions
/// overlap. `two_stage` switches between the single keypoint-centered
/// Gaussian of plain SURF and the per-sample plus per-subregion weighting
/// of M-SURF.
struct SampleGeometry {
    pattern_half: i32,
    subregion_samples: i32,
    subregion_step: i32,
    two_stage: bool,
}

impl SampleGeometry {
    fn for_kind(kind: DescriptorKind) -> Self {
        match kind {
            DescriptorKind::Surf => Self {
                pattern_half: 10,
                subregion_samples: 5,
                subregion_step: 5,
                two_stage: false,
            },
            DescriptorKind::MSurf | DescriptorKind::GSurf => Self {
                pattern_half: 12,
                subregion_samples: 9,
                subregion_step: 5,
                two_stage: true,
            },
        }
    }
}

/// Compute one descriptor row for a keypoint at its evolution level.
///
/// The window is sampled on a grid rotated by the keypoint angle with
/// spacing round(sigma); first-order (SURF, M-SURF) or second-order gauge
/// (G-SURF) responses are projected onto the rotated axes, accumulated per
/// subregion, and the assembled vector is normalized to unit length.
pub(crate) fn describe_keypoint(
    level: &EvolutionLevel,
    kp: &KeyPoint,
    config: &KazeConfig,
) -> Vec<f32> {
    let geometry = SampleGeometry::for_kind(config.descriptor_kind);
    let gauge = config.descriptor_kind == DescriptorKind::GSurf;
    let len = config.descriptor_len();
    let mut desc = Vec::with_capacity(len);

    let s = kp.sigma.round().max(1.0);
    let (si, co) = kp.angle.sin_cos();

    // Per-sample Gaussian, sigma 2.5 in grid units
    let inv_sample_sigma2 = 1.0 / (2.0 * 2.5 * 2.5);
    // Per-subregion Gaussian, sigma 1.5 in subregion units
    let inv_subregion_sigma2 = 1.0 / (2.0 * 1.5 * 1.5);

    for v in 0..4 {
        let base_k = -geometry.pattern_half + v * geometry.subregion_step;
        let center_k = (base_k + geometry.subregion_samples / 2) as f32;
        for u in 0..4 {
            let base_l = -geometry.pattern_half + u * geometry.subregion_step;
            let center_l = (base_l + geometry.subregion_samples / 2) as f32;

            let mut acc = [0.0f32; 8];
            for k in base_k..base_k + geometry.subregion_samples {
                for l in base_l..base_l + geometry.subregion_samples {
                    let kf = k as f32;
                    let lf = l as f32;

                    let sample_x = kp.x + s * (co * lf - si * kf);
                    let sample_y = kp.y + s * (si * lf + co * kf);

                    let rx = level.lx.bilinear(sample_x, sample_y);
                    let ry = level.ly.bilinear(sample_x, sample_y);
                    let (px, py) = if gauge {
                        let xx = level.lxx.bilinear(sample_x, sample_y);
                        let xy = level.lxy.bilinear(sample_x, sample_y);
                        let yy = level.lyy.bilinear(sample_x, sample_y);
                        (xx * rx + xy * ry, xy * rx + yy * ry)
                    } else {
                        (rx, ry)
                    };

                    // Project the response onto the rotated axes
                    let rrx = px * co + py * si;
                    let rry = -px * si + py * co;

                    let weight = if geometry.two_stage {
                        let dl = lf - center_l;
                        let dk = kf - center_k;
                        (-(dl * dl + dk * dk) * inv_sample_sigma2).exp()
                    } else {
                        (-(lf * lf + kf * kf) * inv_sample_sigma2).exp()
                    };

                    let wx = weight * rrx;
                    let wy = weight * rry;

                    if config.extended {
                        // Split by the sign of the orthogonal response
                        if rry >= 0.0 {
                            acc[0] += wx;
                            acc[2] += wx.abs();
                        } else {
                            acc[1] += wx;
                            acc[3] += wx.abs();
                        }
                        if rrx >= 0.0 {
                            acc[4] += wy;
                            acc[6] += wy.abs();
                        } else {
                            acc[5] += wy;
                            acc[7] += wy.abs();
                        }
                    } else {
                        acc[0] += wx;
                        acc[1] += wy;
                        acc[2] += wx.abs();
                        acc[3] += wy.abs();
                    }
                }
            }

            let subregion_weight = if geometry.two_stage {
                let du = u as f32 - 1.5;
                let dv = v as f32 - 1.5;
                (-(du * du + dv * dv) * inv_subregion_sigma2).exp()
            } else {
                1.0
            };

            let features = if config.extended { 8 } else { 4 };
            for &a in acc.iter().take(features) {
                desc.push(a * subregion_weight);
            }
        }
    }

    normalize(&mut desc);
    if config.clipping_normalization {
        clip_descriptor(&mut desc);
    }
    desc
}

fn normalize(desc: &mut [f32]) {
    let norm2: f32 = desc.iter().map(|&v| v * v).sum();
    if norm2 > 0.0 {
        let inv = 1.0 / norm2.sqrt();
        for v in desc.iter_mut() {
            *v *= inv;
        }
    }
}

/// Iterative clipping normalization: clamp against a ceiling derived from
/// the descriptor length, then restore unit norm. Off by default.
fn clip_descriptor(desc: &mut [f32]) {
    let cratio = CLIPPING_RATIO / (desc.len() as f32).sqrt();
    for _ in 0..CLIPPING_NITER {
        for v in desc.iter_mut() {
            *v = v.clamp(-cratio, cratio);
        }
        normalize(desc);
    }
}
