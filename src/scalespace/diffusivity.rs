use crate::core::Image;
use crate::imgproc::for_each_row_mut;
use crate::scalespace::Diffusivity;

/// Weickert conductance exponent constant.
const WEICKERT_C: f32 = 3.315;

/// Fill `flow` with the conductance image g(|grad L|) for the chosen
/// diffusivity. `lx`/`ly` are the smoothed-image gradients; `k` is the
/// contrast parameter.
///
/// Values land in (0, 1], reaching 1 exactly where the gradient vanishes.
pub fn conductance(kind: Diffusivity, lx: &Image, ly: &Image, flow: &mut Image, k: f32) {
    debug_assert_eq!(lx.width(), flow.width());
    debug_assert_eq!(ly.height(), flow.height());

    let inv_k2 = 1.0 / (k * k);
    let width = flow.width();

    for_each_row_mut(flow, |y, row| {
        let lx_row = &lx.data()[y * width..(y + 1) * width];
        let ly_row = &ly.data()[y * width..(y + 1) * width];
        for x in 0..width {
            let grad2 = lx_row[x] * lx_row[x] + ly_row[x] * ly_row[x];
            row[x] = match kind {
                Diffusivity::PmG1 => (-grad2 * inv_k2).exp(),
                Diffusivity::PmG2 => 1.0 / (1.0 + grad2 * inv_k2),
                Diffusivity::Weickert => {
                    let ratio2 = grad2 * inv_k2;
                    if ratio2 == 0.0 {
                        1.0
                    } else {
                        // ratio2^4 = (|grad| / k)^8
                        let r8 = ratio2 * ratio2 * ratio2 * ratio2;
                        1.0 - (-WEICKERT_C / r8).exp()
                    }
                }
            };
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conductance_at(kind: Diffusivity, gx: f32, gy: f32, k: f32) -> f32 {
        let mut lx = Image::new(1, 1);
        let mut ly = Image::new(1, 1);
        let mut flow = Image::new(1, 1);
        lx.set(0, 0, gx);
        ly.set(0, 0, gy);
        conductance(kind, &lx, &ly, &mut flow, k);
        flow.get(0, 0)
    }

    #[test]
    fn test_unit_conductance_at_zero_gradient() {
        for kind in [Diffusivity::PmG1, Diffusivity::PmG2, Diffusivity::Weickert] {
            let g = conductance_at(kind, 0.0, 0.0, 0.01);
            assert_eq!(g, 1.0, "{kind:?} must be 1 on flat regions");
        }
    }

    #[test]
    fn test_conductance_in_unit_interval() {
        // Gradients stay within a few multiples of k; far past the contrast
        // threshold the Weickert form underflows to an exact 0 in f32.
        for kind in [Diffusivity::PmG1, Diffusivity::PmG2, Diffusivity::Weickert] {
            for &grad in &[1e-4f32, 0.005, 0.01, 0.02, 0.05] {
                let g = conductance_at(kind, grad, 0.0, 0.01);
                assert!(g > 0.0 && g <= 1.0, "{kind:?} at |grad|={grad} gave {g}");
            }
        }
    }

    #[test]
    fn test_conductance_decreases_across_edges() {
        for kind in [Diffusivity::PmG1, Diffusivity::PmG2, Diffusivity::Weickert] {
            let weak = conductance_at(kind, 0.005, 0.0, 0.01);
            let strong = conductance_at(kind, 0.5, 0.0, 0.01);
            assert!(
                strong < weak,
                "{kind:?} must attenuate diffusion at strong edges"
            );
        }
    }

    #[test]
    fn test_pm_g2_closed_form() {
        let g = conductance_at(Diffusivity::PmG2, 0.01, 0.0, 0.01);
        assert!((g - 0.5).abs() < 1e-6, "g2 at |grad|=k should be 1/2, got {g}");
    }
}
