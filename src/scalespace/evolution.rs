use crate::core::Image;
use crate::imgproc::{gaussian_blur, scharr_derivatives};
use crate::scalespace::aos::AosSolver;
use crate::scalespace::contrast::compute_k_percentile;
use crate::scalespace::diffusivity::conductance;
use crate::scalespace::{schedule, KazeConfig};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One level of the nonlinear evolution. All buffers stay at input
/// resolution.
#[derive(Debug, Clone)]
pub struct EvolutionLevel {
    /// Evolution time t = sigma^2 / 2.
    pub time: f32,
    pub sigma: f32,
    pub octave: usize,
    pub sublevel: usize,
    /// round(sigma), sizing the derivative stencils.
    pub sigma_px: usize,
    /// Pre-smoothed image the conductance gradients are taken from.
    pub lsmooth: Image,
    /// Conductance image g(|grad lsmooth|).
    pub lflow: Image,
    /// Diffused image at this evolution time.
    pub lt: Image,
    pub lx: Image,
    pub ly: Image,
    pub lxx: Image,
    pub lxy: Image,
    pub lyy: Image,
    /// Hessian determinant response; zero for level 0.
    pub ldet: Image,
}

impl EvolutionLevel {
    fn new(width: usize, height: usize) -> Self {
        Self {
            time: 0.0,
            sigma: 0.0,
            octave: 0,
            sublevel: 0,
            sigma_px: 1,
            lsmooth: Image::new(width, height),
            lflow: Image::new(width, height),
            lt: Image::new(width, height),
            lx: Image::new(width, height),
            ly: Image::new(width, height),
            lxx: Image::new(width, height),
            lxy: Image::new(width, height),
            lyy: Image::new(width, height),
            ldet: Image::new(width, height),
        }
    }
}

/// The nonlinear scale space: an ordered sequence of evolution levels,
/// read-only once built.
#[derive(Debug)]
pub struct NonlinearScaleSpace {
    pub levels: Vec<EvolutionLevel>,
    /// Diffusion contrast parameter estimated from the input.
    pub kcontrast: f32,
}

impl NonlinearScaleSpace {
    /// Build the evolution by AOS-driven nonlinear diffusion.
    ///
    /// Level 0 is the input smoothed to the base sigma; each further level
    /// advances the previous one by a single implicit step of size
    /// `t_i - t_{i-1}` under the conductance derived from its own
    /// pre-smoothed gradients.
    #[must_use]
    pub fn build(config: &KazeConfig, image: &Image) -> Self {
        let width = image.width();
        let height = image.height();
        let ladder = schedule(config);

        let mut levels: Vec<EvolutionLevel> = ladder
            .iter()
            .map(|s| {
                let mut level = EvolutionLevel::new(width, height);
                level.time = s.time;
                level.sigma = s.sigma;
                level.octave = s.octave;
                level.sublevel = s.sublevel;
                level.sigma_px = s.sigma_px;
                level
            })
            .collect();

        let kcontrast = compute_k_percentile(image);

        // Level 0: plain Gaussian smoothing to the base scale
        gaussian_blur(image, &mut levels[0].lt, config.base_sigma);
        let lt0 = levels[0].lt.clone();
        levels[0].lsmooth = lt0;

        let mut solver = AosSolver::new(width, height);
        for i in 1..levels.len() {
            let (head, tail) = levels.split_at_mut(i);
            let prev = &head[i - 1];
            let level = &mut tail[0];

            gaussian_blur(&prev.lt, &mut level.lsmooth, config.sigma_derivatives);
            scharr_derivatives(&level.lsmooth, &mut level.lx, 1, 0, 1);
            scharr_derivatives(&level.lsmooth, &mut level.ly, 0, 1, 1);
            conductance(
                config.diffusivity,
                &level.lx,
                &level.ly,
                &mut level.lflow,
                kcontrast,
            );

            let dt = level.time - prev.time;
            let (lt, lflow) = (&mut level.lt, &level.lflow);
            solver.step(lt, &prev.lt, lflow, dt);
        }

        let mut space = Self { levels, kcontrast };
        space.compute_multiscale_derivatives();
        space
    }

    /// Scale-normalized derivative bank for levels >= 1.
    ///
    /// First derivatives carry a factor sigma, second derivatives sigma^2,
    /// so the Hessian determinant response is comparable across the
    /// ladder. Levels are independent and processed in parallel.
    fn compute_multiscale_derivatives(&mut self) {
        let rest = &mut self.levels[1..];

        #[cfg(feature = "rayon")]
        rest.par_iter_mut().for_each(derivative_bank);

        #[cfg(not(feature = "rayon"))]
        rest.iter_mut().for_each(derivative_bank);
    }
}

fn derivative_bank(level: &mut EvolutionLevel) {
    let s = level.sigma_px;

    scharr_derivatives(&level.lt, &mut level.lx, 1, 0, s);
    scharr_derivatives(&level.lt, &mut level.ly, 0, 1, s);
    scharr_derivatives(&level.lx, &mut level.lxx, 1, 0, s);
    scharr_derivatives(&level.ly, &mut level.lyy, 0, 1, s);
    scharr_derivatives(&level.lx, &mut level.lxy, 0, 1, s);

    // Stencils are sized by the integer sigma, the normalization uses the
    // exact level sigma so the response stays smooth across the ladder.
    let s1 = level.sigma;
    let s2 = s1 * s1;
    for v in level.lx.data_mut() {
        *v *= s1;
    }
    for v in level.ly.data_mut() {
        *v *= s1;
    }
    for v in level.lxx.data_mut() {
        *v *= s2;
    }
    for v in level.lyy.data_mut() {
        *v *= s2;
    }
    for v in level.lxy.data_mut() {
        *v *= s2;
    }
}
