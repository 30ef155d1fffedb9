use crate::error::{Error, Result};

/// Conductance function driving the nonlinear diffusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diffusivity {
    /// Perona-Malik g1 = exp(-|dL|^2 / k^2), favors high-contrast edges
    PmG1,
    /// Perona-Malik g2 = 1 / (1 + |dL|^2 / k^2), favors wide regions
    PmG2,
    /// Weickert conductance, rapid cut-off past the contrast threshold
    Weickert,
}

/// Descriptor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Plain SURF sampling on a 20s window
    Surf,
    /// Modified SURF: 24s window with overlapping, doubly weighted subregions
    MSurf,
    /// Gauge-SURF: M-SURF geometry over second-order gauge responses
    GSurf,
}

/// KAZE options, immutable after `Kaze::new` validates them.
///
/// Defaults: sigma 1.6 base scale, 4 octaves of 4 sublevels, PM g2
/// conductance, oriented 64-dimensional M-SURF descriptors.
#[derive(Debug, Clone)]
pub struct KazeConfig {
    /// Sigma of evolution level 0.
    pub base_sigma: f32,
    /// Number of octave doublings.
    pub octaves: usize,
    /// Levels per octave.
    pub sublevels: usize,
    pub diffusivity: Diffusivity,
    /// Gaussian smoothing applied before the conductance gradients.
    pub sigma_derivatives: f32,
    /// Minimum accepted Hessian determinant response.
    pub detector_threshold: f32,
    pub descriptor_kind: DescriptorKind,
    /// Skip orientation estimation; descriptor axes = image axes.
    pub upright: bool,
    /// 128-dimensional descriptors instead of 64.
    pub extended: bool,
    /// Iterative clip-and-renormalize of descriptors (off by default).
    pub clipping_normalization: bool,
    pub image_width: usize,
    pub image_height: usize,
}

impl KazeConfig {
    #[must_use]
    pub fn new(image_width: usize, image_height: usize) -> Self {
        Self {
            base_sigma: 1.6,
            octaves: 4,
            sublevels: 4,
            diffusivity: Diffusivity::PmG2,
            sigma_derivatives: 1.0,
            detector_threshold: 1e-3,
            descriptor_kind: DescriptorKind::MSurf,
            upright: false,
            extended: false,
            clipping_normalization: false,
            image_width,
            image_height,
        }
    }

    #[must_use]
    pub fn with_base_sigma(mut self, base_sigma: f32) -> Self {
        self.base_sigma = base_sigma;
        self
    }

    #[must_use]
    pub fn with_octaves(mut self, octaves: usize) -> Self {
        self.octaves = octaves;
        self
    }

    #[must_use]
    pub fn with_sublevels(mut self, sublevels: usize) -> Self {
        self.sublevels = sublevels;
        self
    }

    #[must_use]
    pub fn with_diffusivity(mut self, diffusivity: Diffusivity) -> Self {
        self.diffusivity = diffusivity;
        self
    }

    #[must_use]
    pub fn with_detector_threshold(mut self, threshold: f32) -> Self {
        self.detector_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_descriptor(mut self, kind: DescriptorKind) -> Self {
        self.descriptor_kind = kind;
        self
    }

    #[must_use]
    pub fn with_upright(mut self, upright: bool) -> Self {
        self.upright = upright;
        self
    }

    #[must_use]
    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    #[must_use]
    pub fn with_clipping_normalization(mut self, enabled: bool) -> Self {
        self.clipping_normalization = enabled;
        self
    }

    /// Total number of evolution levels, 1 + octaves * sublevels.
    #[must_use]
    pub fn levels(&self) -> usize {
        1 + self.octaves * self.sublevels
    }

    /// Descriptor row length for this configuration.
    #[must_use]
    pub fn descriptor_len(&self) -> usize {
        if self.extended {
            128
        } else {
            64
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.octaves == 0 {
            return Err(Error::InvalidConfiguration(
                "octaves must be at least 1".to_string(),
            ));
        }
        if self.sublevels == 0 {
            return Err(Error::InvalidConfiguration(
                "sublevels must be at least 1".to_string(),
            ));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(Error::InvalidConfiguration(format!(
                "image dimensions must be positive, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if !(self.base_sigma.is_finite() && self.base_sigma > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "base_sigma must be positive, got {}",
                self.base_sigma
            )));
        }
        if !(self.sigma_derivatives.is_finite() && self.sigma_derivatives > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "sigma_derivatives must be positive, got {}",
                self.sigma_derivatives
            )));
        }
        if !(self.detector_threshold.is_finite() && self.detector_threshold > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "detector_threshold must be positive, got {}",
                self.detector_threshold
            )));
        }
        Ok(())
    }
}
