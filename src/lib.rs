//! # KAZE-Rust
//!
//! A pure Rust implementation of the KAZE feature detector and descriptor.
//!
//! KAZE locates scale-invariant salient points in a grayscale image by
//! building its scale hierarchy with nonlinear diffusion instead of
//! Gaussian pyramids: an implicit AOS solver drives a Perona-Malik /
//! Weickert diffusion over a logarithmic sigma ladder, so blobs stay
//! localized at coarse scales instead of drifting across edges.
//!
//! ## Features
//!
//! - **Scale space**: AOS-driven nonlinear diffusion at full resolution
//! - **Detector**: normalized Hessian determinant response, 3-D non-maximum
//!   suppression and subpixel refinement
//! - **Descriptors**: SURF, M-SURF and G-SURF families, 64 or 128
//!   dimensional, upright or rotation invariant
//!
//! ## Example
//!
//! ```rust
//! use kaze_rust::prelude::*;
//! use ndarray::Array2;
//!
//! # fn main() -> kaze_rust::error::Result<()> {
//! // Single-channel f32 image, values in [0, 1]
//! let image = Array2::<f32>::zeros((64, 64));
//!
//! let kaze = Kaze::new(KazeConfig::new(64, 64))?;
//! let (keypoints, descriptors) = kaze.detect_and_describe(image.view())?;
//!
//! assert!(keypoints.is_empty());
//! assert_eq!(descriptors.ncols(), 64);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod descriptor;
pub mod detector;
pub mod error;
pub mod imgproc;
pub mod profile;
pub mod scalespace;

pub mod prelude {
    //! Convenience module that re-exports commonly used items
    pub use crate::core::KeyPoint;
    pub use crate::error::{Error, Result};
    pub use crate::scalespace::{DescriptorKind, Diffusivity, KazeConfig};
    pub use crate::Kaze;
}

use std::sync::Arc;
use std::time::Instant;

use ndarray::{Array2, ArrayView2};

use crate::core::{Image, KeyPoint};
use crate::descriptor::compute_descriptors;
use crate::detector::{compute_detector_response, find_scale_space_extrema, subpixel_refinement};
use crate::error::{Error, Result};
use crate::profile::TimingSink;
use crate::scalespace::{KazeConfig, NonlinearScaleSpace};

/// The KAZE engine: a pure function of (image, options).
///
/// Construction validates the configuration; a detection call owns all of
/// its buffers, so concurrent calls on one instance never alias.
pub struct Kaze {
    config: KazeConfig,
    sink: Option<Arc<dyn TimingSink>>,
}

impl std::fmt::Debug for Kaze {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kaze")
            .field("config", &self.config)
            .field("sink", &self.sink.as_ref().map(|_| "<TimingSink>"))
            .finish()
    }
}

impl Kaze {
    /// Validate the configuration and build an engine for a fixed image
    /// shape.
    pub fn new(config: KazeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, sink: None })
    }

    /// Attach a sink receiving per-stage wall times.
    #[must_use]
    pub fn with_timing_sink(mut self, sink: Arc<dyn TimingSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn config(&self) -> &KazeConfig {
        &self.config
    }

    /// Detect keypoints. The output order is the deterministic
    /// (level, y, x) candidate order.
    pub fn detect(&self, image: ArrayView2<'_, f32>) -> Result<Vec<KeyPoint>> {
        match self.run_pipeline(image, false)? {
            Some((keypoints, _)) => Ok(keypoints),
            None => Ok(Vec::new()),
        }
    }

    /// Detect keypoints and compute one descriptor row per point.
    pub fn detect_and_describe(
        &self,
        image: ArrayView2<'_, f32>,
    ) -> Result<(Vec<KeyPoint>, Array2<f32>)> {
        let empty = || Array2::zeros((0, self.config.descriptor_len()));
        match self.run_pipeline(image, true)? {
            Some((keypoints, Some(descriptors))) => Ok((keypoints, descriptors)),
            Some((keypoints, None)) => Ok((keypoints, empty())),
            None => Ok((Vec::new(), empty())),
        }
    }

    /// Shared pipeline. Returns `None` for an empty input, which is not an
    /// error: empty in, empty out.
    #[allow(clippy::type_complexity)]
    fn run_pipeline(
        &self,
        image: ArrayView2<'_, f32>,
        with_descriptors: bool,
    ) -> Result<Option<(Vec<KeyPoint>, Option<Array2<f32>>)>> {
        let (height, width) = image.dim();
        if width == 0 || height == 0 {
            return Ok(None);
        }
        if width != self.config.image_width || height != self.config.image_height {
            return Err(Error::ImageShapeMismatch {
                expected_width: self.config.image_width,
                expected_height: self.config.image_height,
                actual_width: width,
                actual_height: height,
            });
        }

        let input = Image::from_view(image);

        let start = Instant::now();
        let mut space = NonlinearScaleSpace::build(&self.config, &input);
        self.emit("scale-space", start);

        let start = Instant::now();
        compute_detector_response(&mut space);
        self.emit("response", start);

        let start = Instant::now();
        let candidates = find_scale_space_extrema(&space, self.config.detector_threshold);
        self.emit("extrema", start);

        let start = Instant::now();
        let mut keypoints = subpixel_refinement(&space, &self.config, &candidates);
        self.emit("subpixel", start);

        let descriptors = if with_descriptors {
            let start = Instant::now();
            let descriptors = compute_descriptors(&space, &self.config, &mut keypoints);
            self.emit("descriptor", start);
            Some(descriptors)
        } else {
            None
        };

        Ok(Some((keypoints, descriptors)))
    }

    fn emit(&self, stage: &str, start: Instant) {
        let elapsed = start.elapsed();
        log::debug!("{stage}: {:.3} ms", elapsed.as_secs_f64() * 1e3);
        if let Some(sink) = &self.sink {
            sink.record(stage, elapsed);
        }
    }
}
