/// A scale space feature point.
///
/// Positions are subpixel image coordinates at full resolution (the
/// nonlinear scale space is never downsampled). `sigma` is the detection
/// scale after subpixel refinement, `angle` the dominant orientation in
/// radians in `[0, 2pi)`. The angle stays `0.0` until orientation
/// estimation runs during description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    pub x: f32,
    pub y: f32,
    pub sigma: f32,
    pub response: f32,
    pub octave: i32,
    pub sublevel: f32,
    pub angle: f32,
    /// Index of the evolution level the point was detected at.
    pub class_id: i32,
}

impl KeyPoint {
    #[must_use]
    pub fn new(x: f32, y: f32, sigma: f32) -> Self {
        Self {
            x,
            y,
            sigma,
            response: 0.0,
            octave: 0,
            sublevel: 0.0,
            angle: 0.0,
            class_id: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let kp = KeyPoint::new(10.5, 20.25, 1.6);

        assert_eq!(kp.x, 10.5);
        assert_eq!(kp.y, 20.25);
        assert_eq!(kp.sigma, 1.6);
        assert_eq!(kp.angle, 0.0);
        assert_eq!(kp.octave, 0);
        assert_eq!(kp.class_id, 0);
    }
}
