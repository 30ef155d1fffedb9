pub mod image;
pub mod keypoint;

pub use image::Image;
pub use keypoint::KeyPoint;
