pub mod extrema;
pub mod refine;
pub mod response;

pub use extrema::{find_scale_space_extrema, Candidate};
pub use refine::subpixel_refinement;
pub use response::compute_detector_response;
