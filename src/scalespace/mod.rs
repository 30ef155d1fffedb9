pub mod aos;
pub mod config;
pub mod contrast;
pub mod diffusivity;
pub mod evolution;
pub mod schedule;

pub use config::{DescriptorKind, Diffusivity, KazeConfig};
pub use evolution::{EvolutionLevel, NonlinearScaleSpace};
pub use schedule::{schedule, LevelSchedule};
