pub mod camera;
pub mod entity;
pub mod hover;
pub mod marker;
pub mod picking;
pub mod query;
pub mod record;
pub mod registry;

pub use entity::MarkerId;
pub use marker::{ImageRequest, Marker, MarkerAppearance, TextureHandle};
pub use record::{AnimalRecord, IucnStatus, Occurrence};
pub use registry::{MarkerDefaults, MarkerRegistry};
