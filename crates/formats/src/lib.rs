pub mod animals;
pub mod geojson;
pub mod loader;

pub use animals::*;
pub use geojson::*;
pub use loader::*;
