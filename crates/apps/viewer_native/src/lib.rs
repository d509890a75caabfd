pub mod config;
pub mod host;
pub mod view;

pub use config::{ConfigError, GlobeConfig};
pub use host::{ImageFetcher, ImageLoadError};
pub use view::{CursorHint, GlobeEvent, GlobeView};
