pub mod error;
pub mod logger;
pub mod mot;

pub use error::Error;
pub use logger::{setup_logger, Logger, LoggerConfig, LoggerRegistry, Severity, DEFAULT_ENVVAR};
pub use mot::{BBox, Detection, NpImage, Track, Vector};
