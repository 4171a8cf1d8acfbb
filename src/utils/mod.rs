pub mod error;
pub mod logger;

pub use error::{Result, ShareError};
pub use logger::setup_logging;
