pub mod config;
pub mod error;
pub mod types;

pub use config::{ConfigFile, Overrides, Settings, DEFAULT_API_URL};
pub use error::{Error, Result};
pub use types::*;
