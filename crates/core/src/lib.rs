pub mod config;
pub mod error;

pub use config::{CacheConfig, Config};
pub use error::*;
