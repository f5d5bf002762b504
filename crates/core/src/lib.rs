pub mod config;
pub mod error;
pub mod platform;
pub mod telemetry;

pub use crate::config::{EnvVars, ScanConfig, Settings};
pub use crate::error::{ConfigError, ConfigResult};
pub use crate::platform::Platform;
pub use crate::telemetry::init_tracing;

pub type Result<T> = color_eyre::Result<T>;
