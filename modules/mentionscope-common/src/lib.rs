pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, PermissionDenied, ValidationError};
pub use metrics::RollupMetrics;
pub use types::*;
