//! Configuration for pano-batch.
//!
//! One TOML file with `[tools]`, `[stitch]`, `[metadata]` and `[logging]`
//! tables. Every key has a default.
//!
//! ```no_run
//! use pano_core::config::ConfigManager;
//!
//! let mut config = ConfigManager::new("pano-batch.toml");
//! config.load().unwrap();
//! println!("Stitcher: {}", config.settings().tools.stitcher);
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{LoggingSettings, MetadataSettings, Settings, StitchSettings, ToolSettings};
