//! Configuration system for edubridge.
//!
//! Provides TOML-based configuration with:
//! - `[server]`, `[session]`, `[timeline]` and `[portal]` sections
//! - Config file layering (user config dir + project-local overrides)
//! - Validation of values the server cannot run with

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, save_config,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
