//! CLI command handlers.

pub mod config;
pub mod start;

use std::path::PathBuf;

use anyhow::Result;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, bypassing discovery.
    pub config_path: Option<PathBuf>,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Load the effective configuration for this invocation.
    ///
    /// An explicit `--config` file is used on its own; otherwise the user
    /// and project layers are discovered and merged.
    pub fn load_config(&self) -> Result<edubridge_config::LoadedConfig> {
        let Some(ref path) = self.config_path else {
            return Ok(edubridge_config::load_config(None)?);
        };

        let config = edubridge_config::load_config_file(path)?;
        config.validate()?;
        Ok(edubridge_config::LoadedConfig {
            config,
            sources: vec![edubridge_config::discovery::ConfigSource {
                path: path.clone(),
                loaded: true,
            }],
            warnings: Vec::new(),
        })
    }
}
