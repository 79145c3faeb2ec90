//! Command handlers -- one module per subcommand

pub mod config;
pub mod report;

use std::path::Path;

use tracing::debug;

use depsight_core::config::DepsightConfig;

use crate::error::CliError;

/// Configuration file picked up when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "depsight.toml";

/// Load the effective configuration.
///
/// An explicit path must exist. Without one, `depsight.toml` in the working
/// directory is used when present, otherwise defaults plus env overrides.
pub async fn load_config(path: Option<&Path>) -> Result<DepsightConfig, CliError> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Path::new(DEFAULT_CONFIG_PATH),
        None => {
            debug!("no configuration file, using defaults");
            let mut config = DepsightConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }
    };

    Ok(DepsightConfig::load(path).await?)
}
