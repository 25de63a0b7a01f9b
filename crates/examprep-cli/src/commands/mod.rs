pub mod check;
pub mod init;
pub mod papers;
pub mod practice;
pub mod trigger;

use std::path::PathBuf;

use anyhow::Result;

use examprep_sources::config::load_config_from;
use examprep_sources::ExamprepConfig;

/// Load the config, forcing the remote tier off when `offline` is set.
pub fn load_config(path: Option<PathBuf>, offline: bool) -> Result<ExamprepConfig> {
    let mut config = load_config_from(path.as_deref())?;
    if offline {
        config.remote.enabled = false;
    }
    Ok(config)
}
