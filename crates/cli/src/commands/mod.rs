//! Command implementations.

mod check;
mod info;
mod run;
mod validate;

pub use check::run_check;
pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::NotifierBlueprint;

use crate::error::CliError;

/// Load and validate the configuration at `path`
fn load_blueprint(path: &Path) -> Result<NotifierBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
