//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
///
/// `config_path` is the `--config` override, if one was given.
pub fn run_config(action: &ConfigAction, config_path: Option<&str>, settings: Settings) -> Result<()> {
    let path = config_path
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Init { force } => {
            init_config(&path, &settings, *force)?;
            Output::success(&format!("Wrote config to {}", path.display()));
        }

        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn init_config(path: &PathBuf, settings: &Settings, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite it.", path.display());
    }
    settings.save_to(path)?;
    Ok(())
}
