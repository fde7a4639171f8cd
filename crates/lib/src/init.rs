//! Initialize the configuration directory: create `~/.wajba` and seed a
//! default `config.json` listing every available key.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Create the config directory and a default config file if they do not exist.
/// The seeded file is the serialized default [`Config`], so every key is
/// visible and editable without consulting the docs.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        let default_config = serde_json::to_string_pretty(&Config::default())
            .context("serializing default config")?;
        std::fs::write(config_path, default_config)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_seeds_parseable_default_config() {
        let dir = std::env::temp_dir().join(format!("wajba-init-test-{}", uuid::Uuid::new_v4()));
        let config_path = dir.join("config.json");
        init_config_dir(&config_path).expect("init");
        let s = std::fs::read_to_string(&config_path).expect("read seeded config");
        let config: Config = serde_json::from_str(&s).expect("parse seeded config");
        assert_eq!(config.server.port, 8080);
        // Second run is a no-op.
        init_config_dir(&config_path).expect("re-init");
    }
}
