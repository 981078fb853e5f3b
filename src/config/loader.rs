// Configuration loader
// Loads settings from ~/.bugscribe/config.toml or environment variables

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::CONFIG_DIR_NAME;
use super::settings::Config;

const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
const MODEL_VAR: &str = "OPENROUTER_MODEL";
const BASE_URL_VAR: &str = "OPENROUTER_BASE_URL";

/// Load configuration from the config file or the environment
pub fn load_config() -> Result<Config> {
    let config_path = default_config_path();
    load_from_sources(config_path.as_deref(), |key| std::env::var(key).ok())
}

/// Resolve configuration from an optional TOML file, falling back to
/// variables looked up through `env`
pub fn load_from_sources<F>(config_path: Option<&Path>, env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = config_path.filter(|p| p.exists()) {
        let config = load_from_file(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        return Ok(config);
    }

    let api_key = env(API_KEY_VAR).filter(|v| !v.trim().is_empty());
    let model = env(MODEL_VAR).filter(|v| !v.trim().is_empty());

    match (api_key, model) {
        (Some(api_key), Some(model)) => {
            let mut config = Config::new(api_key, model);
            if let Some(base_url) = env(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
                config.base_url = base_url;
            }
            config.validate().context("Configuration validation failed")?;
            Ok(config)
        }
        _ => bail!(
            "No configuration found.\n\n\
            Create ~/{}/config.toml with:\n\
            \x20   api_key = \"sk-or-...\"\n\
            \x20   model = \"openai/gpt-4o-mini\"\n\n\
            or set the environment variables:\n\
            \x20   export {}=\"sk-or-...\"\n\
            \x20   export {}=\"openai/gpt-4o-mini\"",
            CONFIG_DIR_NAME,
            API_KEY_VAR,
            MODEL_VAR
        ),
    }
}

fn load_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse configuration file {}", path.display()))
}

/// Default location of the config file, if a home directory exists
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join("config.toml"))
}
