use std::{env, path::Path};

use clap::{Arg, Command};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::Deserialize;

use super::{Config, ConfigRaw, defaults};
use crate::config::ConfigError;

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "INDEXER_";
const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Debug, Deserialize)]
struct EnvironmentConfig {
    environment: Option<String>,
}

/// Parse CLI arguments and load the layered configuration.
pub fn initialize_configuration() -> Result<Config, ConfigError> {
    let matches = Command::new("shielded-indexer")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file (.toml format)"),
        )
        .get_matches();

    let custom_config_path = matches.get_one::<String>("config").map(Path::new);
    load_configuration(custom_config_path)
}

/// Build configuration with layered sources (priority: lowest to highest):
/// environment defaults, `config.toml`, the custom file, `INDEXER_*` variables.
pub fn load_configuration(custom_config_path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = custom_config_path
        && !path.exists()
    {
        return Err(ConfigError::MissingConfig(path.display().to_string()));
    }

    let environment = resolve_environment(custom_config_path)?;
    let mut figment = Figment::from(Serialized::defaults(defaults::config_for(&environment)?));

    // User overrides from config.toml
    if Path::new(DEFAULT_CONFIG_FILE).exists() {
        figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
    }

    if let Some(config_path) = custom_config_path {
        figment = figment.merge(Toml::file(config_path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    let mut config: ConfigRaw = figment.extract().map_err(Box::new)?;
    if config.environment != environment {
        return Err(ConfigError::UnknownEnvironment(format!(
            "config environment '{}' does not match selected '{}'",
            config.environment, environment
        )));
    }

    if config.repository.password.is_none() {
        config.repository.password = env::var("DB_PASSWORD").ok();
    }

    config.resolve()
}

/// `INDEXER_ENVIRONMENT`, then the custom file, then `config.toml`, then development.
fn resolve_environment(custom_config_path: Option<&Path>) -> Result<String, ConfigError> {
    let env = env::var(format!("{ENV_PREFIX}ENVIRONMENT"))
        .ok()
        .or_else(|| custom_config_path.and_then(read_environment_from))
        .or_else(|| read_environment_from(Path::new(DEFAULT_CONFIG_FILE)))
        .map(normalize_env)
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

    if !matches!(env.as_str(), "development" | "production") {
        return Err(ConfigError::UnknownEnvironment(env));
    }

    Ok(env)
}

fn read_environment_from(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }

    Figment::from(Toml::file(path))
        .extract::<EnvironmentConfig>()
        .ok()
        .and_then(|config| config.environment)
}

fn normalize_env(env: String) -> String {
    env.trim().to_lowercase()
}
