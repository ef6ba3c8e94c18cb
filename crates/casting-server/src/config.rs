use casting_core::AppConfig;
use std::{env, path::PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CASTING_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "casting.toml";

/// Load configuration.
///
/// Path precedence: `explicit`, then `CASTING_CONFIG`, then `casting.toml`.
/// A missing file yields defaults; environment overrides are applied on top.
pub fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let path = explicit
        .or_else(|| env::var(CONFIG_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut cfg = if path.exists() {
        tracing::info!(path = %path.display(), "loading configuration");
        AppConfig::from_file(&path)?
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        AppConfig::default()
    };

    cfg.apply_env_overrides(|key| env::var(key).ok());
    Ok(cfg)
}
