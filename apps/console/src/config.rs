use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::{
    dispatcher::DEFAULT_SIMULATOR_URL, grid::DEFAULT_GRID_SIZE, robots::DEFAULT_API_URL,
    SessionOptions,
};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "console.toml";
pub const MAX_GRID_SIZE: usize = 200;
const ENV_PREFIX: &str = "WAREHOUSE__";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub simulator_url: String,
    pub api_url: String,
    pub grid_size: usize,
    /// 0 disables the robot poller.
    pub poll_interval_ms: u64,
    pub log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulator_url: DEFAULT_SIMULATOR_URL.into(),
            api_url: DEFAULT_API_URL.into(),
            grid_size: DEFAULT_GRID_SIZE,
            poll_interval_ms: 1000,
            log: "info".into(),
        }
    }
}

impl Settings {
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            simulator_url: self.simulator_url.clone(),
            grid_size: self.grid_size,
        }
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval_ms > 0).then(|| Duration::from_millis(self.poll_interval_ms))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        check_url("simulator_url", &self.simulator_url, &["ws", "wss", "http", "https"])?;
        check_url("api_url", &self.api_url, &["http", "https"])?;
        if !(1..=MAX_GRID_SIZE).contains(&self.grid_size) {
            bail!(
                "grid_size must be between 1 and {MAX_GRID_SIZE}, got {}",
                self.grid_size
            );
        }
        Ok(())
    }
}

/// Defaults, then the TOML file, then `WAREHOUSE__*` variables. An explicit
/// path must exist; the default `console.toml` is optional.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let file = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };

    let mut settings = match file {
        Some(file) => read_settings_file(&file)?,
        None => Settings::default(),
    };
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn read_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file '{}'", path.display()))
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
    let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("SIMULATOR_URL") {
        settings.simulator_url = v;
    }
    if let Some(v) = var("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = var("GRID_SIZE") {
        settings.grid_size = v
            .parse()
            .with_context(|| format!("{ENV_PREFIX}GRID_SIZE is not a number: '{v}'"))?;
    }
    if let Some(v) = var("POLL_INTERVAL_MS") {
        settings.poll_interval_ms = v
            .parse()
            .with_context(|| format!("{ENV_PREFIX}POLL_INTERVAL_MS is not a number: '{v}'"))?;
    }
    if let Some(v) = var("LOG") {
        settings.log = v;
    }
    Ok(())
}

fn check_url(field: &str, raw: &str, schemes: &[&str]) -> anyhow::Result<()> {
    let url = Url::parse(raw).with_context(|| format!("{field} is not a valid url: '{raw}'"))?;
    if !schemes.contains(&url.scheme()) {
        bail!("{field} must use one of {schemes:?}, got '{}'", url.scheme());
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
