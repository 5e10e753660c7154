use std::path::Path;
use std::{env, fs};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub port: u16,
    pub limits: Limits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_upload_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: "http://localhost:8090".into(),
            port: 8090,
            limits: Limits::default(),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_upload_size: 1024 * 1024,
        }
    }
}

impl Config {
    /// Read the config file if present, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.unwrap_or_else(|| Path::new("config.toml"));

        let mut config = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&raw).context("failed to parse config")?
        } else {
            Config::default()
        };

        if let Ok(port) = env::var("BLINKBIN_PORT") {
            config.port = port.parse().context("invalid BLINKBIN_PORT")?;
        }
        if let Ok(base_url) = env::var("BLINKBIN_BASE_URL") {
            config.base_url = base_url;
        }

        Ok(config)
    }

    /// The shareable link for a paste id.
    pub fn paste_url(&self, id: &str) -> String {
        format!("{}/api/pastes/{id}", self.base_url.trim_end_matches('/'))
    }
}
