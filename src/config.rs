use std::{env, path::PathBuf};

use anyhow::Context;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MODEL_PATH: &str = "artifacts/model.json";
const DEFAULT_ENCODERS_PATH: &str = "artifacts/encoders.json";

/// The inference service settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
    pub encoders_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_path: DEFAULT_MODEL_PATH.into(),
            encoders_path: DEFAULT_ENCODERS_PATH.into(),
        }
    }
}

impl ServiceConfig {
    /// Reads `HOST`, `PORT`, `MODEL_PATH` and `ENCODERS_PATH`, falling back to the defaults for
    /// the unset ones.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    ///
    /// # Errors
    /// If `PORT` is set to something other than a port number.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT '{port}'"))?;
        }

        if let Some(path) = lookup("MODEL_PATH") {
            config.model_path = path.into();
        }

        if let Some(path) = lookup("ENCODERS_PATH") {
            config.encoders_path = path.into();
        }

        Ok(config)
    }

    /// Returns the `host:port` address to bind.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
