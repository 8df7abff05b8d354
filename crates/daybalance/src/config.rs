//! Startup configuration: the static per-chain endpoint table.
//!
//! Loaded once, validated eagerly, and turned into an [`Endpoints`] value
//! passed into whatever needs it. Nothing reads configuration ambiently.

use crate::chain::{ChainEndpoint, Endpoints, TransportError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("chain {chain}: rpcURL is required")]
    MissingRpcUrl { chain: String },
    #[error("chain {chain}: rpcURL must be formatted as http")]
    NotHttp { chain: String },
    #[error("chain {chain}: {source}")]
    Endpoint {
        chain: String,
        source: TransportError,
    },
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chains: HashMap<String, ChainConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChainConfig {
    #[serde(rename = "rpcURL", default)]
    pub rpc_url: String,
    /// Request timeout in seconds; defaults to [`DEFAULT_TIMEOUT_SECS`].
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(rename = "stakingTokenDenom", default)]
    pub staking_token_denom: Option<String>,
}

impl ChainConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, chain) in &self.chains {
            if chain.rpc_url.is_empty() {
                return Err(ConfigError::MissingRpcUrl {
                    chain: name.clone(),
                });
            }
            if !chain.rpc_url.starts_with("http") {
                return Err(ConfigError::NotHttp {
                    chain: name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Configured chain names, sorted for stable output.
    pub fn chain_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.chains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build the immutable endpoint table.
    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let mut table = Endpoints::default();
        for (name, chain) in &self.chains {
            let endpoint = ChainEndpoint::new(
                name.clone(),
                &chain.rpc_url,
                chain.timeout(),
                chain.staking_token_denom.clone(),
            )
            .map_err(|source| ConfigError::Endpoint {
                chain: name.clone(),
                source,
            })?;
            table.insert(endpoint);
        }
        Ok(table)
    }
}
