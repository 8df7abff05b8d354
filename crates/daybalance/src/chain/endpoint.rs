//! Per-chain endpoint handle and the name-keyed endpoint table.

use crate::chain::transport::{RpcClient, TransportError};
use crate::chain::types::{self, DecodeError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;

pub const BLOCK_PATH: &str = "/block";
pub const STATUS_PATH: &str = "/status";

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("unknown chain: {0}")]
    UnknownChain(String),
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("decode {path} response from chain {chain}: {source}")]
    Decode {
        chain: String,
        path: &'static str,
        source: DecodeError,
    },
}

/// One configured chain: immutable after startup, shared across requests.
#[derive(Clone)]
pub struct ChainEndpoint {
    name: String,
    staking_denom: Option<String>,
    client: Arc<RpcClient>,
}

impl ChainEndpoint {
    pub fn new(
        name: impl Into<String>,
        rpc_url: &str,
        timeout: Duration,
        staking_denom: Option<String>,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            name: name.into(),
            staking_denom,
            client: Arc::new(RpcClient::new(rpc_url, timeout)?),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Staking denom for unbonding entries, which carry no denom on the wire.
    pub fn staking_denom(&self) -> Option<&str> {
        self.staking_denom.as_deref()
    }

    pub async fn query(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, TransportError> {
        self.client.query(path, params).await
    }

    fn decode_err(&self, path: &'static str, source: DecodeError) -> ChainError {
        ChainError::Decode {
            chain: self.name.clone(),
            path,
            source,
        }
    }
}

/// Block metadata collaborator: the two primitives the node actually exposes.
/// Height estimation is built entirely on these.
#[async_trait]
pub trait BlockMeta: Send + Sync {
    /// Timestamp of the block at `height`.
    async fn block_time(&self, height: i64) -> Result<OffsetDateTime, ChainError>;
    /// Height of the current chain head.
    async fn latest_height(&self) -> Result<i64, ChainError>;
}

#[async_trait]
impl BlockMeta for ChainEndpoint {
    async fn block_time(&self, height: i64) -> Result<OffsetDateTime, ChainError> {
        let body = self
            .query(BLOCK_PATH, &[("height", height.to_string())])
            .await?;
        types::parse_block_time(&body).map_err(|e| self.decode_err(BLOCK_PATH, e))
    }

    async fn latest_height(&self) -> Result<i64, ChainError> {
        let body = self.query(STATUS_PATH, &[]).await?;
        types::parse_latest_height(&body).map_err(|e| self.decode_err(STATUS_PATH, e))
    }
}

/// Name-keyed table of configured endpoints. Read-only at request time.
#[derive(Clone, Default)]
pub struct Endpoints {
    chains: HashMap<String, ChainEndpoint>,
}

impl Endpoints {
    pub fn insert(&mut self, endpoint: ChainEndpoint) {
        self.chains.insert(endpoint.name().to_string(), endpoint);
    }

    /// Look up a chain by name. Absence is a caller error, not a crash.
    pub fn get(&self, name: &str) -> Result<&ChainEndpoint, ChainError> {
        self.chains
            .get(name)
            .ok_or_else(|| ChainError::UnknownChain(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.chains.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(name: &str) -> ChainEndpoint {
        ChainEndpoint::new(
            name,
            "http://localhost:26657",
            Duration::from_secs(3),
            None,
        )
        .unwrap()
    }

    #[test]
    fn lookup_unknown_chain_is_an_error() {
        let mut table = Endpoints::default();
        table.insert(endpoint("injective"));
        assert!(table.get("injective").is_ok());
        assert!(matches!(
            table.get("osmosis"),
            Err(ChainError::UnknownChain(name)) if name == "osmosis"
        ));
    }

    #[test]
    fn names_are_sorted() {
        let mut table = Endpoints::default();
        table.insert(endpoint("osmosis"));
        table.insert(endpoint("cosmoshub"));
        assert_eq!(table.names(), vec!["cosmoshub", "osmosis"]);
    }
}
