//! Tendermint RPC response payloads, trimmed to the fields in use.

use serde::Deserialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("block timestamp {raw:?}: {source}")]
    Timestamp {
        raw: String,
        source: time::error::Parse,
    },
    #[error("block height {raw:?}: {source}")]
    Height {
        raw: String,
        source: std::num::ParseIntError,
    },
}

#[derive(Debug, Deserialize)]
pub struct BlockResponse {
    pub result: BlockResult,
}

#[derive(Debug, Deserialize)]
pub struct BlockResult {
    pub block: Block,
}

#[derive(Debug, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
}

#[derive(Debug, Deserialize)]
pub struct BlockHeader {
    /// RFC 3339 with nanoseconds, e.g. `2024-01-10T00:00:03.123456789Z`.
    pub time: String,
    pub height: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub result: StatusResult,
}

#[derive(Debug, Deserialize)]
pub struct StatusResult {
    pub sync_info: SyncInfo,
}

#[derive(Debug, Deserialize)]
pub struct SyncInfo {
    pub latest_block_height: String,
    pub latest_block_time: String,
}

/// Decode a `/block` response body down to the header timestamp.
pub fn parse_block_time(body: &[u8]) -> Result<OffsetDateTime, DecodeError> {
    let resp: BlockResponse = serde_json::from_slice(body)?;
    let raw = resp.result.block.header.time;
    OffsetDateTime::parse(&raw, &Rfc3339).map_err(|source| DecodeError::Timestamp { raw, source })
}

/// Decode a `/status` response body down to the latest block height.
pub fn parse_latest_height(body: &[u8]) -> Result<i64, DecodeError> {
    let resp: StatusResponse = serde_json::from_slice(body)?;
    let raw = resp.result.sync_info.latest_block_height;
    raw.parse::<i64>()
        .map_err(|source| DecodeError::Height { raw, source })
}
