//! RPC transport and per-chain gateway for node status, block, and
//! balance-source queries.

mod endpoint;
mod transport;
pub(crate) mod types;

pub use endpoint::{BlockMeta, ChainEndpoint, ChainError, Endpoints, BLOCK_PATH, STATUS_PATH};
pub use transport::{RpcClient, TransportError};
pub use types::{parse_block_time, parse_latest_height, DecodeError};
