//! Per-source balance queries against a chain's REST query paths.
//!
//! Each source is an opaque `(endpoint, address, height) -> Coins` call. A
//! height of 0 means "current head" and omits the height filter entirely.

use crate::balance::source::BalanceSource;
use crate::chain::{ChainEndpoint, TransportError};
use crate::coin::{Coin, Coins};
use serde::Deserialize;
use thiserror::Error;

const BANK_BALANCES: &str = "/cosmos/bank/v1beta1/balances";
const STAKING_DELEGATIONS: &str = "/cosmos/staking/v1beta1/delegations";
const STAKING_DELEGATORS: &str = "/cosmos/staking/v1beta1/delegators";
const DISTRIBUTION_DELEGATORS: &str = "/cosmos/distribution/v1beta1/delegators";
const DISTRIBUTION_VALIDATORS: &str = "/cosmos/distribution/v1beta1/validators";
const AUTH_ACCOUNTS: &str = "/cosmos/auth/v1beta1/accounts";

#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),
    #[error("decode {tag} response: {source}")]
    Decode {
        tag: &'static str,
        source: serde_json::Error,
    },
    #[error("bad amount {amount:?} in {tag} response")]
    Amount { tag: &'static str, amount: String },
    #[error("chain {chain}: stakingTokenDenom must be set for unbonding queries")]
    MissingStakingDenom { chain: String },
}

impl BalanceSource {
    /// Query this source for one (chain, address, height) triple.
    pub async fn query(
        self,
        endpoint: &ChainEndpoint,
        address: &str,
        height: i64,
    ) -> Result<Coins, BalanceError> {
        match self {
            BalanceSource::BankBalance => query_bank_balances(endpoint, address, height).await,
            BalanceSource::StakingDelegation => query_delegations(endpoint, address, height).await,
            BalanceSource::StakingUnbonding => query_unbonding(endpoint, address, height).await,
            BalanceSource::DistributionReward => query_rewards(endpoint, address, height).await,
            BalanceSource::DistributionCommission => {
                query_commission(endpoint, address, height).await
            }
            BalanceSource::AuthVesting => query_vesting(endpoint, address, height).await,
        }
    }
}

fn height_params(height: i64) -> Vec<(&'static str, String)> {
    if height == 0 {
        Vec::new()
    } else {
        vec![("height", height.to_string())]
    }
}

fn decode<T: for<'de> Deserialize<'de>>(
    tag: &'static str,
    body: &[u8],
) -> Result<T, BalanceError> {
    serde_json::from_slice(body).map_err(|source| BalanceError::Decode { tag, source })
}

/// Parse a chain amount string; decimal amounts truncate at the point.
fn parse_amount(tag: &'static str, raw: &str) -> Result<u128, BalanceError> {
    let integral = raw.split('.').next().unwrap_or(raw);
    integral.parse::<u128>().map_err(|_| BalanceError::Amount {
        tag,
        amount: raw.to_string(),
    })
}

#[derive(Debug, Deserialize)]
struct CoinDto {
    denom: String,
    amount: String,
}

impl CoinDto {
    fn into_coin(self, tag: &'static str) -> Result<Coin, BalanceError> {
        let amount = parse_amount(tag, &self.amount)?;
        Ok(Coin {
            denom: self.denom,
            amount,
        })
    }
}

fn into_coins(tag: &'static str, dtos: Vec<CoinDto>) -> Result<Coins, BalanceError> {
    dtos.into_iter().map(|d| d.into_coin(tag)).collect()
}

// TODO: follow pagination.next_key once an address holds more entries than
// the node's default page size.

#[derive(Debug, Deserialize)]
struct AllBalancesResponse {
    #[serde(default)]
    balances: Vec<CoinDto>,
}

pub fn parse_bank_balances(body: &[u8]) -> Result<Coins, BalanceError> {
    let tag = BalanceSource::BankBalance.tag();
    let resp: AllBalancesResponse = decode(tag, body)?;
    into_coins(tag, resp.balances)
}

async fn query_bank_balances(
    endpoint: &ChainEndpoint,
    address: &str,
    height: i64,
) -> Result<Coins, BalanceError> {
    let path = format!("{}/{}", BANK_BALANCES, urlencoding::encode(address));
    let body = endpoint.query(&path, &height_params(height)).await?;
    parse_bank_balances(&body)
}

#[derive(Debug, Deserialize)]
struct DelegationsResponse {
    #[serde(default)]
    delegation_responses: Vec<DelegationResponse>,
}

#[derive(Debug, Deserialize)]
struct DelegationResponse {
    balance: CoinDto,
}

pub fn parse_delegations(body: &[u8]) -> Result<Coins, BalanceError> {
    let tag = BalanceSource::StakingDelegation.tag();
    let resp: DelegationsResponse = decode(tag, body)?;
    resp.delegation_responses
        .into_iter()
        .map(|d| d.balance.into_coin(tag))
        .collect()
}

async fn query_delegations(
    endpoint: &ChainEndpoint,
    address: &str,
    height: i64,
) -> Result<Coins, BalanceError> {
    let path = format!("{}/{}", STAKING_DELEGATIONS, urlencoding::encode(address));
    let body = endpoint.query(&path, &height_params(height)).await?;
    parse_delegations(&body)
}

#[derive(Debug, Deserialize)]
struct UnbondingResponse {
    #[serde(default)]
    unbonding_responses: Vec<UnbondingDelegation>,
}

#[derive(Debug, Deserialize)]
struct UnbondingDelegation {
    #[serde(default)]
    entries: Vec<UnbondingEntry>,
}

#[derive(Debug, Deserialize)]
struct UnbondingEntry {
    balance: String,
}

/// Unbonding entries carry no denom on the wire; the chain's staking denom
/// fills it in.
pub fn parse_unbonding(body: &[u8], staking_denom: &str) -> Result<Coins, BalanceError> {
    let tag = BalanceSource::StakingUnbonding.tag();
    let resp: UnbondingResponse = decode(tag, body)?;
    let mut coins = Coins::new();
    for unbonding in resp.unbonding_responses {
        for entry in unbonding.entries {
            coins.push(Coin {
                denom: staking_denom.to_string(),
                amount: parse_amount(tag, &entry.balance)?,
            });
        }
    }
    Ok(coins)
}

async fn query_unbonding(
    endpoint: &ChainEndpoint,
    address: &str,
    height: i64,
) -> Result<Coins, BalanceError> {
    let denom = endpoint
        .staking_denom()
        .ok_or_else(|| BalanceError::MissingStakingDenom {
            chain: endpoint.name().to_string(),
        })?
        .to_string();
    let path = format!(
        "{}/{}/unbonding_delegations",
        STAKING_DELEGATORS,
        urlencoding::encode(address)
    );
    let body = endpoint.query(&path, &height_params(height)).await?;
    parse_unbonding(&body, &denom)
}

#[derive(Debug, Deserialize)]
struct RewardsResponse {
    #[serde(default)]
    total: Vec<CoinDto>,
}

pub fn parse_rewards(body: &[u8]) -> Result<Coins, BalanceError> {
    let tag = BalanceSource::DistributionReward.tag();
    let resp: RewardsResponse = decode(tag, body)?;
    into_coins(tag, resp.total)
}

async fn query_rewards(
    endpoint: &ChainEndpoint,
    address: &str,
    height: i64,
) -> Result<Coins, BalanceError> {
    let path = format!(
        "{}/{}/rewards",
        DISTRIBUTION_DELEGATORS,
        urlencoding::encode(address)
    );
    let body = endpoint.query(&path, &height_params(height)).await?;
    parse_rewards(&body)
}

#[derive(Debug, Deserialize)]
struct CommissionResponse {
    commission: CommissionInner,
}

#[derive(Debug, Deserialize)]
struct CommissionInner {
    #[serde(default)]
    commission: Vec<CoinDto>,
}

pub fn parse_commission(body: &[u8]) -> Result<Coins, BalanceError> {
    let tag = BalanceSource::DistributionCommission.tag();
    let resp: CommissionResponse = decode(tag, body)?;
    into_coins(tag, resp.commission.commission)
}

/// `address` here is a validator operator address.
async fn query_commission(
    endpoint: &ChainEndpoint,
    address: &str,
    height: i64,
) -> Result<Coins, BalanceError> {
    let path = format!(
        "{}/{}/commission",
        DISTRIBUTION_VALIDATORS,
        urlencoding::encode(address)
    );
    let body = endpoint.query(&path, &height_params(height)).await?;
    parse_commission(&body)
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    account: AccountDto,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    #[serde(default)]
    base_vesting_account: Option<BaseVestingAccount>,
}

#[derive(Debug, Deserialize)]
struct BaseVestingAccount {
    #[serde(default)]
    original_vesting: Vec<CoinDto>,
}

/// Non-vesting accounts yield an empty list, not an error.
pub fn parse_vesting(body: &[u8]) -> Result<Coins, BalanceError> {
    let tag = BalanceSource::AuthVesting.tag();
    let resp: AccountResponse = decode(tag, body)?;
    match resp.account.base_vesting_account {
        Some(base) => into_coins(tag, base.original_vesting),
        None => Ok(Coins::new()),
    }
}

async fn query_vesting(
    endpoint: &ChainEndpoint,
    address: &str,
    height: i64,
) -> Result<Coins, BalanceError> {
    let path = format!("{}/{}", AUTH_ACCOUNTS, urlencoding::encode(address));
    let body = endpoint.query(&path, &height_params(height)).await?;
    parse_vesting(&body)
}
