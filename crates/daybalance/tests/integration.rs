//! Integration tests over saved node response fixtures.

use daybalance::balance::{
    parse_bank_balances, parse_commission, parse_delegations, parse_rewards, parse_unbonding,
    parse_vesting,
};
use daybalance::chain::{parse_block_time, parse_latest_height};
use daybalance::Coin;
use std::path::Path;
use time::macros::datetime;

fn load_fixture(name: &str) -> Vec<u8> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../testdata");
    let full = root.join(name);
    std::fs::read(&full).unwrap_or_else(|e| panic!("read {}: {}", full.display(), e))
}

#[test]
fn status_fixture_yields_head_height() {
    let height = parse_latest_height(&load_fixture("status.json")).unwrap();
    assert_eq!(height, 1000);
}

#[test]
fn block_fixture_yields_header_time() {
    let t = parse_block_time(&load_fixture("block.json")).unwrap();
    assert_eq!(t, datetime!(2024-01-09 23:59:12.345678901 UTC));
}

#[test]
fn bank_fixture_decodes_all_denoms() {
    let coins = parse_bank_balances(&load_fixture("bank_balances.json")).unwrap();
    assert_eq!(coins.len(), 2);
    assert_eq!(coins[0], Coin::new("uatom", 2_500_000));
    assert!(coins[1].denom.starts_with("ibc/"));
    assert_eq!(coins[1].amount, 150_000);
}

#[test]
fn delegations_fixture_decodes_one_coin_per_validator() {
    let coins = parse_delegations(&load_fixture("delegations.json")).unwrap();
    assert_eq!(
        coins,
        vec![Coin::new("uatom", 9_000_000), Coin::new("uatom", 1_000_000)]
    );
}

#[test]
fn unbonding_fixture_decodes_one_coin_per_entry() {
    let coins = parse_unbonding(&load_fixture("unbonding_delegations.json"), "uatom").unwrap();
    assert_eq!(
        coins,
        vec![Coin::new("uatom", 500_000), Coin::new("uatom", 240_000)]
    );
}

#[test]
fn rewards_fixture_truncates_decimal_total() {
    let coins = parse_rewards(&load_fixture("rewards.json")).unwrap();
    assert_eq!(coins, vec![Coin::new("uatom", 152)]);
}

#[test]
fn commission_fixture_decodes() {
    let coins = parse_commission(&load_fixture("commission.json")).unwrap();
    assert_eq!(coins, vec![Coin::new("uatom", 4410)]);
}

#[test]
fn vesting_fixture_decodes_original_vesting() {
    let coins = parse_vesting(&load_fixture("vesting_account.json")).unwrap();
    assert_eq!(coins, vec![Coin::new("uatom", 10_000_000)]);
}
