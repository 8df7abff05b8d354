//! Response envelopes and rendering for balance query results.

use daybalance::{AggregateResult, BalanceSource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use time::Date;

/// The wire envelope every response travels in.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub error: String,
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    pub content: T,
}

/// Wrap a successful result.
pub fn success<T: Serialize>(content: T) -> Envelope<T> {
    Envelope {
        error: String::new(),
        is_success: true,
        content,
    }
}

/// Wrap a failure; content stays an empty object.
pub fn failure(error: impl std::fmt::Display) -> Envelope<serde_json::Value> {
    Envelope {
        error: error.to_string(),
        is_success: false,
        content: serde_json::Value::Object(serde_json::Map::new()),
    }
}

/// Per-source balances for one address at one point in time.
#[derive(Clone, Debug, Serialize)]
pub struct AddressBalances {
    pub address: String,
    pub balances: AggregateResult,
}

/// Day-keyed balances rendered with `YYYY-MM-DD` keys.
pub fn period_content(days: BTreeMap<Date, AggregateResult>) -> BTreeMap<String, AggregateResult> {
    days.into_iter()
        .map(|(day, balances)| (day.to_string(), balances))
        .collect()
}

/// Day-keyed heights rendered with `YYYY-MM-DD` keys.
pub fn heights_content(days: BTreeMap<Date, i64>) -> BTreeMap<String, i64> {
    days.into_iter()
        .map(|(day, height)| (day.to_string(), height))
        .collect()
}

/// Plain-text table of one aggregate result, one source per line.
pub fn render_table(address: &str, balances: &AggregateResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "address: {address}");
    for (source, coins) in balances {
        let rendered = if coins.is_empty() {
            "-".to_string()
        } else {
            coins
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "  {source}: {rendered}");
    }
    out
}

/// Plain-text table for a date range, one day block per resolved day.
pub fn render_period_table(
    address: &str,
    days: &BTreeMap<Date, AggregateResult>,
) -> String {
    let mut out = String::new();
    for (day, balances) in days {
        let _ = writeln!(out, "{day}");
        out.push_str(&render_table(address, balances));
    }
    out
}

/// An aggregate result with every registered source mapped to no coins.
pub fn empty_result() -> AggregateResult {
    BalanceSource::REGISTERED
        .iter()
        .map(|&source| (source, Vec::new()))
        .collect()
}
