//! Concurrent fan-out over the balance source registry.

use crate::balance::query::BalanceError;
use crate::balance::source::BalanceSource;
use crate::chain::ChainEndpoint;
use crate::coin::Coins;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::warn;

/// Per-source coin lists for one (chain, address, height) triple. Built
/// fresh per request and never cached.
pub type AggregateResult = BTreeMap<BalanceSource, Coins>;

/// Fan a balance request out to every source in `sources` and join on all of
/// them before returning.
///
/// Each source runs as its own task; a failing source is logged and maps to
/// an empty coin list without disturbing its siblings. The returned map
/// always carries every key in `sources`.
pub async fn aggregate_balances<Q, F>(sources: &[BalanceSource], query: Q) -> AggregateResult
where
    Q: Fn(BalanceSource) -> F,
    F: Future<Output = Result<Coins, BalanceError>> + Send + 'static,
{
    let result = Arc::new(Mutex::new(AggregateResult::new()));
    let mut tasks = JoinSet::new();

    for &source in sources {
        let fut = query(source);
        let result = Arc::clone(&result);
        tasks.spawn(async move {
            let coins = match fut.await {
                Ok(coins) => coins,
                Err(err) => {
                    warn!(source = %source, "balance query failed: {err}");
                    Coins::new()
                }
            };
            let mut map = result.lock().unwrap();
            map.insert(source, coins);
        });
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            warn!("balance task died: {err}");
        }
    }

    let mut map = match Arc::try_unwrap(result) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
        Err(arc) => arc.lock().unwrap().clone(),
    };
    // A task that died before writing still owes its key an empty entry.
    for &source in sources {
        map.entry(source).or_default();
    }
    map
}

/// Aggregate over the default registry against a configured endpoint.
/// `height == 0` queries the current head.
pub async fn aggregate_for_endpoint(
    endpoint: &ChainEndpoint,
    address: &str,
    height: i64,
) -> AggregateResult {
    aggregate_balances(&BalanceSource::REGISTERED, |source| {
        let endpoint = endpoint.clone();
        let address = address.to_string();
        async move { source.query(&endpoint, &address, height).await }
    })
    .await
}
