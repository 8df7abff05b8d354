//! Retrying HTTP GET client bound to one chain RPC endpoint.

use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Total attempts per query before the last error is surfaced.
const QUERY_ATTEMPTS: u32 = 5;
const RETRY_SLEEP: Duration = Duration::from_secs(1);

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid rpc url {url:?}: {source}")]
    BadUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("build client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request {url}: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },
    #[error("read body from {url}: {source}")]
    Body {
        url: String,
        source: reqwest::Error,
    },
}

/// HTTP GET client for one node's RPC base URL. Carries the per-call
/// deadline; retries transport and body-read failures with a fixed backoff.
/// Never caches.
pub struct RpcClient {
    client: reqwest::Client,
    base_url: String,
}

impl RpcClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        url::Url::parse(base_url).map_err(|source| TransportError::BadUrl {
            url: base_url.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` with `params` appended as a query string, returning the raw
    /// response body. Each attempt carries the client's deadline.
    pub async fn query(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<u8>, TransportError> {
        let url = self.build_url(path, params);
        let mut last_err = None;
        for attempt in 0..QUERY_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_SLEEP).await;
            }
            match self.client.get(&url).send().await {
                Ok(res) => match res.bytes().await {
                    Ok(body) => return Ok(body.to_vec()),
                    Err(source) => {
                        warn!(%url, attempt, "body read failed: {source}");
                        last_err = Some(TransportError::Body {
                            url: url.clone(),
                            source,
                        });
                    }
                },
                Err(source) => {
                    warn!(%url, attempt, "request failed: {source}");
                    last_err = Some(TransportError::Request {
                        url: url.clone(),
                        source,
                    });
                }
            }
        }
        Err(last_err.unwrap_or(TransportError::BadUrl {
            url,
            source: url::ParseError::EmptyHost,
        }))
    }

    fn build_url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        let mut sep = if url.contains('?') { '&' } else { '?' };
        for (key, value) in params {
            url.push(sep);
            url.push_str(key);
            url.push('=');
            url.push_str(value);
            sep = '&';
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RpcClient {
        RpcClient::new(base, Duration::from_secs(3)).unwrap()
    }

    #[test]
    fn build_url_no_params() {
        let c = client("http://localhost:26657");
        assert_eq!(c.build_url("/status", &[]), "http://localhost:26657/status");
    }

    #[test]
    fn build_url_appends_query_string() {
        let c = client("http://localhost:26657/");
        assert_eq!(
            c.build_url("/block", &[("height", "990".to_string())]),
            "http://localhost:26657/block?height=990"
        );
    }

    #[test]
    fn build_url_merges_existing_query() {
        let c = client("http://node.example.com/rpc?apikey=k");
        assert_eq!(
            c.build_url("", &[("height", "5".to_string())]),
            "http://node.example.com/rpc?apikey=k&height=5"
        );
    }

    #[test]
    fn build_url_multiple_params_in_order() {
        let c = client("http://localhost:26657");
        let url = c.build_url(
            "/abci_query",
            &[
                ("path", "p".to_string()),
                ("height", "7".to_string()),
                ("prove", "false".to_string()),
            ],
        );
        assert_eq!(
            url,
            "http://localhost:26657/abci_query?path=p&height=7&prove=false"
        );
    }

    #[test]
    fn rejects_malformed_base_url() {
        assert!(RpcClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}
