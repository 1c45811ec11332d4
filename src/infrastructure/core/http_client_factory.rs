use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;

/// Retries for one market-data fetch. Only transient failures (5xx,
/// timeouts, connection resets) are retried.
const MAX_RETRIES: u32 = 2;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Client for short request/response calls. `timeout` bounds every
    /// attempt and also caps the connect phase.
    pub fn create_client(timeout: Duration) -> Result<ClientWithMiddleware> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);

        let client = Client::builder()
            .pool_max_idle_per_host(2)
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

/// Encodes `key=value` pairs joined by `&`.
///
/// reqwest-middleware does not expose `.query()`, so callers append this to
/// the endpoint themselves.
pub fn query_string<K, V>(params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k.as_ref()), percent_encode(v.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
fn percent_encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_empty() {
        let params: [(&str, &str); 0] = [];
        assert_eq!(query_string(&params), "");
    }

    #[test]
    fn test_query_string_encodes_values() {
        assert_eq!(
            query_string(&[("symbol", "BTCUSDT"), ("timeZone", "+08:00")]),
            "symbol=BTCUSDT&timeZone=%2B08%3A00"
        );
        assert_eq!(query_string(&[("q", "a b/é")]), "q=a%20b%2F%C3%A9");
    }

    #[test]
    fn test_create_client_with_timeout() {
        assert!(HttpClientFactory::create_client(Duration::from_secs(3)).is_ok());
    }
}
