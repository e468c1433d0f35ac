//! HTTPS client implementation using hyper-util.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use bytes::Bytes;
use cafetch_core::{Error, Response, Result, TrustStore};
use http::Uri;
use http_body_util::{BodyExt, Empty};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tracing::{debug, info};

use crate::{config::FetchConfig, connector::https_connector};

/// HTTPS client bound to one trust store.
///
/// Connections are not kept alive once a response has been read: the body
/// owns the connection and releases it when dropped.
///
/// # Example
///
/// ```ignore
/// use cafetch::{FetchClient, FetchConfig, TrustStore};
///
/// let config = FetchConfig::default();
/// let trust = TrustStore::load(&config.ca_cert_path)?;
/// let client = FetchClient::new(trust, &config)?;
/// let response = client.get(&config.target_url).await?;
/// ```
#[derive(Clone)]
pub struct FetchClient {
    inner: Client<HttpsConnector<HttpConnector>, Empty<Bytes>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client trusting exactly the roots of `trust`.
    pub fn new(trust: TrustStore, config: &FetchConfig) -> Result<Self> {
        let connector = https_connector(trust, config.connect_timeout)?;

        let inner = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Ok(Self {
            inner,
            timeout: config.timeout,
        })
    }

    /// Get the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Issue a GET request and buffer the whole response body.
    ///
    /// Failures before a response head arrives are request errors
    /// ([`Error::Connection`], [`Error::Tls`], [`Error::Timeout`]); failures
    /// while collecting the body are [`Error::Body`].
    pub async fn get(&self, url: &Uri) -> Result<Response<Bytes>> {
        if url.scheme_str() != Some("https") {
            return Err(Error::invalid_request(format!(
                "unsupported URL {url}, only https is allowed"
            )));
        }

        let request = http::Request::get(url.clone())
            .body(Empty::new())
            .map_err(|e| Error::invalid_request(e.to_string()))?;

        debug!(%url, "sending GET request");
        let pending = self.inner.request(request);
        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending)
                .await
                .map_err(|_| Error::Timeout(limit))?,
            None => pending.await,
        }
        .map_err(Self::map_hyper_error)?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());
        info!(status, "received response head");

        let collecting = response.into_body().collect();
        let collected = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, collecting)
                .await
                .map_err(|_| Error::body(format!("timed out after {limit:?}")))?,
            None => collecting.await,
        }
        .map_err(|e| Error::body(error_chain(&e)))?;
        let body = collected.to_bytes();
        debug!(bytes = body.len(), "read response body");

        Ok(Response::new(status, headers, body))
    }

    /// Extract response headers as a `HashMap`.
    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = error_chain(&err);

        if is_tls_failure(&err) {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string();
        if parts.last() != Some(&text) {
            parts.push(text);
        }
        current = e.source();
    }
    parts.join(": ")
}

/// A rustls error anywhere in the chain.
///
/// `io::Error::source` skips the error it wraps, so nested `io::Error`s are
/// unwrapped through `get_ref` instead.
fn is_tls_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<rustls::Error>() {
            return true;
        }
        current = match e.downcast_ref::<io::Error>() {
            Some(io_err) => io_err
                .get_ref()
                .map(|inner| inner as &(dyn StdError + 'static)),
            None => e.source(),
        };
    }
    false
}
