//! HTTPS connector using rustls.

use std::sync::Arc;
use std::time::Duration;

use cafetch_core::{Error, Result, TrustStore};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;

/// Create an HTTPS-only connector that trusts exactly the roots of `trust`.
///
/// No platform or bundled roots are added: a server certificate must chain
/// to one of the given certificates. Both HTTP/1.1 and HTTP/2 are offered
/// through ALPN.
pub fn https_connector(
    trust: TrustStore,
    connect_timeout: Option<Duration>,
) -> Result<HttpsConnector<HttpConnector>> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let tls_config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::tls(e.to_string()))?
        .with_root_certificates(trust.into_root_store())
        .with_no_client_auth();

    let mut http = HttpConnector::new();
    http.enforce_http(false);
    http.set_connect_timeout(connect_timeout);

    Ok(HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_only()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http))
}
