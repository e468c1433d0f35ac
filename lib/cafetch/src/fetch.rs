//! The fetch flow: load the CA file, build the client, GET, report.

use std::io::Write;

use bytes::Bytes;
use cafetch_core::{Error, Response, Result, TrustStore};
use tracing::{info, instrument, warn};

use crate::{FetchClient, FetchConfig};

/// Load the trust store, issue the request and buffer the response.
///
/// Stops at the first failing step; nothing is retried.
#[instrument(
    skip_all,
    fields(url = %config.target_url, ca_cert = %config.ca_cert_path.display())
)]
pub async fn fetch(config: &FetchConfig) -> Result<Response<Bytes>> {
    let trust = TrustStore::load(&config.ca_cert_path)?;

    if trust.is_empty() {
        if config.require_roots {
            return Err(Error::EmptyTrustStore {
                path: config.ca_cert_path.clone(),
                ignored: trust.ignored(),
            });
        }
        warn!(
            ignored = trust.ignored(),
            "no certificate loaded, every server certificate will be rejected"
        );
    } else {
        info!(roots = trust.len(), ignored = trust.ignored(), "loaded trust store");
    }

    let client = FetchClient::new(trust, config)?;
    client.get(&config.target_url).await
}

/// Run [`fetch`] to completion on the calling thread.
///
/// A single-threaded runtime is created for the call and dropped with it.
pub fn fetch_blocking(config: &FetchConfig) -> Result<Response<Bytes>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;

    runtime.block_on(fetch(config))
}

/// Fetch and write the outcome to `out`.
///
/// On success writes `Response body: <body>`; on failure writes one labeled
/// diagnostic line and returns the error so the caller can pick an exit
/// status.
///
/// # Example
///
/// ```ignore
/// let config = FetchConfig::default();
/// let mut stdout = std::io::stdout().lock();
/// if let Err(err) = cafetch::run(&config, &mut stdout) {
///     std::process::exit(err.kind().exit_code().into());
/// }
/// ```
pub fn run<W: Write>(config: &FetchConfig, out: &mut W) -> Result<()> {
    match fetch_blocking(config) {
        Ok(response) => report(out, response.body()).map_err(Error::Output),
        Err(err) => {
            writeln!(out, "{}", err.diagnostic()).map_err(Error::Output)?;
            out.flush().map_err(Error::Output)?;
            Err(err)
        }
    }
}

fn report<W: Write>(out: &mut W, body: &[u8]) -> std::io::Result<()> {
    out.write_all(b"Response body: ")?;
    out.write_all(body)?;
    out.write_all(b"\n")?;
    out.flush()
}
