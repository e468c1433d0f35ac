//! Self-signed server identity.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rcgen::CertifiedKey;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tracing::debug;

use crate::Result;

/// File name the certificate is written to.
pub const CERT_FILE: &str = "cert.pem";

/// File name the private key is written to.
pub const KEY_FILE: &str = "key.pem";

/// Self-signed certificate and its private key.
///
/// The certificate is its own issuer, so a client that loads
/// [`cert_pem`](Self::cert_pem) as its only root trusts this server.
#[derive(Clone)]
pub struct Identity {
    cert_pem: String,
    key_pem: String,
    cert_der: CertificateDer<'static>,
    key_der: Vec<u8>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("cert_pem", &self.cert_pem)
            .finish_non_exhaustive()
    }
}

impl Identity {
    /// Generate a self-signed identity valid for the given host names.
    pub fn generate<I, S>(hostnames: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = hostnames.into_iter().map(Into::into).collect();
        let CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(names.clone())?;
        debug!(?names, "generated self-signed certificate");

        Ok(Self {
            cert_pem: cert.pem(),
            key_pem: key_pair.serialize_pem(),
            cert_der: cert.der().clone(),
            key_der: key_pair.serialize_der(),
        })
    }

    /// Certificate, PEM encoded.
    #[must_use]
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// PKCS#8 private key, PEM encoded.
    #[must_use]
    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }

    /// Certificate, DER encoded.
    #[must_use]
    pub const fn cert_der(&self) -> &CertificateDer<'static> {
        &self.cert_der
    }

    /// Write `cert.pem` and `key.pem` into `dir`, returning their paths.
    pub fn write_pem(&self, dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
        let dir = dir.as_ref();
        let cert_path = dir.join(CERT_FILE);
        let key_path = dir.join(KEY_FILE);
        std::fs::write(&cert_path, &self.cert_pem)?;
        std::fs::write(&key_path, &self.key_pem)?;
        Ok((cert_path, key_path))
    }

    /// rustls server configuration presenting this identity.
    pub(crate) fn server_config(&self) -> Result<rustls::ServerConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key_der.clone()));

        let config = rustls::ServerConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(vec![self.cert_der.clone()], key)?;
        Ok(config)
    }
}
