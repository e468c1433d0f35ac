//! Trust store built from PEM-encoded CA certificates.
//!
//! [`TrustStore`] is the only source of root authorities for the client: no
//! platform or bundled roots are ever mixed in.

use std::path::Path;

use rustls::RootCertStore;
use rustls::pki_types::CertificateDer;
use rustls::pki_types::pem::PemObject;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Set of trusted root certificates.
#[derive(Debug, Clone)]
pub struct TrustStore {
    roots: RootCertStore,
    ignored: usize,
}

impl TrustStore {
    /// Create a trust store with no roots.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            roots: RootCertStore::empty(),
            ignored: 0,
        }
    }

    /// Build a trust store from PEM bytes.
    ///
    /// Every `CERTIFICATE` block is added; other block types are skipped.
    /// A malformed section does not stop parsing: the certificates after it
    /// are still read. Malformed sections and certificates whose DER cannot
    /// be parsed are counted in [`ignored`](Self::ignored).
    #[must_use]
    pub fn from_pem(pem: &[u8]) -> Self {
        let mut certs = Vec::new();
        let mut malformed = 0;
        // The slice iterator consumes input line by line, errors included.
        for item in CertificateDer::pem_slice_iter(pem) {
            match item {
                Ok(cert) => certs.push(cert),
                Err(err) => {
                    warn!(?err, "skipping malformed PEM section");
                    malformed += 1;
                }
            }
        }

        let mut roots = RootCertStore::empty();
        let (added, unparsable) = roots.add_parsable_certificates(certs);
        let ignored = malformed + unparsable;
        debug!(added, ignored, "built trust store");

        Self { roots, ignored }
    }

    /// Read a PEM file and build a trust store from its contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadCaCert`] if the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|source| Error::read_ca_cert(path, source))?;
        debug!(path = %path.display(), bytes = pem.len(), "read CA certificate file");
        Ok(Self::from_pem(&pem))
    }

    /// Number of trusted roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// No root was loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of malformed PEM sections and unparsable certificates skipped.
    #[must_use]
    pub const fn ignored(&self) -> usize {
        self.ignored
    }

    /// Consume into the rustls root store.
    #[must_use]
    pub fn into_root_store(self) -> RootCertStore {
        self.roots
    }
}
