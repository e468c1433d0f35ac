//! Self-signed TLS test server for cafetch.
//!
//! Generates a certificate with [`rcgen`], accepts TLS connections with
//! [`tokio_rustls`], and answers each one with a canned HTTP/1.0 response
//! before closing it.
//!
//! # Example
//!
//! ```ignore
//! use cafetch_server::{CannedResponse, ServerConfig, TlsServer};
//!
//! let config = ServerConfig::default().with_response(CannedResponse::new(200, "pong"));
//! let server = TlsServer::start(config).await?;
//! server.identity().write_pem(".")?;
//! ```

mod error;
mod identity;
mod server;

pub use error::{Result, ServerError};
pub use identity::{CERT_FILE, Identity, KEY_FILE};
pub use server::{CannedResponse, ServerConfig, TlsServer};
