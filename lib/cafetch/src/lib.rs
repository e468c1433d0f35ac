//! Fetch one HTTPS URL while trusting only the CA certificates of a PEM file.
//!
//! The flow is linear: read the CA file, build a trust store from it, build a
//! rustls-backed client that trusts nothing else, GET the target, buffer the
//! body, print it.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//!
//! use cafetch::FetchConfig;
//!
//! let config = FetchConfig::builder()
//!     .ca_cert_path("cert.pem")
//!     .timeout(Duration::from_secs(10))
//!     .build();
//!
//! let response = cafetch::fetch_blocking(&config)?;
//! println!("{}", response.text_lossy());
//! ```

mod client;
mod config;
mod connector;
mod fetch;

pub use client::FetchClient;
pub use config::{DEFAULT_CA_CERT_PATH, DEFAULT_TARGET_URL, FetchConfig, FetchConfigBuilder};
pub use connector::https_connector;
pub use fetch::{fetch, fetch_blocking, run};

// Re-export core types
pub use cafetch_core::{Error, ErrorKind, Response, Result, TrustStore};
