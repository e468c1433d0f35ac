//! Error types for cafetch.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use derive_more::{Display, Error};

// ============================================================================
// Error Kind
// ============================================================================

/// Coarse classification of an [`Error`], one per step of the fetch flow.
///
/// Each kind carries the label printed in front of the diagnostic and the
/// process exit code the `cafetch` binary reports for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ErrorKind {
    /// The CA certificate file could not be read.
    #[display("file read error")]
    FileRead,
    /// The CA file held no usable certificate and roots were required.
    #[display("empty trust store")]
    EmptyTrustStore,
    /// The request failed before a response was received.
    #[display("request error")]
    Request,
    /// The response body could not be read.
    #[display("body read error")]
    BodyRead,
    /// Failure outside the fetch steps (runtime, output sink).
    #[display("internal error")]
    Internal,
}

impl ErrorKind {
    /// Label printed in front of the diagnostic message.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FileRead => "Error reading CA certificate:",
            Self::EmptyTrustStore => "Error loading CA certificate:",
            Self::Request => "Error making HTTPS request:",
            Self::BodyRead => "Error reading response body:",
            Self::Internal => "Error:",
        }
    }

    /// Process exit code for this kind of failure.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Internal => 1,
            Self::FileRead => 2,
            Self::EmptyTrustStore => 3,
            Self::Request => 4,
            Self::BodyRead => 5,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for cafetch operations.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// The CA certificate file could not be read.
    #[display("open {}: {source}", path.display())]
    ReadCaCert {
        /// Path of the CA certificate file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// No certificate could be loaded from the CA file.
    #[display("no valid certificate found in {} ({ignored} ignored)", path.display())]
    EmptyTrustStore {
        /// Path of the CA certificate file.
        path: PathBuf,
        /// Number of certificate blocks that failed to parse.
        ignored: usize,
    },

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    InvalidRequest(#[error(not(source))] String),

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    Connection(#[error(not(source))] String),

    /// TLS handshake or certificate verification errors.
    #[display("TLS error: {_0}")]
    Tls(#[error(not(source))] String),

    /// No response before the configured deadline.
    #[display("request timed out after {_0:?}")]
    Timeout(#[error(not(source))] Duration),

    /// Failure while reading the response body.
    #[display("body error: {_0}")]
    Body(#[error(not(source))] String),

    /// The async runtime could not be started.
    #[display("runtime error: {_0}")]
    Runtime(io::Error),

    /// The report could not be written.
    #[display("output error: {_0}")]
    Output(io::Error),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a CA certificate read error.
    #[must_use]
    pub fn read_ca_cert(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadCaCert {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create a body read error.
    #[must_use]
    pub fn body(message: impl Into<String>) -> Self {
        Self::Body(message.into())
    }

    /// The step of the flow this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ReadCaCert { .. } => ErrorKind::FileRead,
            Self::EmptyTrustStore { .. } => ErrorKind::EmptyTrustStore,
            Self::InvalidRequest(_) | Self::Connection(_) | Self::Tls(_) | Self::Timeout(_) => {
                ErrorKind::Request
            }
            Self::Body(_) => ErrorKind::BodyRead,
            Self::Runtime(_) | Self::Output(_) => ErrorKind::Internal,
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if this is a TLS error.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// The one-line diagnostic printed for this error.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        format!("{} {self}", self.kind().label())
    }
}
