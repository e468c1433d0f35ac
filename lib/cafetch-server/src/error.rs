//! Error types for the test server.

use derive_more::{Display, Error, From};

/// Errors raised while setting up or running the server.
#[derive(Debug, Display, Error, From)]
pub enum ServerError {
    /// Self-signed certificate generation failed.
    #[display("certificate generation failed: {_0}")]
    Certificate(rcgen::Error),

    /// The rustls server configuration was rejected.
    #[display("TLS configuration error: {_0}")]
    Tls(rustls::Error),

    /// Socket or file I/O failed.
    #[display("I/O error: {_0}")]
    Io(std::io::Error),

    /// A canned response uses a status code outside 100..=999.
    #[display("invalid status code {_0}")]
    #[from(skip)]
    InvalidStatus(#[error(not(source))] u16),
}

/// Result type alias using [`ServerError`].
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ServerError::InvalidStatus(42).to_string(),
            "invalid status code 42"
        );

        let err = ServerError::from(std::io::Error::other("address in use"));
        assert_eq!(err.to_string(), "I/O error: address in use");
    }
}
