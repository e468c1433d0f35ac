//! Core types for cafetch.
//!
//! This crate provides the foundational types used by cafetch:
//! - [`TrustStore`] - Root certificates loaded from a PEM file
//! - [`Response`] - Buffered HTTP response
//! - [`Error`], [`ErrorKind`] and [`Result`] - Error handling

mod error;
mod response;
mod trust;

pub use error::{Error, ErrorKind, Result};
pub use response::Response;
pub use trust::TrustStore;
