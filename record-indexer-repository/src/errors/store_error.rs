//! Document store error types.
//!
//! This module defines the errors that can occur while talking to the
//! document store. The variants separate failures that never reached the
//! store (transport, timeout) from failures the store reported itself.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Failed to build a client for the store.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request could not be sent or the response could not be read.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The store answered with a non-success status.
    #[error("[{status}] {kind}: {reason}")]
    Rejected {
        status: u16,
        kind: String,
        reason: String,
    },

    /// Failed to parse a response from the store.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize a document for the store.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to create an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a rejection error from a decoded store error.
    pub fn rejected(status: u16, kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }
}
