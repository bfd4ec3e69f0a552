//! # Error Types
//!
//! Error handling for the admin-port client.
//!
//! This module defines all error variants that can occur while talking to the
//! server, from low-level I/O errors to malformed packets and configuration mistakes.
//!
//! ## Error Categories
//! - **I/O Errors**: connect and read failures, always answered with a reconnect
//! - **Framing Errors**: undersized or oversized length headers, fatal for the connection
//! - **Decode Errors**: truncated payloads, unterminated strings, impossible dates;
//!   only the offending packet is dropped
//! - **Configuration Errors**: unknown schedule periods, missing password; reported
//!   before the connection loop starts
//!
//! ## Example Usage
//! ```rust
//! use ttd_admin::error::{ProtocolError, Result};
//! use ttd_admin::protocol::scheduler::Period;
//! use tracing::error;
//!
//! fn parse(name: &str) -> Result<Period> {
//!     name.parse::<Period>()
//! }
//!
//! match parse("weekly") {
//!     Ok(period) => println!("{period}"),
//!     Err(e @ ProtocolError::UnknownPeriod(_)) => error!(error = %e, "bad schedule"),
//!     Err(e) => error!(error = %e, "unexpected"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Configuration errors
    pub const ERR_MISSING_PASSWORD: &str = "You must supply a password";
    pub const ERR_EMPTY_HOSTNAME: &str = "Hostname cannot be empty";
    pub const ERR_INVALID_PORT: &str = "Port must be greater than 0";

    /// Connection errors
    pub const ERR_CONNECTION_CLOSED: &str = "Connection closed by server";
    pub const ERR_READER_GONE: &str = "Reader task ended without reporting a reason";
}

// ProtocolError is the primary error type for all client operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Server is shutting down")]
    ServerShutdown,

    #[error("Undersized packet header: declared length {0}")]
    UndersizedPacket(u16),

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Truncated payload: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("Day count {0} is outside the representable calendar")]
    InvalidDate(u32),

    #[error("Unknown schedule period: {0}")]
    UnknownPeriod(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    /// Whether this error invalidates the whole connection rather than a single packet.
    pub fn is_connection_fault(&self) -> bool {
        matches!(
            self,
            ProtocolError::Io(_)
                | ProtocolError::ConnectionClosed
                | ProtocolError::ServerShutdown
                | ProtocolError::UndersizedPacket(_)
                | ProtocolError::OversizedPacket(_)
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
