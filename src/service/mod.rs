//! # Client Service
//!
//! The long-running admin client: connection lifecycle, reconnect policy and
//! dispatch of scheduled commands.

pub mod client;

pub use client::{AdminClient, ConnectionPhase, DisconnectReason};
