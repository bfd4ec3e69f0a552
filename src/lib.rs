//! # ttd-admin
//!
//! Client for the OpenTTD admin port.
//!
//! The client authenticates over a persistent TCP connection, subscribes to
//! daily date notifications and issues RCON commands whenever the in-game
//! calendar crosses a day, month or year boundary.
//!
//! ## Layout
//! - [`core`]: packet framing and the payload cursor
//! - [`protocol`]: typed messages, calendar dates and the command scheduler
//! - [`service`]: the reconnecting [`AdminClient`]
//! - [`config`]: TOML/env configuration with validation
//! - [`utils`]: logging setup and metrics
//!
//! ## Quick start
//! ```no_run
//! use ttd_admin::config::AdminConfig;
//! use ttd_admin::AdminClient;
//!
//! fn main() -> ttd_admin::error::Result<()> {
//!     let config = AdminConfig::from_file("ttd-admin.toml")?;
//!     let client = AdminClient::from_config(&config)?;
//!     client.run_blocking()
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod utils;

pub use error::{ProtocolError, Result};
pub use service::client::AdminClient;
