//! # Admin Protocol
//!
//! Typed messages on top of the framed packets, the in-game calendar, and the
//! scheduler that turns date notifications into RCON commands.
//!
//! ## Components
//! - **Message**: encode outgoing admin packets, decode incoming server packets
//! - **Date**: day counts from the server to calendar dates
//! - **Scheduler**: daily/monthly/yearly command templates

pub mod date;
pub mod message;
pub mod scheduler;
