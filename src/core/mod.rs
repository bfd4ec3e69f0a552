//! # Core Protocol Components
//!
//! Low-level packet handling: framing, the wire packet types and the payload cursor.
//!
//! ## Components
//! - **Packet**: admin packet type codes and the raw `(type, payload)` pair
//! - **Codec**: Tokio codec that frames admin packets over a byte stream
//! - **Reader**: bounds-checked cursor over a packet payload
//!
//! ## Wire Format
//! ```text
//! [Length(2, LE)] [Type(1)] [Payload(N)]      Length = 3 + N
//! ```
//!
//! ## Safety
//! - Length headers smaller than 3 are rejected instead of looping on the buffer
//! - Partial packets stay in the buffer until the declared length has arrived

pub mod codec;
pub mod packet;
pub mod reader;
