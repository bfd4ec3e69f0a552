//! Typed admin protocol messages.
//!
//! [`AdminMessage`] covers what the client sends, [`ServerMessage`] what it
//! understands from the server. Server packets outside the decoded subset come
//! back as [`ServerMessage::Unknown`] so callers can log them and carry on.

use bytes::{BufMut, Bytes, BytesMut};
use chrono::NaiveDate;
use std::fmt;
use tracing::warn;

use crate::core::packet::{AdminPacketType, RawPacket, ServerPacketType, UpdateType};
use crate::core::reader::PayloadReader;
use crate::error::{ProtocolError, Result};
use crate::protocol::date::date_from_days;

/// Messages sent from the admin client to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminMessage {
    /// Authenticate with the admin password and announce the bot identity.
    Join {
        password: String,
        name: String,
        version: String,
    },
    Quit,
    UpdateFrequency {
        update: UpdateType,
        frequency: u16,
    },
    Poll {
        update: UpdateType,
        id: u32,
    },
    Rcon(String),
    Ping(u32),
}

impl AdminMessage {
    pub fn packet_type(&self) -> AdminPacketType {
        match self {
            AdminMessage::Join { .. } => AdminPacketType::Join,
            AdminMessage::Quit => AdminPacketType::Quit,
            AdminMessage::UpdateFrequency { .. } => AdminPacketType::UpdateFrequency,
            AdminMessage::Poll { .. } => AdminPacketType::Poll,
            AdminMessage::Rcon(_) => AdminPacketType::Rcon,
            AdminMessage::Ping(_) => AdminPacketType::Ping,
        }
    }

    /// Build the framed packet for this message.
    ///
    /// Fails if a string field contains an interior NUL, which the receiving
    /// side would read as an early terminator.
    pub fn to_packet(&self) -> Result<RawPacket> {
        let mut payload = BytesMut::new();
        match self {
            AdminMessage::Join {
                password,
                name,
                version,
            } => {
                put_string(&mut payload, password)?;
                put_string(&mut payload, name)?;
                put_string(&mut payload, version)?;
            }
            AdminMessage::Quit => {}
            AdminMessage::UpdateFrequency { update, frequency } => {
                payload.put_u16_le(*update as u16);
                payload.put_u16_le(*frequency);
            }
            AdminMessage::Poll { update, id } => {
                payload.put_u8(*update as u8);
                payload.put_u32_le(*id);
            }
            AdminMessage::Rcon(command) => put_string(&mut payload, command)?,
            AdminMessage::Ping(token) => payload.put_u32_le(*token),
        }
        Ok(RawPacket::new(self.packet_type().code(), payload.freeze()))
    }
}

fn put_string(buf: &mut BytesMut, value: &str) -> Result<()> {
    if value.as_bytes().contains(&0) {
        return Err(ProtocolError::Custom(format!(
            "string field contains a NUL byte: {value:?}"
        )));
    }
    buf.extend_from_slice(value.as_bytes());
    buf.put_u8(0);
    Ok(())
}

/// Server attributes announced in the welcome packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub server_name: String,
    pub server_version: String,
    /// `None` when the server sent something other than 0 or 1.
    pub dedicated: Option<bool>,
    pub map_name: String,
    pub map_seed: u32,
    pub map_landscape: u8,
    pub map_width: u16,
    pub map_height: u16,
}

/// A chat message relayed by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub action: u8,
    pub destination: u8,
    pub client_id: u32,
    pub message: String,
    pub data: u64,
}

/// One `(update type, supported frequencies)` entry from the protocol packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateCapability {
    pub update: u16,
    pub frequencies: u16,
}

/// Protocol version and the update frequencies the server allows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolInfo {
    pub version: u8,
    pub updates: Vec<UpdateCapability>,
}

impl ProtocolInfo {
    pub fn supports(&self, update: UpdateType, frequency: u16) -> bool {
        self.updates
            .iter()
            .any(|cap| cap.update == update as u16 && cap.frequencies & frequency != 0)
    }
}

/// Messages received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Full,
    Banned,
    Error { code: u8 },
    Protocol(ProtocolInfo),
    Welcome(ServerInfo),
    NewGame,
    Shutdown,
    Date(NaiveDate),
    Chat(ChatMessage),
    RconReply { colour: u16, text: String },
    RconEnd { command: String },
    Pong { token: u32 },
    Unknown { kind: u8, payload: Bytes },
}

impl ServerMessage {
    /// Decode a framed packet.
    ///
    /// An error here only invalidates this packet; framing is unaffected.
    pub fn decode(packet: &RawPacket) -> Result<Self> {
        let mut r = PayloadReader::new(&packet.payload);
        let kind = match ServerPacketType::from_code(packet.kind) {
            Some(kind) => kind,
            None => return Ok(Self::unknown(packet)),
        };

        let message = match kind {
            ServerPacketType::Full => ServerMessage::Full,
            ServerPacketType::Banned => ServerMessage::Banned,
            ServerPacketType::Error => ServerMessage::Error {
                code: r.read_u8()?,
            },
            ServerPacketType::Protocol => ServerMessage::Protocol(decode_protocol(&mut r)?),
            ServerPacketType::Welcome => ServerMessage::Welcome(decode_welcome(&mut r)?),
            ServerPacketType::NewGame => ServerMessage::NewGame,
            ServerPacketType::Shutdown => ServerMessage::Shutdown,
            ServerPacketType::Date => ServerMessage::Date(date_from_days(r.read_u32_le()?)?),
            ServerPacketType::Chat => ServerMessage::Chat(ChatMessage {
                action: r.read_u8()?,
                destination: r.read_u8()?,
                client_id: r.read_u32_le()?,
                message: r.read_string()?,
                data: r.read_u64_le()?,
            }),
            ServerPacketType::Rcon => ServerMessage::RconReply {
                colour: r.read_u16_le()?,
                text: r.read_string()?,
            },
            ServerPacketType::RconEnd => ServerMessage::RconEnd {
                command: r.read_string()?,
            },
            ServerPacketType::Pong => ServerMessage::Pong {
                token: r.read_u32_le()?,
            },
            _ => Self::unknown(packet),
        };
        Ok(message)
    }

    fn unknown(packet: &RawPacket) -> Self {
        ServerMessage::Unknown {
            kind: packet.kind,
            payload: packet.payload.clone(),
        }
    }
}

fn decode_welcome(r: &mut PayloadReader<'_>) -> Result<ServerInfo> {
    let server_name = r.read_string()?;
    let server_version = r.read_string()?;
    let dedicated = match r.read_u8()? {
        0 => Some(false),
        1 => Some(true),
        other => {
            warn!(value = other, "welcome packet dedicated flag is not a boolean");
            None
        }
    };
    let map_name = r.read_string()?;
    let map_seed = r.read_u32_le()?;
    let map_landscape = r.read_u8()?;
    // starting date of the game, not tracked
    r.skip(4)?;
    let map_width = r.read_u16_le()?;
    let map_height = r.read_u16_le()?;

    Ok(ServerInfo {
        server_name,
        server_version,
        dedicated,
        map_name,
        map_seed,
        map_landscape,
        map_width,
        map_height,
    })
}

fn decode_protocol(r: &mut PayloadReader<'_>) -> Result<ProtocolInfo> {
    let version = r.read_u8()?;
    let mut updates = Vec::new();
    while r.read_u8()? != 0 {
        updates.push(UpdateCapability {
            update: r.read_u16_le()?,
            frequencies: r.read_u16_le()?,
        });
    }
    Ok(ProtocolInfo { version, updates })
}

impl fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "server: {} version: {} dedicated: {} map: {} {}/{} size",
            self.server_name,
            self.server_version,
            match self.dedicated {
                Some(d) => d.to_string(),
                None => "unknown".to_string(),
            },
            self.map_name,
            self.map_width,
            self.map_height
        )
    }
}
