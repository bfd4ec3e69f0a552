//! Admin packet type codes and the framed packet representation.

use bytes::Bytes;

/// Size of the length prefix plus the type byte.
pub const HEADER_SIZE: usize = 3;

/// Largest payload a u16 length prefix can describe.
pub const MAX_PAYLOAD_SIZE: usize = u16::MAX as usize - HEADER_SIZE;

/// Packet types sent by the admin client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AdminPacketType {
    Join = 0,
    Quit = 1,
    UpdateFrequency = 2,
    Poll = 3,
    Chat = 4,
    Rcon = 5,
    GameScript = 6,
    Ping = 7,
}

impl AdminPacketType {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Packet types sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerPacketType {
    Full = 100,
    Banned = 101,
    Error = 102,
    Protocol = 103,
    Welcome = 104,
    NewGame = 105,
    Shutdown = 106,
    Date = 107,
    ClientJoin = 108,
    ClientInfo = 109,
    ClientUpdate = 110,
    ClientQuit = 111,
    ClientError = 112,
    CompanyNew = 113,
    CompanyInfo = 114,
    CompanyUpdate = 115,
    CompanyRemove = 116,
    CompanyEconomy = 117,
    CompanyStats = 118,
    Chat = 119,
    Rcon = 120,
    Console = 121,
    CmdNames = 122,
    CmdLogging = 123,
    GameScript = 124,
    RconEnd = 125,
    Pong = 126,
}

impl ServerPacketType {
    pub fn from_code(code: u8) -> Option<Self> {
        use ServerPacketType::*;
        let kind = match code {
            100 => Full,
            101 => Banned,
            102 => Error,
            103 => Protocol,
            104 => Welcome,
            105 => NewGame,
            106 => Shutdown,
            107 => Date,
            108 => ClientJoin,
            109 => ClientInfo,
            110 => ClientUpdate,
            111 => ClientQuit,
            112 => ClientError,
            113 => CompanyNew,
            114 => CompanyInfo,
            115 => CompanyUpdate,
            116 => CompanyRemove,
            117 => CompanyEconomy,
            118 => CompanyStats,
            119 => Chat,
            120 => Rcon,
            121 => Console,
            122 => CmdNames,
            123 => CmdLogging,
            124 => GameScript,
            125 => RconEnd,
            126 => Pong,
            _ => return None,
        };
        Some(kind)
    }
}

/// Categories of information the admin can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum UpdateType {
    Date = 0,
    ClientInfo = 1,
    CompanyInfo = 2,
    CompanyEconomy = 3,
    CompanyStats = 4,
    Chat = 5,
    Console = 6,
    CmdNames = 7,
    CmdLogging = 8,
    GameScript = 9,
}

/// Frequency bits for [`UpdateType`] subscriptions.
pub mod frequency {
    pub const POLL: u16 = 0x01;
    pub const DAILY: u16 = 0x02;
    pub const WEEKLY: u16 = 0x04;
    pub const MONTHLY: u16 = 0x08;
    pub const QUARTERLY: u16 = 0x10;
    pub const ANNUALLY: u16 = 0x20;
    pub const AUTOMATIC: u16 = 0x40;
}

/// One framed packet: the type byte and everything after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub kind: u8,
    pub payload: Bytes,
}

impl RawPacket {
    pub fn new(kind: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// Total length on the wire, including the 3-byte header.
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Serialize into `[len][type][payload]`.
    ///
    /// Callers are expected to respect [`MAX_PAYLOAD_SIZE`]; the codec enforces it.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.wire_len());
        out.extend_from_slice(&(self.wire_len() as u16).to_le_bytes());
        out.push(self.kind);
        out.extend_from_slice(&self.payload);
        out
    }
}
