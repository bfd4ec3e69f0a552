//! # Admin Client
//!
//! Connection lifecycle for the admin port.
//!
//! [`AdminClient::run`] owns the reconnect loop. Each connection attempt splits
//! the socket: the read half goes to a freshly spawned reader task, the write
//! half is shared between the handshake and scheduled RCON dispatch. Two
//! oneshot channels are created per attempt: `connected` lets the reader start
//! once the transport is installed, `disconnected` carries the reason the
//! reader stopped back to the control loop, which then waits the fixed
//! reconnect delay and starts over. The loop never gives up.
//!
//! ```text
//! Disconnected -> Connecting -> Authenticating -> Active -> Disconnected
//! ```
//!
//! ## Example
//! ```no_run
//! use ttd_admin::config::ClientConfig;
//! use ttd_admin::protocol::scheduler::Period;
//! use ttd_admin::service::client::AdminClient;
//!
//! # async fn demo() -> ttd_admin::error::Result<()> {
//! let config = ClientConfig {
//!     password: "secret".into(),
//!     ..ClientConfig::default()
//! };
//! let mut client = AdminClient::new(config)?;
//! client.register(Period::Monthly, "say \"It is %Y-%M-%D\"");
//! client.run().await; // runs until the task is dropped
//! # Ok(())
//! # }
//! ```

use chrono::NaiveDate;
use futures::{SinkExt, StreamExt};
use std::fmt;
use std::io;
use std::sync::Arc;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch, Mutex};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{AdminConfig, ClientConfig};
use crate::core::codec::AdminCodec;
use crate::core::packet::{frequency, RawPacket, UpdateType};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::message::{AdminMessage, ServerInfo, ServerMessage};
use crate::protocol::scheduler::{CalendarScheduler, Period};
use crate::utils::metrics::ClientMetrics;

type SharedWriter = Arc<Mutex<FramedWrite<OwnedWriteHalf, AdminCodec>>>;

/// Where the client is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Disconnected,
    Connecting,
    Authenticating,
    Active,
}

/// Why a connection ended.
#[derive(Debug)]
pub enum DisconnectReason {
    /// The peer reset the socket, usually after rejecting the password.
    ResetByPeer,
    /// The server announced it is shutting down.
    Shutdown,
    /// The stream ended cleanly.
    Closed,
    /// The byte stream could not be framed.
    Framing(ProtocolError),
    /// Any other read failure.
    ReadError(ProtocolError),
    /// The reader task went away without reporting.
    ReaderGone,
}

impl DisconnectReason {
    fn from_error(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(e) if e.kind() == io::ErrorKind::ConnectionReset => {
                DisconnectReason::ResetByPeer
            }
            ProtocolError::ServerShutdown => DisconnectReason::Shutdown,
            ProtocolError::ConnectionClosed => DisconnectReason::Closed,
            e @ (ProtocolError::UndersizedPacket(_) | ProtocolError::OversizedPacket(_)) => {
                DisconnectReason::Framing(e)
            }
            e => DisconnectReason::ReadError(e),
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::ResetByPeer => f.write_str("connection reset by peer"),
            DisconnectReason::Shutdown => f.write_str("server shutting down"),
            DisconnectReason::Closed => f.write_str(constants::ERR_CONNECTION_CLOSED),
            DisconnectReason::Framing(e) => write!(f, "framing violation: {e}"),
            DisconnectReason::ReadError(e) => write!(f, "read error: {e}"),
            DisconnectReason::ReaderGone => f.write_str(constants::ERR_READER_GONE),
        }
    }
}

/// Client for a server's admin port.
pub struct AdminClient {
    config: ClientConfig,
    scheduler: Arc<CalendarScheduler>,
    metrics: Arc<ClientMetrics>,
    phase: Arc<watch::Sender<ConnectionPhase>>,
    server_info: Arc<watch::Sender<Option<ServerInfo>>>,
}

impl AdminClient {
    /// Create a client; fails if the configuration is unusable (e.g. no password).
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate_strict()?;
        let (phase, _) = watch::channel(ConnectionPhase::Disconnected);
        let (server_info, _) = watch::channel(None);
        Ok(Self {
            config,
            scheduler: Arc::new(CalendarScheduler::new()),
            metrics: Arc::new(ClientMetrics::new()),
            phase: Arc::new(phase),
            server_info: Arc::new(server_info),
        })
    }

    /// Create a client and register every command from the schedule section.
    pub fn from_config(config: &AdminConfig) -> Result<Self> {
        config.validate_strict()?;
        let mut client = Self::new(config.client.clone())?;
        client.scheduler = Arc::new(config.schedule.to_scheduler());
        Ok(client)
    }

    /// Register a command template for a period.
    ///
    /// Registration is only possible before [`run`](Self::run), which consumes the client.
    pub fn register(&mut self, period: Period, command: impl Into<String>) {
        Arc::make_mut(&mut self.scheduler).register(period, command);
    }

    /// Register by period name (`daily`, `monthly` or `yearly`).
    pub fn register_date_change(&mut self, period: &str, command: impl Into<String>) -> Result<()> {
        Arc::make_mut(&mut self.scheduler).register_named(period, command)
    }

    pub fn scheduler(&self) -> &CalendarScheduler {
        &self.scheduler
    }

    pub fn phase(&self) -> watch::Receiver<ConnectionPhase> {
        self.phase.subscribe()
    }

    /// Latest welcome data; `None` until the current connection has been welcomed.
    pub fn server_info(&self) -> watch::Receiver<Option<ServerInfo>> {
        self.server_info.subscribe()
    }

    pub fn metrics(&self) -> Arc<ClientMetrics> {
        self.metrics.clone()
    }

    /// Run the connect/reconnect loop forever on a dedicated runtime.
    pub fn run_blocking(self) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.run());
        Ok(())
    }

    /// Connect, authenticate and serve the connection; on any loss wait the
    /// reconnect delay and start again. Does not return.
    pub async fn run(self) {
        let address = self.config.address();

        loop {
            self.server_info.send_replace(None);
            self.phase.send_replace(ConnectionPhase::Connecting);
            self.metrics.connection_attempt();

            match self.serve(&address).await {
                Ok(reason) => {
                    self.metrics.disconnected();
                    match reason {
                        DisconnectReason::ResetByPeer => warn!(
                            "Connection reset by peer - check the server log for details"
                        ),
                        DisconnectReason::Shutdown => {
                            info!("server shutting down - will try to reconnect")
                        }
                        ref other => warn!(reason = %other, "disconnected"),
                    }
                    self.metrics.log_metrics();
                }
                Err(e) => error!(error = %e, %address, "error connecting"),
            }

            self.phase.send_replace(ConnectionPhase::Disconnected);
            info!(delay_ms = self.config.reconnect_delay.as_millis() as u64, "reconnecting");
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    /// One connection attempt. `Err` means the transport was never established.
    #[instrument(skip(self))]
    async fn serve(&self, address: &str) -> Result<DisconnectReason> {
        info!("connecting...");
        let stream = TcpStream::connect(address).await?;
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "could not disable nagle");
        }
        info!("connected");
        self.metrics.connection_established();

        let (read_half, write_half) = stream.into_split();
        let writer: SharedWriter = Arc::new(Mutex::new(FramedWrite::new(write_half, AdminCodec)));

        let (connected_tx, connected_rx) = oneshot::channel();
        let (disconnected_tx, disconnected_rx) = oneshot::channel();

        let reader = Reader {
            frames: FramedRead::new(read_half, AdminCodec),
            writer: writer.clone(),
            scheduler: self.scheduler.clone(),
            server_info: self.server_info.clone(),
            metrics: self.metrics.clone(),
        };
        tokio::spawn(reader.run(connected_rx, disconnected_tx));
        let _ = connected_tx.send(());

        self.phase.send_replace(ConnectionPhase::Authenticating);
        let handshake = self.handshake(&writer).await;
        if let Err(e) = &handshake {
            // the reader will observe the broken socket and report it
            warn!(error = %e, "failed to send handshake");
        }
        self.phase.send_replace(phase_after_handshake(&handshake));

        Ok(disconnected_rx.await.unwrap_or(DisconnectReason::ReaderGone))
    }

    async fn handshake(&self, writer: &SharedWriter) -> Result<()> {
        send(
            writer,
            AdminMessage::Join {
                password: self.config.password.clone(),
                name: self.config.bot_name.clone(),
                version: self.config.bot_version.clone(),
            },
        )
        .await?;

        send(
            writer,
            AdminMessage::UpdateFrequency {
                update: UpdateType::Date,
                frequency: frequency::DAILY,
            },
        )
        .await?;
        debug!("handshake sent");
        Ok(())
    }
}

/// Active once the handshake bytes are written; otherwise stay in
/// `Authenticating` until the reader reports the disconnect.
fn phase_after_handshake(result: &Result<()>) -> ConnectionPhase {
    match result {
        Ok(()) => ConnectionPhase::Active,
        Err(_) => ConnectionPhase::Authenticating,
    }
}

async fn send(writer: &SharedWriter, message: AdminMessage) -> Result<()> {
    let packet = message.to_packet()?;
    writer.lock().await.send(packet).await
}

/// Receive side of one connection; lives on the spawned reader task.
struct Reader {
    frames: FramedRead<OwnedReadHalf, AdminCodec>,
    writer: SharedWriter,
    scheduler: Arc<CalendarScheduler>,
    server_info: Arc<watch::Sender<Option<ServerInfo>>>,
    metrics: Arc<ClientMetrics>,
}

impl Reader {
    async fn run(
        mut self,
        connected: oneshot::Receiver<()>,
        disconnected: oneshot::Sender<DisconnectReason>,
    ) {
        if connected.await.is_err() {
            debug!("connection abandoned before the reader started");
            return;
        }

        let reason = loop {
            let result = match self.frames.next().await {
                Some(Ok(packet)) => self.handle_packet(packet).await,
                Some(Err(e)) => Err(e),
                None => Err(ProtocolError::ConnectionClosed),
            };
            if let Err(e) = result {
                break DisconnectReason::from_error(e);
            }
        };

        let _ = disconnected.send(reason);
    }

    /// Process one framed packet. `Err` ends the connection.
    async fn handle_packet(&mut self, packet: RawPacket) -> Result<()> {
        self.metrics.packet_received(packet.wire_len() as u64);

        let message = match ServerMessage::decode(&packet) {
            Ok(message) => message,
            Err(e) => {
                self.metrics.decode_error();
                warn!(kind = packet.kind, error = %e, "dropping malformed packet");
                return Ok(());
            }
        };

        match message {
            ServerMessage::Protocol(info) => {
                debug!(version = info.version, updates = info.updates.len(), "protocol");
                if !info.supports(UpdateType::Date, frequency::DAILY) {
                    warn!("server does not offer daily date updates");
                }
            }
            ServerMessage::Welcome(info) => {
                info!("received welcome packet");
                info!("{info}");
                self.server_info.send_replace(Some(info));
            }
            ServerMessage::Shutdown => return Err(ProtocolError::ServerShutdown),
            ServerMessage::Date(date) => self.date_changed(date).await,
            ServerMessage::Chat(chat) => info!(
                action = chat.action,
                dest_type = chat.destination,
                client_id = chat.client_id,
                msg = %chat.message,
                data = chat.data,
                "chat message"
            ),
            ServerMessage::RconReply { colour, text } => info!(colour, "rcon: {text}"),
            ServerMessage::RconEnd { command } => info!("rcon end: {command}"),
            ServerMessage::Full => error!("server is full - admin connection refused"),
            ServerMessage::Banned => error!("admin connection banned by server"),
            ServerMessage::Error { code } => error!(code, "server reported an error"),
            ServerMessage::NewGame => info!("server started a new game"),
            ServerMessage::Pong { token } => debug!(token, "pong"),
            ServerMessage::Unknown { kind, payload } => info!(
                kind,
                text = %String::from_utf8_lossy(&payload),
                raw = ?&payload[..],
                "unknown packet received from server"
            ),
        }
        Ok(())
    }

    /// Send the scheduled commands for `date`. A failed write stops dispatch
    /// for this date; nothing is retried.
    async fn date_changed(&self, date: NaiveDate) {
        debug!(%date, "date changed");
        for command in self.scheduler.commands_for(date) {
            info!(%date, %command, "issuing scheduled rcon command");
            if let Err(e) = send(&self.writer, AdminMessage::Rcon(command)).await {
                warn!(error = %e, "failed to send rcon command");
                break;
            }
            self.metrics.command_dispatched();
        }
    }
}
