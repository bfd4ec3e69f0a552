//! Observability and Metrics
//!
//! Counters for the admin client: connection attempts, packets received,
//! decode failures and scheduled commands sent.
//!
//! Uses atomic counters so the control loop and the reader task can both
//! record without locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for one [`AdminClient`](crate::service::client::AdminClient)
#[derive(Debug)]
pub struct ClientMetrics {
    /// Total connection attempts, successful or not
    pub connection_attempts: AtomicU64,
    /// Connections that reached the handshake
    pub connections_established: AtomicU64,
    /// Connections lost after being established
    pub disconnects: AtomicU64,
    /// Total packets framed from the stream
    pub packets_received: AtomicU64,
    /// Total bytes framed from the stream, headers included
    pub bytes_received: AtomicU64,
    /// Packets dropped because their payload did not decode
    pub decode_errors: AtomicU64,
    /// Scheduled RCON commands written to the socket
    pub commands_dispatched: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl ClientMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            connection_attempts: AtomicU64::new(0),
            connections_established: AtomicU64::new(0),
            disconnects: AtomicU64::new(0),
            packets_received: AtomicU64::new(0),
            bytes_received: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            commands_dispatched: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn connection_attempt(&self) {
        self.connection_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_established(&self) {
        self.connections_established.fetch_add(1, Ordering::Relaxed);
    }

    pub fn disconnected(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a framed packet
    pub fn packet_received(&self, byte_count: u64) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(byte_count, Ordering::Relaxed);
    }

    pub fn decode_error(&self) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_dispatched(&self) {
        self.commands_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connection_attempts: self.connection_attempts.load(Ordering::Relaxed),
            connections_established: self.connections_established.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            packets_received: self.packets_received.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            commands_dispatched: self.commands_dispatched.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            connection_attempts = snapshot.connection_attempts,
            connections_established = snapshot.connections_established,
            disconnects = snapshot.disconnects,
            packets_received = snapshot.packets_received,
            bytes_received = snapshot.bytes_received,
            decode_errors = snapshot.decode_errors,
            commands_dispatched = snapshot.commands_dispatched,
            uptime_seconds = snapshot.uptime_seconds,
            "Admin client metrics snapshot"
        );
    }
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub connection_attempts: u64,
    pub connections_established: u64,
    pub disconnects: u64,
    pub packets_received: u64,
    pub bytes_received: u64,
    pub decode_errors: u64,
    pub commands_dispatched: u64,
    pub uptime_seconds: u64,
}
