use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::config::ListenerConfig;
use crate::dedup::{Ingestor, Outcome};
use crate::error::IngestError;
use crate::parser::PayloadLayout;

// ═══════════════════════════════════════════════════════════════
//  State
// ═══════════════════════════════════════════════════════════════

/// Ingest loop states.
///
/// `Idle → Listening → Receiving → Processing → Listening …`,
/// `Stopped` on cancellation or listener failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Listening,
    Receiving,
    Processing,
    Stopped,
}

/// Datagram counters, logged when the loop stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub received: u64,
    pub persisted: u64,
    pub duplicates: u64,
    pub ignored: u64,
    /// Malformed payloads.
    pub rejected: u64,
    /// Store failures.
    pub failed: u64,
}

// ═══════════════════════════════════════════════════════════════
//  IngestLoop
// ═══════════════════════════════════════════════════════════════

/// Owns the UDP socket and drives parse → ingest for every datagram,
/// one at a time.
pub struct IngestLoop {
    addr: String,
    max_datagram: usize,
    socket: Option<UdpSocket>,
    layout: PayloadLayout,
    ingestor: Ingestor,
    state: LoopState,
    stats: IngestStats,
}

impl IngestLoop {
    pub fn new(listener: &ListenerConfig, layout: PayloadLayout, ingestor: Ingestor) -> Self {
        Self {
            addr: listener.addr(),
            max_datagram: listener.max_datagram.max(1),
            socket: None,
            layout,
            ingestor,
            state: LoopState::Idle,
            stats: IngestStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Bind the socket (`Idle → Listening`). Called by `run` if needed;
    /// call it first to learn the bound address (port 0).
    pub async fn bind(&mut self) -> Result<SocketAddr, IngestError> {
        let socket = match UdpSocket::bind(&self.addr).await {
            Ok(s) => s,
            Err(source) => {
                self.transition(LoopState::Stopped);
                return Err(IngestError::ListenerFatal { addr: self.addr.clone(), source });
            }
        };
        let local = match socket.local_addr() {
            Ok(addr) => addr,
            Err(source) => {
                self.transition(LoopState::Stopped);
                return Err(IngestError::ListenerFatal { addr: self.addr.clone(), source });
            }
        };
        tracing::info!(addr = %local, "listening for broadcasts");
        self.socket = Some(socket);
        self.transition(LoopState::Listening);
        Ok(local)
    }

    /// Run until `token` is cancelled (`Ok`) or the socket fails (`ListenerFatal`).
    ///
    /// Parse, store and notifier failures are logged and the loop goes on
    /// with the next datagram. The socket is released on every exit path.
    pub async fn run(mut self, token: CancellationToken) -> Result<IngestStats, IngestError> {
        if self.socket.is_none() {
            self.bind().await?;
        }
        let result = match self.socket.take() {
            Some(socket) => self.listen(socket, &token).await,
            None => Ok(()),
        };
        self.transition(LoopState::Stopped);

        let stats = self.stats;
        tracing::info!(
            received = stats.received,
            persisted = stats.persisted,
            duplicates = stats.duplicates,
            ignored = stats.ignored,
            rejected = stats.rejected,
            failed = stats.failed,
            "ingest loop stopped"
        );
        result.map(|()| stats)
    }

    async fn listen(&mut self, socket: UdpSocket, token: &CancellationToken) -> Result<(), IngestError> {
        let mut buf = vec![0u8; self.max_datagram];
        loop {
            let (len, peer) = tokio::select! {
                received = socket.recv_from(&mut buf) => match received {
                    Ok(r) => r,
                    Err(source) => {
                        tracing::error!(addr = %self.addr, error = %source, "receive failed");
                        return Err(IngestError::ListenerFatal { addr: self.addr.clone(), source });
                    }
                },
                _ = token.cancelled() => {
                    tracing::info!("stop requested");
                    return Ok(());
                }
            };

            self.transition(LoopState::Receiving);
            self.stats.received += 1;
            let payload = String::from_utf8_lossy(&buf[..len]);
            tracing::info!(%peer, bytes = len, "received broadcast");
            tracing::trace!(%peer, %payload, "payload");

            self.transition(LoopState::Processing);
            self.process(&payload).await;
            self.transition(LoopState::Listening);
        }
    }

    async fn process(&mut self, payload: &str) {
        let record = match self.layout.parse(payload) {
            Ok(r) => r,
            Err(e) => {
                self.stats.rejected += 1;
                tracing::warn!(error = %IngestError::from(e), "datagram dropped");
                return;
            }
        };

        match self.ingestor.ingest(record).await {
            Ok(Outcome::Persisted) => self.stats.persisted += 1,
            Ok(Outcome::Duplicate) => self.stats.duplicates += 1,
            Ok(Outcome::Ignored) => self.stats.ignored += 1,
            Err(e) => {
                self.stats.failed += 1;
                tracing::error!(error = %e, "ingest failed");
            }
        }
    }

    fn transition(&mut self, next: LoopState) {
        tracing::trace!(from = ?self.state, to = ?next, "ingest loop");
        self.state = next;
    }
}
