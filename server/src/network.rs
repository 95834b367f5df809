//! Server network layer: transport abstraction, WebSocket transport and the event loop

use crate::game::World;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use shared::{Direction, CHANNEL_COUNT};
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Identity of a connected peer: the textual `ip:port` of its socket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<SocketAddr> for PeerId {
    fn from(addr: SocketAddr) -> Self {
        Self(addr.to_string())
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One event produced by a transport poll
///
/// `Receive` owns the packet bytes; they are released when the event is
/// dropped at the end of its dispatch, whatever the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    None,
    Connect(PeerId),
    Disconnect(PeerId),
    Receive {
        peer: PeerId,
        channel: u8,
        data: Vec<u8>,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("peer {0} is not connected")]
    UnknownPeer(PeerId),
    #[error("channel {0} does not exist")]
    InvalidChannel(u8),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Connection-oriented, packet-framed delivery between the server and its peers
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Waits at most `timeout` for the next event, returning `NetEvent::None` on timeout
    async fn poll(&mut self, timeout: Duration) -> NetEvent;

    /// Queues a reliable packet for `peer`
    fn send(&mut self, peer: &PeerId, channel: u8, payload: Vec<u8>)
        -> Result<(), TransportError>;
}

/// Messages sent from connection tasks to the transport
#[derive(Debug)]
enum ServerMessage {
    PeerConnected {
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<Message>,
    },
    PacketReceived {
        addr: SocketAddr,
        data: Vec<u8>,
    },
    PeerDisconnected {
        addr: SocketAddr,
    },
}

/// WebSocket transport: one WebSocket message per packet, a single reliable channel
///
/// Connection tasks only shuttle bytes. Every event funnels through one queue
/// that is drained by `poll`, so game state is never touched off the loop task.
pub struct WsTransport {
    local_addr: SocketAddr,
    max_peers: usize,
    peers: HashMap<PeerId, mpsc::UnboundedSender<Message>>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl WsTransport {
    pub async fn bind(addr: &str, max_peers: usize) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on {} (max {} peers)", local_addr, max_peers);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        tokio::spawn(Self::accept_loop(listener, server_tx));

        Ok(Self {
            local_addr,
            max_peers,
            peers: HashMap::new(),
            server_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Accepts TCP connections until the transport is dropped
    async fn accept_loop(listener: TcpListener, server_tx: mpsc::UnboundedSender<ServerMessage>) {
        loop {
            tokio::select! {
                _ = server_tx.closed() => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let server_tx = server_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, server_tx).await {
                                error!("Connection error from {}: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                },
            }
        }
    }
}

impl Transport for WsTransport {
    async fn poll(&mut self, timeout: Duration) -> NetEvent {
        let message = match tokio::time::timeout(timeout, self.server_rx.recv()).await {
            Ok(Some(message)) => message,
            Ok(None) => {
                // Accept loop is gone; keep the bounded wait instead of spinning
                tokio::time::sleep(timeout).await;
                return NetEvent::None;
            }
            Err(_) => return NetEvent::None,
        };

        match message {
            ServerMessage::PeerConnected { addr, outbound } => {
                if self.peers.len() >= self.max_peers {
                    // Dropping the sender makes the connection task close the socket
                    warn!("Rejecting {}: server full ({} peers)", addr, self.max_peers);
                    return NetEvent::None;
                }
                let peer = PeerId::from(addr);
                info!("New peer connected: {}", peer);
                self.peers.insert(peer.clone(), outbound);
                NetEvent::Connect(peer)
            }
            ServerMessage::PacketReceived { addr, data } => {
                let peer = PeerId::from(addr);
                if !self.peers.contains_key(&peer) {
                    return NetEvent::None;
                }
                NetEvent::Receive {
                    peer,
                    channel: 0,
                    data,
                }
            }
            ServerMessage::PeerDisconnected { addr } => {
                let peer = PeerId::from(addr);
                if self.peers.remove(&peer).is_none() {
                    return NetEvent::None;
                }
                info!("Peer disconnected: {}", peer);
                NetEvent::Disconnect(peer)
            }
        }
    }

    fn send(
        &mut self,
        peer: &PeerId,
        channel: u8,
        payload: Vec<u8>,
    ) -> Result<(), TransportError> {
        if channel >= CHANNEL_COUNT {
            return Err(TransportError::InvalidChannel(channel));
        }
        let outbound = self
            .peers
            .get(peer)
            .ok_or_else(|| TransportError::UnknownPeer(peer.clone()))?;

        let message = match String::from_utf8(payload) {
            Ok(text) => Message::text(text),
            Err(e) => Message::binary(e.into_bytes()),
        };
        outbound
            .send(message)
            .map_err(|_| TransportError::UnknownPeer(peer.clone()))
    }
}

/// Runs one WebSocket connection, forwarding traffic between the socket and the transport
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let ws_stream = accept_async(stream).await?;
    let (mut write, mut read) = ws_stream.split();

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
    if server_tx
        .send(ServerMessage::PeerConnected {
            addr,
            outbound: outbound_tx,
        })
        .is_err()
    {
        return Ok(());
    }

    loop {
        tokio::select! {
            msg = read.next() => {
                let data = match msg {
                    Some(Ok(Message::Text(text))) => text.as_bytes().to_vec(),
                    Some(Ok(Message::Binary(data))) => data.to_vec(),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                };
                if server_tx.send(ServerMessage::PacketReceived { addr, data }).is_err() {
                    break;
                }
            }
            outbound = outbound_rx.recv() => match outbound {
                Some(message) => {
                    if let Err(e) = write.send(message).await {
                        warn!("Failed to send to {}: {}", addr, e);
                        break;
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
        }
    }

    let _ = server_tx.send(ServerMessage::PeerDisconnected { addr });
    Ok(())
}

/// Authoritative server: owns the world and drives it from transport events
///
/// Every step runs on the task calling `run`/`service`. A snapshot is sent
/// only to the peer whose input triggered the step, so idle peers see
/// updates when they next send input.
pub struct Server<T: Transport> {
    transport: T,
    world: World,
    rng: StdRng,
    poll_timeout: Duration,
}

impl<T: Transport> Server<T> {
    pub fn new(transport: T, world: World, rng: StdRng, poll_timeout: Duration) -> Self {
        Self {
            transport,
            world,
            rng,
            poll_timeout,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Polls the transport once and dispatches the resulting event
    pub async fn service(&mut self) {
        let event = self.transport.poll(self.poll_timeout).await;
        self.handle_event(event);
    }

    /// Main server loop; only returns when the task is cancelled
    pub async fn run(&mut self) {
        info!(
            "Server started with {} items, polling every {:?}",
            self.world.items.len(),
            self.poll_timeout
        );
        loop {
            self.service().await;
        }
    }

    pub fn handle_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::None => {}
            NetEvent::Connect(peer) => {
                self.world.players.on_connect(peer.as_str(), &mut self.rng);
            }
            NetEvent::Disconnect(peer) => {
                self.world.players.on_disconnect(peer.as_str());
            }
            NetEvent::Receive {
                peer,
                channel,
                data,
            } => {
                self.handle_receive(&peer, channel, &data);
            }
        }
    }

    fn handle_receive(&mut self, peer: &PeerId, channel: u8, data: &[u8]) {
        let direction = match Direction::decode(data) {
            Ok(direction) => direction,
            Err(e) => {
                warn!("Dropping malformed input from {}: {}", peer, e);
                return;
            }
        };

        self.world.step(peer.as_str(), direction);
        self.send_snapshot(peer, channel);
    }

    fn send_snapshot(&mut self, peer: &PeerId, channel: u8) {
        let payload = match self.world.snapshot().to_json() {
            Ok(json) => json.into_bytes(),
            Err(e) => {
                error!("Failed to serialize snapshot for {}: {}", peer, e);
                return;
            }
        };

        debug!("Sending {} byte snapshot to {}", payload.len(), peer);
        if let Err(e) = self.transport.send(peer, channel, payload) {
            warn!("Failed to send snapshot to {}: {}", peer, e);
        }
    }
}
