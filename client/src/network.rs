use futures_util::{SinkExt, StreamExt};
use log::{debug, info};
use shared::{Direction, Snapshot};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_tungstenite::{client_async, tungstenite::Message, WebSocketStream};

pub type ClientResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Connection to the game server speaking the direction/snapshot protocol
pub struct GameClient {
    ws: WebSocketStream<TcpStream>,
    server_addr: SocketAddr,
    local_id: String,
    /// Directions sent whose snapshot has not been read yet
    in_flight: usize,
}

impl GameClient {
    /// Connects to `server`, given either as `host:port` or `ws://host:port`
    pub async fn connect(server: &str) -> ClientResult<Self> {
        let host = server.trim_start_matches("ws://").trim_end_matches('/');
        let stream = TcpStream::connect(host).await?;
        let server_addr = stream.peer_addr()?;
        // The server names players after the address it sees for us
        let local_id = stream.local_addr()?.to_string();

        let (ws, _) = client_async(format!("ws://{}/", host), stream).await?;
        info!("Connected to {} as {}", server_addr, local_id);

        Ok(Self {
            ws,
            server_addr,
            local_id,
            in_flight: 0,
        })
    }

    pub fn local_id(&self) -> &str {
        &self.local_id
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Sends one step; the server answers every step with one snapshot
    pub async fn send_direction(&mut self, direction: Direction) -> ClientResult<()> {
        self.send_raw(&direction.encode()).await?;
        self.in_flight += 1;
        Ok(())
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Sends an arbitrary text payload as one packet. No reply is expected.
    pub async fn send_raw(&mut self, payload: &str) -> ClientResult<()> {
        self.ws.send(Message::text(payload.to_string())).await?;
        Ok(())
    }

    /// Waits up to `timeout` for the next snapshot, returning `None` on timeout
    pub async fn next_snapshot(&mut self, timeout: Duration) -> ClientResult<Option<Snapshot>> {
        let deadline = Instant::now() + timeout;

        loop {
            let message = match tokio::time::timeout_at(deadline, self.ws.next()).await {
                Err(_) => return Ok(None),
                Ok(None) => return Err("server closed the connection".into()),
                Ok(Some(message)) => message?,
            };

            let snapshot = match message {
                Message::Text(text) => Snapshot::from_json(text.as_bytes())?,
                Message::Binary(data) => Snapshot::from_json(&data)?,
                Message::Close(_) => return Err("server closed the connection".into()),
                _ => continue,
            };
            self.in_flight = self.in_flight.saturating_sub(1);
            debug!(
                "Snapshot: {} players, {} items",
                snapshot.players.len(),
                snapshot.items.len()
            );
            return Ok(Some(snapshot));
        }
    }

    /// Reads replies until every sent step is answered and returns the newest
    ///
    /// Replies that arrived late for earlier steps are skipped, so the result
    /// reflects the most recent step. Returns `None` if nothing arrives in time.
    pub async fn latest_snapshot(&mut self, timeout: Duration) -> ClientResult<Option<Snapshot>> {
        let deadline = Instant::now() + timeout;
        let mut latest = None;

        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.next_snapshot(remaining).await? {
                Some(snapshot) => latest = Some(snapshot),
                None => break,
            }
        }
        Ok(latest)
    }

    pub async fn close(mut self) -> ClientResult<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}
