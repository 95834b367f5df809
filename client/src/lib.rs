//! # Game Client Library
//!
//! Headless client for the item-collection game server. It speaks the wire
//! contract and nothing more: every frame it sends one direction code and
//! receives the full world snapshot the server replies with.
//!
//! ## Protocol
//!
//! - Client → server: the direction as a bare ASCII decimal (`0` still,
//!   `1` left, `2` right, `3` up, `4` down), one packet per frame
//! - Server → client: a JSON snapshot with every player and every remaining item
//!
//! The server only replies to the peer that sent input, so a client that
//! stops sending stops seeing updates. Clients therefore send every frame,
//! even when the direction has not changed.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! WebSocket connection, direction encoding and snapshot decoding.
//!
//! ### Bot Module (`bot`)
//! Chooses a direction from the latest snapshot, standing in for keyboard input.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::bot::choose_direction;
//! use client::network::GameClient;
//! use shared::Direction;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = GameClient::connect("127.0.0.1:8095").await?;
//!     let mut direction = Direction::Still;
//!
//!     loop {
//!         client.send_direction(direction).await?;
//!         if let Some(snapshot) = client.next_snapshot(Duration::from_secs(1)).await? {
//!             if let Some(me) = snapshot.player(client.local_id()) {
//!                 direction = choose_direction(me, &snapshot.items);
//!             }
//!         }
//!     }
//! }
//! ```

pub mod bot;
pub mod network;
