//! # Game Server Library
//!
//! This library provides the authoritative server for the multiplayer
//! item-collection game. It owns the canonical world (connected players and
//! the items left on the field), applies client inputs one step at a time, and
//! replies to each input with a full snapshot of the world.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Every movement and every pickup is decided here. Clients only send a
//! direction code and render whatever snapshot comes back.
//!
//! ### Session Lifecycle
//! A player exists exactly as long as its peer's connection:
//! - Connect creates a player at a random point inside the field
//! - Disconnect removes that player and nobody else
//! - Identity is the peer's `ip:port`, so a reconnect is a new player
//!
//! ### Pull-Driven Snapshots
//! A snapshot is sent only to the peer whose input triggered the step.
//! Idle peers are not pushed updates; they see the world change the next time
//! they send input themselves.
//!
//! ## Architecture Design
//!
//! ### Single-Owner Event Loop
//! One task polls the transport with a bounded wait, dispatches the event,
//! mutates the world and sends the reply, strictly in sequence. The world is
//! owned by the [`network::Server`] value, so no locking is involved.
//!
//! ### Pluggable Transport
//! The loop sees the network only through the [`network::Transport`] trait,
//! which yields `Connect`, `Disconnect`, `Receive` or `None` per poll. The
//! production [`network::WsTransport`] frames packets as WebSocket messages
//! over TCP; tests drive the loop with an in-memory transport.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! Ordered collection of players keyed by peer id, spawn placement and
//! exact-match removal.
//!
//! ### Game Module (`game`)
//! World state, configuration, per-step movement and AABB item collection.
//!
//! ### Network Module (`network`)
//! Transport abstraction, WebSocket transport and the server loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rand::{rngs::StdRng, SeedableRng};
//! use server::game::{GameConfig, World};
//! use server::network::{Server, WsTransport};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = WsTransport::bind("0.0.0.0:8095", 32).await?;
//!     let mut rng = StdRng::from_entropy();
//!     let world = World::new(GameConfig::default(), &mut rng);
//!
//!     let mut server = Server::new(transport, world, rng, Duration::from_millis(1000));
//!     server.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Failing to bind the listener is fatal at startup. Everything after that is
//! logged and survived: malformed direction codes are dropped, snapshot
//! serialization failures skip that reply, and sends to vanished peers are
//! ignored, so one misbehaving peer never takes the server down for others.

pub mod game;
pub mod network;
pub mod registry;
