//! # Arena Server Library
//!
//! This library provides the authoritative server for a small top-down arena
//! shooter. It owns the canonical world, applies client intents as they
//! arrive, advances bullets on a fixed tick and broadcasts the result so every
//! client converges on the server's view.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Bullets are integrated, culled at the arena bounds and resolved against
//! players once per tick. Damage, kill credit and death are decided here only.
//!
//! ### Client Management
//! Handles the lifecycle of every connection:
//! - Admission against a capacity ceiling, with a one-off rejection message
//! - Identity assignment from a counter that never reuses ids
//! - Teardown on close or error, idempotent and safe against a running tick
//!
//! ### State Broadcasting
//! Every tick the snapshot is encoded once and queued for all clients.
//! Delivery is best-effort: a slow or broken client only loses its own frames.
//!
//! ## Architecture Design
//!
//! ### One Exclusion Domain
//! Players, bullets, the match clock and the connection registry live in a
//! single [`world::World`] behind one async mutex. Each intent, each admission,
//! each teardown and each whole tick is atomic with respect to the others.
//!
//! ### TCP Framing
//! Clients hold one TCP stream. Messages are length-prefixed bincode frames
//! (see the `shared` crate), so undecodable payloads can be skipped without
//! losing sync.
//!
//! ## Module Organization
//!
//! - `config`: tunable rules and server settings
//! - `game`: players, bullets, intents and the per-tick step
//! - `physics`: bullet integration, culling and hit resolution
//! - `session`: the match clock
//! - `client_manager`: identity allocation and outbound channels
//! - `world`: the lock-protected pairing of game state and registry
//! - `codec`: async frame reading and writing
//! - `network`: listener, connection tasks and tick driver
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod codec;
pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod physics;
pub mod session;
pub mod utils;
pub mod world;
