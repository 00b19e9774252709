//! The single exclusion domain of the server.
//!
//! `World` pairs the game state with the connection registry so that admission,
//! intent application, teardown and a whole tick each happen under one lock.
//! Broadcasting from inside the tick therefore never reaches a channel whose
//! player was already removed, and never misses one that was just added.

use crate::client_manager::{ClientManager, Frame};
use crate::config::ServerConfig;
use crate::game::{GameState, Intent};
use crate::utils;
use log::{debug, error};
use rand::Rng;
use shared::{encode_frame, Packet, FRAME_HEADER_LEN, MAX_FRAME_LEN};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Result of an admission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted { player_id: u32 },
    Rejected,
}

pub struct World {
    pub game: GameState,
    pub clients: ClientManager,
}

impl World {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            game: GameState::new(config.rules.clone()),
            clients: ClientManager::new(config.max_players),
        }
    }

    /// Admits a connection if capacity allows.
    ///
    /// On success the player exists in the game state, its channel is
    /// registered, and the handshake is already queued as its first frame.
    pub fn admit<R: Rng>(
        &mut self,
        addr: SocketAddr,
        sender: mpsc::Sender<Frame>,
        now: Instant,
        rng: &mut R,
    ) -> Admission {
        if self.game.player_count() >= self.clients.max_clients() {
            return Admission::Rejected;
        }
        let Some(player_id) = self.clients.add_client(addr, sender) else {
            return Admission::Rejected;
        };

        self.game.upsert_player(player_id, utils::random_color(rng));
        self.game.maybe_start_session(now);

        let handshake = Packet::Handshake {
            player_id,
            max_players: self.clients.max_clients() as u32,
        };
        match encode_frame(&handshake) {
            Ok(frame) => {
                self.clients.send_to(player_id, Frame::from(frame));
            }
            Err(e) => error!("Failed to encode handshake for {}: {}", player_id, e),
        }

        Admission::Accepted { player_id }
    }

    /// Tears a player down. Safe to call any number of times.
    pub fn disconnect(&mut self, player_id: u32) {
        let removed_player = self.game.remove_player(player_id);
        let removed_client = self.clients.remove_client(player_id);
        if !removed_player && !removed_client {
            debug!("Player {} already torn down", player_id);
        }
    }

    /// Applies one decoded packet received from a client.
    pub fn apply_packet(&mut self, packet: &Packet) {
        match Intent::from_packet(packet) {
            Some((player_id, intent)) => self.game.apply_intent(player_id, intent),
            None => debug!("Discarding non-intent packet from client"),
        }
    }

    /// Runs one full tick and fans the resulting snapshot out.
    /// Returns the number of clients the snapshot was queued for.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.game.step(now);

        let packet = self.game.snapshot(now).to_packet();
        let frame = match encode_frame(&packet) {
            Ok(frame) => Frame::from(frame),
            Err(e) => {
                error!("Failed to encode snapshot on tick {}: {}", self.game.tick, e);
                return 0;
            }
        };
        // Clients drop the stream on an oversized frame.
        if frame.len() - FRAME_HEADER_LEN > MAX_FRAME_LEN {
            error!(
                "Snapshot on tick {} is {} bytes, above the {} byte limit",
                self.game.tick,
                frame.len() - FRAME_HEADER_LEN,
                MAX_FRAME_LEN
            );
            return 0;
        }

        let delivered = self.clients.broadcast(&frame);
        if self.game.tick % 300 == 0 && !self.clients.is_empty() {
            debug!(
                "Tick {}: {} players, {} bullets, snapshot {} bytes to {}/{} clients",
                self.game.tick,
                self.game.player_count(),
                self.game.bullets.len(),
                frame.len(),
                delivered,
                self.clients.len()
            );
        }
        delivered
    }
}

/// Shared handle used by every task.
pub type SharedWorld = Arc<tokio::sync::Mutex<World>>;
