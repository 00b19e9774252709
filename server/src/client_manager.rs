//! Connection registry for the arena server
//!
//! This module owns every connected client's outbound channel:
//! - Identity allocation from a monotonic counter that never reuses ids
//! - Capacity enforcement at admission
//! - Best-effort fan-out of encoded frames to every registered client
//!
//! Nothing outside the connection lifecycle adds or removes entries. Sends
//! never block: a full or closed channel drops the frame for that client only,
//! and the client's own reader task is responsible for tearing it down.

use log::{debug, info};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};

/// One encoded frame, shared by every recipient of a broadcast
pub type Frame = Arc<[u8]>;

/// Outbound queue depth per client before frames start being dropped
pub const OUTBOUND_QUEUE_LEN: usize = 64;

/// A registered connection and the channel feeding its writer task
#[derive(Debug)]
pub struct Client {
    /// Player identity assigned at admission
    pub id: u32,
    /// Peer address, kept for logging
    pub addr: SocketAddr,
    /// When the connection was admitted
    pub connected_at: Instant,
    /// Producer side of the writer task's queue
    pub sender: mpsc::Sender<Frame>,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr, sender: mpsc::Sender<Frame>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a frame without waiting. Returns false if it was dropped.
    pub fn try_send(&self, frame: Frame) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Outbound queue full for client {}, dropping frame", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Outbound queue closed for client {}", self.id);
                false
            }
        }
    }
}

/// Tracks all admitted clients and enforces the capacity ceiling
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next identity to hand out; never decremented
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty registry. Identities start from 0.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 0,
            max_clients,
        }
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }

    pub fn is_full(&self) -> bool {
        self.clients.len() >= self.max_clients
    }

    /// Registers a new connection
    ///
    /// Returns Some(client_id) if admitted, None if the server is at capacity.
    /// Rejected connections do not consume an identity.
    pub fn add_client(&mut self, addr: SocketAddr, sender: mpsc::Sender<Frame>) -> Option<u32> {
        if self.is_full() {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, sender));

        Some(client_id)
    }

    /// Removes a client. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: u32) -> bool {
        match self.clients.remove(&client_id) {
            Some(client) => {
                info!(
                    "Client {} from {} disconnected after {:.1}s",
                    client.id,
                    client.addr,
                    client.connected_at.elapsed().as_secs_f32()
                );
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, client_id: u32) -> bool {
        self.clients.contains_key(&client_id)
    }

    /// Sends a frame to one client. Returns false if unknown or dropped.
    pub fn send_to(&self, client_id: u32, frame: Frame) -> bool {
        self.clients
            .get(&client_id)
            .map(|client| client.try_send(frame))
            .unwrap_or(false)
    }

    /// Queues the same frame for every client, returning how many accepted it
    pub fn broadcast(&self, frame: &Frame) -> usize {
        self.clients
            .values()
            .filter(|client| client.try_send(Arc::clone(frame)))
            .count()
    }

    pub fn client_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.clients.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
