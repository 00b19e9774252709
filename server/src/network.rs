//! Server network layer: TCP admission, per-connection tasks and the tick driver

use crate::client_manager::{Frame, OUTBOUND_QUEUE_LEN};
use crate::codec::{read_frame, write_packet};
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::world::{Admission, SharedWorld, World};
use log::{debug, error, info, warn};
use shared::{decode_payload, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};

/// Authoritative arena server
///
/// Runs one task per connection for ingestion, one writer task per
/// connection draining its outbound queue, and a single tick task that
/// advances the world and broadcasts snapshots.
pub struct Server {
    listener: TcpListener,
    world: SharedWorld,
    tick_period: Duration,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> ServerResult<Self> {
        config.validate()?;

        let address = config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                addr: address.clone(),
                source,
            })?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            world: Arc::new(Mutex::new(World::new(&config))),
            tick_period: config.tick_period,
        })
    }

    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the shared world, mostly for inspection in tests
    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// Spawns the tick driver and accepts connections forever
    pub async fn run(self) -> ServerResult<()> {
        tokio::spawn(run_tick_loop(Arc::clone(&self.world), self.tick_period));

        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    tokio::spawn(handle_connection(stream, addr, Arc::clone(&self.world)));
                }
                Err(e) => {
                    error!("Accept error: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

/// Advances the world on a fixed period. Never blocks on client IO.
async fn run_tick_loop(world: SharedWorld, period: Duration) {
    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick fires immediately
    timer.tick().await;

    loop {
        timer.tick().await;
        world.lock().await.tick(Instant::now());
    }
}

/// Admission, ingestion and teardown for one connection
async fn handle_connection(mut stream: TcpStream, addr: SocketAddr, world: SharedWorld) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Could not disable Nagle for {}: {}", addr, e);
    }

    let (tx, rx) = mpsc::channel::<Frame>(OUTBOUND_QUEUE_LEN);
    let admission = {
        let mut world = world.lock().await;
        world.admit(addr, tx, Instant::now(), &mut rand::thread_rng())
    };

    let player_id = match admission {
        Admission::Accepted { player_id } => player_id,
        Admission::Rejected => {
            info!("Server full, rejecting {}", addr);
            if let Err(e) = write_packet(&mut stream, &Packet::ServerFull).await {
                debug!("Failed to notify {} of full server: {}", addr, e);
            }
            let _ = stream.shutdown().await;
            return;
        }
    };

    let (reader, writer) = stream.into_split();
    let writer_task = tokio::spawn(write_outbound(writer, rx, player_id));

    match ingest(reader, &world, player_id).await {
        Ok(()) => info!("Player {} closed the connection", player_id),
        Err(e) => info!("Player {} connection ended: {}", player_id, e),
    }

    world.lock().await.disconnect(player_id);
    // Dropping the registry entry closes the queue; the writer drains and exits.
    if let Err(e) = writer_task.await {
        error!("Writer task for player {} panicked: {}", player_id, e);
    }
}

/// Reads intents until the peer closes or the stream faults
async fn ingest(mut reader: OwnedReadHalf, world: &SharedWorld, player_id: u32) -> ServerResult<()> {
    while let Some(payload) = read_frame(&mut reader).await? {
        let packet = match decode_payload(&payload) {
            Ok(packet) => packet,
            Err(e) => {
                debug!("Discarding undecodable frame from player {}: {}", player_id, e);
                continue;
            }
        };

        if !packet.is_intent() {
            warn!("Unexpected packet type from player {}", player_id);
            continue;
        }

        world.lock().await.apply_packet(&packet);
    }
    Ok(())
}

/// Drains one client's outbound queue into its socket
async fn write_outbound(mut writer: OwnedWriteHalf, mut rx: mpsc::Receiver<Frame>, player_id: u32) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            debug!("Write to player {} failed: {}", player_id, e);
            break;
        }
    }
    let _ = writer.shutdown().await;
}
