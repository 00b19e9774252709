//! Headless client that joins the arena, wanders, fires at the nearest
//! opponent and logs what it sees. Useful for filling a server by hand.

use clap::Parser;
use log::{info, warn};
use rand::Rng;
use server::codec::{read_frame, write_packet};
use server::utils::normalize_vector;
use shared::{decode_payload, Packet, PlayerView};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server address to connect to
    #[clap(short, long, default_value = "127.0.0.1:5555")]
    server: String,
    /// Milliseconds between bot actions
    #[clap(short, long, default_value = "100")]
    action_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let stream = TcpStream::connect(&args.server).await?;
    let (mut reader, mut writer) = stream.into_split();

    let player_id = match read_frame(&mut reader).await? {
        Some(payload) => match decode_payload(&payload)? {
            Packet::Handshake {
                player_id,
                max_players,
            } => {
                info!("Joined as player {} (max {} players)", player_id, max_players);
                player_id
            }
            Packet::ServerFull => {
                warn!("Server is full");
                return Ok(());
            }
            other => return Err(format!("Expected handshake, got {:?}", other).into()),
        },
        None => return Err("Server closed the connection".into()),
    };

    let latest: Arc<Mutex<BTreeMap<u32, PlayerView>>> = Arc::new(Mutex::new(BTreeMap::new()));

    let receiver = {
        let latest = Arc::clone(&latest);
        tokio::spawn(async move {
            let mut frames = 0u64;
            while let Ok(Some(payload)) = read_frame(&mut reader).await {
                if let Ok(Packet::State {
                    players,
                    bullets,
                    time_left,
                }) = decode_payload(&payload)
                {
                    frames += 1;
                    if frames % 100 == 0 {
                        let me = players.get(&player_id);
                        info!(
                            "{} players, {} bullets, {:.0}s left, me: {:?}",
                            players.len(),
                            bullets.len(),
                            time_left,
                            me.map(|p| (p.health, p.kills, p.is_dead))
                        );
                    }
                    *latest.lock().await = players;
                }
            }
            info!("Server closed the connection");
        })
    };

    let mut timer = interval(Duration::from_millis(args.action_ms));
    loop {
        timer.tick().await;
        if receiver.is_finished() {
            break;
        }

        let intent = {
            let players = latest.lock().await;
            let Some(me) = players.get(&player_id) else {
                continue;
            };
            let target = players
                .iter()
                .filter(|(id, p)| **id != player_id && !p.is_dead)
                .min_by(|(_, a), (_, b)| {
                    distance_sq(me, a)
                        .partial_cmp(&distance_sq(me, b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

            let mut rng = rand::thread_rng();
            match target {
                Some((_, target)) if rng.gen_bool(0.3) => {
                    let (dx, dy) = normalize_vector(target.pos.0 - me.pos.0, target.pos.1 - me.pos.1);
                    Packet::Shoot { player_id, dx, dy }
                }
                _ => Packet::Move {
                    player_id,
                    dx: rng.gen_range(-5.0..=5.0),
                    dy: rng.gen_range(-5.0..=5.0),
                },
            }
        };

        if let Err(e) = write_packet(&mut writer, &intent).await {
            warn!("Failed to send intent: {}", e);
            break;
        }
    }

    Ok(())
}

fn distance_sq(a: &PlayerView, b: &PlayerView) -> f32 {
    let dx = a.pos.0 - b.pos.0;
    let dy = a.pos.1 - b.pos.1;
    dx * dx + dy * dy
}
