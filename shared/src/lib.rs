//! Wire protocol and default tuning shared by the arena server and its clients.
//!
//! Every message travels as one frame: a little-endian `u32` length followed by
//! a bincode-encoded [`Packet`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;
pub const MAX_PLAYERS: usize = 5;
pub const TICK_MILLIS: u64 = 30;
pub const BULLET_SPEED: f32 = 10.0;
pub const BULLET_DAMAGE: i32 = 25;
pub const MAX_HEALTH: i32 = 100;
pub const PLAYER_SIZE: f32 = 20.0;
pub const BULLET_SIZE: f32 = 8.0;
pub const SPAWN_X: f32 = 400.0;
pub const SPAWN_Y: f32 = 300.0;
pub const SESSION_SECS: u64 = 300;
pub const SESSION_START_THRESHOLD: usize = 4;
/// Live bullets the server keeps at once; further shots are dropped.
pub const MAX_BULLETS: usize = 2048;

/// Number of bytes in the length prefix of every frame.
pub const FRAME_HEADER_LEN: usize = 4;
/// Largest payload a peer may announce before the stream is considered corrupt.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

// Encoded sizes of the parts of a `State` payload.
const STATE_FIXED_LEN: usize = 4 + 8 + 8 + 4;
const STATE_PLAYER_LEN: usize = 4 + 8 + 3 + 4 + 4 + 1;
const STATE_BULLET_LEN: usize = 4 + 4 + 4;

/// Payload size of a `State` packet carrying `players` players and `bullets` bullets.
pub fn state_payload_len(players: usize, bullets: usize) -> usize {
    STATE_FIXED_LEN
        .saturating_add(players.saturating_mul(STATE_PLAYER_LEN))
        .saturating_add(bullets.saturating_mul(STATE_BULLET_LEN))
}

/// RGB display color, each channel in `0..=255`.
pub type Color = (u8, u8, u8);

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    /// Server -> client, once on admission.
    Handshake { player_id: u32, max_players: u32 },
    /// Server -> client, once before the server closes a refused connection.
    ServerFull,

    Move { player_id: u32, dx: f32, dy: f32 },
    /// `dx`/`dy` is a unit direction; the server scales it by the bullet speed.
    Shoot { player_id: u32, dx: f32, dy: f32 },

    /// Server -> client, every tick.
    State {
        players: BTreeMap<u32, PlayerView>,
        bullets: Vec<BulletView>,
        time_left: f32,
    },
}

impl Packet {
    /// Returns true for packets a client is allowed to send.
    pub fn is_intent(&self) -> bool {
        matches!(self, Packet::Move { .. } | Packet::Shoot { .. })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub pos: (f32, f32),
    pub color: Color,
    pub health: i32,
    pub kills: u32,
    pub is_dead: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BulletView {
    pub x: f32,
    pub y: f32,
    pub owner_id: u32,
}

/// Serializes a packet into a complete frame, length prefix included.
pub fn encode_frame(packet: &Packet) -> bincode::Result<Vec<u8>> {
    let payload = bincode::serialize(packet)?;
    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decodes the payload of a frame (without its length prefix).
pub fn decode_payload(payload: &[u8]) -> bincode::Result<Packet> {
    bincode::deserialize(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample_state() -> Packet {
        let mut players = BTreeMap::new();
        players.insert(
            3,
            PlayerView {
                pos: (12.5, 40.0),
                color: (50, 120, 255),
                health: 75,
                kills: 2,
                is_dead: false,
            },
        );
        Packet::State {
            players,
            bullets: vec![BulletView {
                x: 100.0,
                y: 200.0,
                owner_id: 3,
            }],
            time_left: 299.5,
        }
    }

    #[test]
    fn test_frame_prefix_matches_payload_length() {
        let frame = encode_frame(&Packet::ServerFull).unwrap();
        let len = u32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
        assert_eq!(len, frame.len() - FRAME_HEADER_LEN);
    }

    #[test]
    fn test_state_frame_decodes() {
        let frame = encode_frame(&sample_state()).unwrap();
        let decoded = decode_payload(&frame[FRAME_HEADER_LEN..]).unwrap();

        match decoded {
            Packet::State {
                players,
                bullets,
                time_left,
            } => {
                assert_eq!(players[&3].health, 75);
                assert_eq!(players[&3].color, (50, 120, 255));
                assert_eq!(bullets.len(), 1);
                assert_approx_eq!(time_left, 299.5);
            }
            other => panic!("Wrong packet type after decoding: {:?}", other),
        }
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let a = encode_frame(&sample_state()).unwrap();
        let b = encode_frame(&sample_state()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_full_arena_state_fits_one_frame() {
        let view = PlayerView {
            pos: (1.0, 2.0),
            color: (50, 50, 50),
            health: 100,
            kills: 0,
            is_dead: false,
        };
        let players = (0..MAX_PLAYERS as u32).map(|id| (id, view)).collect();
        let bullets = vec![
            BulletView {
                x: 0.0,
                y: 0.0,
                owner_id: 0,
            };
            MAX_BULLETS
        ];
        let frame = encode_frame(&Packet::State {
            players,
            bullets,
            time_left: 0.0,
        })
        .unwrap();

        let payload_len = frame.len() - FRAME_HEADER_LEN;
        assert_eq!(payload_len, state_payload_len(MAX_PLAYERS, MAX_BULLETS));
        assert!(payload_len <= MAX_FRAME_LEN);
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        let frame = encode_frame(&Packet::Move {
            player_id: 1,
            dx: 1.0,
            dy: 0.0,
        })
        .unwrap();
        let payload = &frame[FRAME_HEADER_LEN..];

        assert!(decode_payload(&payload[..payload.len() / 2]).is_err());
        assert!(decode_payload(&[0xFF, 0xFF, 0xFF, 0xFF]).is_err());
        assert!(decode_payload(&[]).is_err());
    }

    #[test]
    fn test_intent_classification() {
        assert!(Packet::Move {
            player_id: 0,
            dx: 0.0,
            dy: 0.0
        }
        .is_intent());
        assert!(Packet::Shoot {
            player_id: 0,
            dx: 1.0,
            dy: 0.0
        }
        .is_intent());
        assert!(!Packet::ServerFull.is_intent());
        assert!(!sample_state().is_intent());
    }
}
