//! Authoritative world state: players, live bullets and the match clock.
//!
//! Every method is total. Operations naming a player that is gone (or dead,
//! for intents) are silent no-ops, which covers the race between a disconnect
//! and an intent already in flight.

use crate::config::GameRules;
use crate::physics::{self, HitEvent};
use crate::session::GameSession;
use log::{debug, info};
use shared::{BulletView, Color, Packet, PlayerView};
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub color: Color,
    pub health: i32,
    pub kills: u32,
    pub is_dead: bool,
    /// When the player last died; drives timed respawn.
    pub died_at: Option<Instant>,
}

impl Player {
    pub fn new(id: u32, x: f32, y: f32, color: Color, health: i32) -> Self {
        Self {
            id,
            x,
            y,
            color,
            health,
            kills: 0,
            is_dead: false,
            died_at: None,
        }
    }

    /// Subtracts `damage`, clamping at zero. Returns true if this hit killed.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        self.health = (self.health - damage).max(0);
        if self.health == 0 && !self.is_dead {
            self.is_dead = true;
            return true;
        }
        false
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            pos: (self.x, self.y),
            color: self.color,
            health: self.health,
            kills: self.kills,
            is_dead: self.is_dead,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    /// Velocity in units per tick
    pub dx: f32,
    pub dy: f32,
    pub owner_id: u32,
}

impl Bullet {
    pub fn view(&self) -> BulletView {
        BulletView {
            x: self.x,
            y: self.y,
            owner_id: self.owner_id,
        }
    }
}

/// Client-originated request to change its own player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Move { dx: f32, dy: f32 },
    /// Unit direction; scaled by the bullet speed on application.
    Shoot { dx: f32, dy: f32 },
}

impl Intent {
    /// Splits an inbound packet into its issuer and intent.
    /// Server-to-client packets yield `None`.
    pub fn from_packet(packet: &Packet) -> Option<(u32, Intent)> {
        match *packet {
            Packet::Move { player_id, dx, dy } => Some((player_id, Intent::Move { dx, dy })),
            Packet::Shoot { player_id, dx, dy } => Some((player_id, Intent::Shoot { dx, dy })),
            Packet::Handshake { .. } | Packet::ServerFull | Packet::State { .. } => None,
        }
    }
}

/// Consistent copy of the world at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub players: BTreeMap<u32, Player>,
    pub bullets: Vec<Bullet>,
    pub time_left: f32,
}

impl Snapshot {
    pub fn to_packet(&self) -> Packet {
        Packet::State {
            players: self.players.iter().map(|(id, p)| (*id, p.view())).collect(),
            bullets: self.bullets.iter().map(Bullet::view).collect(),
            time_left: self.time_left,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u64,
    pub players: BTreeMap<u32, Player>,
    pub bullets: Vec<Bullet>,
    pub session: GameSession,
    pub rules: GameRules,
}

impl GameState {
    pub fn new(rules: GameRules) -> Self {
        Self {
            tick: 0,
            players: BTreeMap::new(),
            bullets: Vec::new(),
            session: GameSession::new(rules.session_duration),
            rules,
        }
    }

    /// Creates a fresh player at the spawn point, or replaces an existing one.
    pub fn upsert_player(&mut self, id: u32, color: Color) {
        let (x, y) = self.rules.spawn;
        let player = Player::new(id, x, y, color, self.rules.max_health);

        info!("Added player {} at ({}, {})", id, x, y);
        self.players.insert(id, player);
    }

    /// Removes a player if present. Bullets it already fired stay in flight.
    pub fn remove_player(&mut self, id: u32) -> bool {
        let removed = self.players.remove(&id).is_some();
        if removed {
            info!("Removed player {}", id);
        }
        removed
    }

    /// Starts the session clock once the roster reaches the threshold.
    pub fn maybe_start_session(&mut self, now: Instant) -> bool {
        if self.players.len() >= self.rules.session_start_threshold && self.session.start(now) {
            info!(
                "Session started with {} players, {}s on the clock",
                self.players.len(),
                self.rules.session_duration.as_secs()
            );
            return true;
        }
        false
    }

    pub fn apply_move(&mut self, id: u32, dx: f32, dy: f32) {
        match self.players.get_mut(&id) {
            Some(player) if !player.is_dead => {
                player.x += dx;
                player.y += dy;
            }
            _ => debug!("Ignoring move from absent or dead player {}", id),
        }
    }

    /// Adds a bullet unless the arena already holds `max_bullets`.
    pub fn append_bullet(&mut self, bullet: Bullet) -> bool {
        if self.bullets.len() >= self.rules.max_bullets {
            debug!(
                "Dropping shot from player {}: {} bullets live",
                bullet.owner_id,
                self.bullets.len()
            );
            return false;
        }
        self.bullets.push(bullet);
        true
    }

    /// Fires a bullet from the player's current position along `(dx, dy)`.
    pub fn apply_shoot(&mut self, id: u32, dx: f32, dy: f32) {
        let speed = self.rules.bullet_speed;
        let bullet = match self.players.get(&id) {
            Some(player) if !player.is_dead => Bullet {
                x: player.x,
                y: player.y,
                dx: dx * speed,
                dy: dy * speed,
                owner_id: id,
            },
            _ => {
                debug!("Ignoring shot from absent or dead player {}", id);
                return;
            }
        };
        self.append_bullet(bullet);
    }

    pub fn apply_intent(&mut self, id: u32, intent: Intent) {
        match intent {
            Intent::Move { dx, dy } => self.apply_move(id, dx, dy),
            Intent::Shoot { dx, dy } => self.apply_shoot(id, dx, dy),
        }
    }

    pub fn replace_bullets(&mut self, bullets: Vec<Bullet>) {
        self.bullets = bullets;
    }

    /// Advances the world by one tick: respawn, integrate, cull, collide.
    ///
    /// Respawns run first so a player killed on this tick is dead in its snapshot.
    pub fn step(&mut self, now: Instant) -> Vec<HitEvent> {
        self.respawn_due(now);

        physics::integrate_bullets(&mut self.bullets);
        physics::cull_out_of_bounds(
            &mut self.bullets,
            self.rules.arena_width,
            self.rules.arena_height,
        );

        let bullets = std::mem::take(&mut self.bullets);
        let outcome = physics::resolve_collisions(bullets, &mut self.players, &self.rules);
        self.replace_bullets(outcome.survivors);

        for hit in outcome.hits.iter().filter(|hit| hit.killed) {
            if let Some(victim) = self.players.get_mut(&hit.victim) {
                victim.died_at = Some(now);
            }
            info!("Player {} killed player {}", hit.shooter, hit.victim);
        }

        self.tick += 1;

        outcome.hits
    }

    fn respawn_due(&mut self, now: Instant) {
        let Some(delay) = self.rules.respawn_delay else {
            return;
        };
        let (x, y) = self.rules.spawn;
        let max_health = self.rules.max_health;

        for player in self.players.values_mut() {
            let due = matches!(player.died_at, Some(died_at) if now.saturating_duration_since(died_at) >= delay);
            if player.is_dead && due {
                player.x = x;
                player.y = y;
                player.health = max_health;
                player.is_dead = false;
                player.died_at = None;
                info!("Player {} respawned", player.id);
            }
        }
    }

    pub fn snapshot(&self, now: Instant) -> Snapshot {
        Snapshot {
            players: self.players.clone(),
            bullets: self.bullets.clone(),
            time_left: self.session.time_left(now),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
