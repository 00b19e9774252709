//! Tunable server settings
//!
//! Defaults reproduce the reference arena: 800x600, five players, a 30ms tick
//! and a five minute session that starts once four players have joined.

use crate::error::{ServerError, ServerResult};
use shared::{
    state_payload_len, ARENA_HEIGHT, ARENA_WIDTH, BULLET_DAMAGE, BULLET_SIZE, BULLET_SPEED,
    MAX_BULLETS, MAX_FRAME_LEN, MAX_HEALTH, MAX_PLAYERS, PLAYER_SIZE, SESSION_SECS,
    SESSION_START_THRESHOLD, SPAWN_X, SPAWN_Y, TICK_MILLIS,
};
use std::time::Duration;

/// Simulation rules applied by the game state every tick
#[derive(Debug, Clone, PartialEq)]
pub struct GameRules {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Units per tick a bullet travels along its unit direction
    pub bullet_speed: f32,
    pub damage: i32,
    pub max_health: i32,
    /// Edge length of the square player hitbox, centered on the position
    pub player_size: f32,
    /// Edge length of the square bullet hitbox, centered on the position
    pub bullet_size: f32,
    pub spawn: (f32, f32),
    pub session_duration: Duration,
    /// Player count that starts the session clock the first time it is reached
    pub session_start_threshold: usize,
    /// `None` keeps dead players dead for the rest of the process
    pub respawn_delay: Option<Duration>,
    /// Live bullets kept at once; shots past this are dropped
    pub max_bullets: usize,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            bullet_speed: BULLET_SPEED,
            damage: BULLET_DAMAGE,
            max_health: MAX_HEALTH,
            player_size: PLAYER_SIZE,
            bullet_size: BULLET_SIZE,
            spawn: (SPAWN_X, SPAWN_Y),
            session_duration: Duration::from_secs(SESSION_SECS),
            session_start_threshold: SESSION_START_THRESHOLD,
            respawn_delay: None,
            max_bullets: MAX_BULLETS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_players: usize,
    pub tick_period: Duration,
    pub rules: GameRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5555,
            max_players: MAX_PLAYERS,
            tick_period: Duration::from_millis(TICK_MILLIS),
            rules: GameRules::default(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Rejects settings the simulation cannot run with
    pub fn validate(&self) -> ServerResult<()> {
        let invalid =
            |reason: &str| -> ServerResult<()> { Err(ServerError::InvalidConfig(reason.to_string())) };

        if self.max_players == 0 {
            return invalid("max_players must be at least 1");
        }
        if self.max_players > u32::MAX as usize {
            return invalid("max_players does not fit the handshake");
        }
        if self.tick_period.is_zero() {
            return invalid("tick period must be non-zero");
        }

        let rules = &self.rules;
        if rules.arena_width <= 0.0 || rules.arena_height <= 0.0 {
            return invalid("arena dimensions must be positive");
        }
        if rules.max_health <= 0 || rules.damage <= 0 {
            return invalid("health and damage must be positive");
        }
        if rules.player_size < 0.0 || rules.bullet_size < 0.0 {
            return invalid("hitbox sizes must not be negative");
        }
        if rules.session_start_threshold == 0 {
            return invalid("session start threshold must be at least 1");
        }
        if state_payload_len(self.max_players, rules.max_bullets) > MAX_FRAME_LEN {
            return invalid("max_players and max_bullets allow snapshots above the frame limit");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_arena() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "127.0.0.1:5555");
        assert_eq!(config.max_players, 5);
        assert_eq!(config.tick_period, Duration::from_millis(30));
        assert_eq!(config.rules.damage, 25);
        assert_eq!(config.rules.session_duration, Duration::from_secs(300));
        assert_eq!(config.rules.session_start_threshold, 4);
        assert!(config.rules.respawn_delay.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ServerConfig {
            max_players: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ServerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let config = ServerConfig {
            tick_period: Duration::ZERO,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_snapshots_above_frame_limit() {
        let mut config = ServerConfig::default();
        config.rules.max_bullets = 6000;
        assert!(matches!(
            config.validate(),
            Err(ServerError::InvalidConfig(_))
        ));

        let config = ServerConfig {
            max_players: 3000,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_arena() {
        let mut config = ServerConfig::default();
        config.rules.arena_width = 0.0;
        assert!(config.validate().is_err());
    }
}
