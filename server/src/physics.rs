use crate::config::GameRules;
use crate::game::{Bullet, Player};
use std::collections::BTreeMap;

/// Axis-aligned box with inclusive edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Aabb {
    /// Square box of edge `size` centered on `(x, y)`.
    pub fn centered(x: f32, y: f32, size: f32) -> Self {
        let half = size / 2.0;
        Aabb {
            left: x - half,
            right: x + half,
            top: y - half,
            bottom: y + half,
        }
    }

    /// Touching edges count as an overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right >= other.left
            && self.left <= other.right
            && self.bottom >= other.top
            && self.top <= other.bottom
    }
}

/// One bullet striking one player during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitEvent {
    pub shooter: u32,
    pub victim: u32,
    /// The hit took the victim's health to zero.
    pub killed: bool,
}

#[derive(Debug, Default)]
pub struct CollisionOutcome {
    /// Bullets that hit nothing, in their original order.
    pub survivors: Vec<Bullet>,
    pub hits: Vec<HitEvent>,
}

/// Moves every bullet by its velocity exactly once.
pub fn integrate_bullets(bullets: &mut [Bullet]) {
    for bullet in bullets.iter_mut() {
        bullet.x += bullet.dx;
        bullet.y += bullet.dy;
    }
}

/// Drops bullets outside the closed rectangle `[0, width] x [0, height]`.
pub fn cull_out_of_bounds(bullets: &mut Vec<Bullet>, width: f32, height: f32) {
    bullets.retain(|b| (0.0..=width).contains(&b.x) && (0.0..=height).contains(&b.y));
}

/// Resolves bullet/player hits against the current player set.
///
/// Players are tested in ascending id order and the first overlapping living
/// non-owner takes the hit. A bullet that hits is consumed; one that misses
/// survives. Kill credit goes to the owner only if it is still connected.
pub fn resolve_collisions(
    bullets: Vec<Bullet>,
    players: &mut BTreeMap<u32, Player>,
    rules: &GameRules,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome {
        survivors: Vec::with_capacity(bullets.len()),
        hits: Vec::new(),
    };

    for bullet in bullets {
        let bullet_box = Aabb::centered(bullet.x, bullet.y, rules.bullet_size);

        let victim_id = players
            .values()
            .filter(|p| p.id != bullet.owner_id && !p.is_dead)
            .find(|p| Aabb::centered(p.x, p.y, rules.player_size).overlaps(&bullet_box))
            .map(|p| p.id);

        let Some(victim_id) = victim_id else {
            outcome.survivors.push(bullet);
            continue;
        };

        let killed = players
            .get_mut(&victim_id)
            .map(|victim| victim.apply_damage(rules.damage))
            .unwrap_or(false);

        if killed {
            if let Some(owner) = players.get_mut(&bullet.owner_id) {
                owner.kills += 1;
            }
        }

        outcome.hits.push(HitEvent {
            shooter: bullet.owner_id,
            victim: victim_id,
            killed,
        });
    }

    outcome
}
