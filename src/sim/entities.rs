//! Short-lived scene entities
//!
//! Every kind follows the same lifecycle: spawned by a timer, advanced once
//! per frame, pruned once expired or out of the scene. Collections are flat
//! `Vec`s kept in insertion order.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY, VIEW_H, VIEW_W};

/// Entities that age toward a fixed lifetime
pub trait Lifetime {
    fn life(&self) -> f32;
    fn max_life(&self) -> f32;
    fn life_mut(&mut self) -> &mut f32;

    /// Add `dt` to life, never past `max_life`
    fn age(&mut self, dt: f32) {
        let max = self.max_life();
        let life = self.life_mut();
        *life = (*life + dt.max(0.0)).min(max);
    }

    fn is_expired(&self) -> bool {
        self.life() >= self.max_life()
    }

    /// Fraction of life used, in [0, 1]
    fn progress(&self) -> f32 {
        if self.max_life() <= 0.0 {
            1.0
        } else {
            (self.life() / self.max_life()).clamp(0.0, 1.0)
        }
    }
}

/// Drop every expired entity
pub fn prune_expired<T: Lifetime>(items: &mut Vec<T>) {
    items.retain(|item| !item.is_expired());
}

/// Age every entity by `dt` and drop the expired ones
pub fn age_and_prune<T: Lifetime>(items: &mut Vec<T>, dt: f32) {
    for item in items.iter_mut() {
        item.age(dt);
    }
    prune_expired(items);
}

/// Countdown until the next spawn
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnTimer {
    remaining: f32,
}

impl SpawnTimer {
    pub fn new(initial: f32) -> Self {
        Self { remaining: initial }
    }

    /// Count down by `dt`; true once the timer has run out
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.ready()
    }

    pub fn ready(&self) -> bool {
        self.remaining <= 0.0
    }

    pub fn reset(&mut self, interval: f32) {
        self.remaining = interval;
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}

// === Meteors ===

/// Meteors fall at a fraction of actor gravity
pub const METEOR_GRAVITY_SCALE: f32 = 0.6;
/// Meteor entry height (above the scene)
pub const METEOR_SPAWN_Y: f32 = -30.0;
/// Meteors below this are discarded
pub const METEOR_FLOOR: f32 = VIEW_H + 100.0;
/// Most recent active meteors kept when a new one spawns
pub const MAX_METEORS: usize = 40;

/// Seconds between meteors, shrinking as the run goes on
pub fn meteor_interval(elapsed: f32) -> f32 {
    (1.5 - elapsed * 0.02).max(0.4)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meteor {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Cleared once the meteor bursts on a ridge
    pub active: bool,
}

impl Meteor {
    pub fn random<R: Rng + ?Sized>(id: u32, rng: &mut R) -> Self {
        let x = rng.random::<f32>() * VIEW_W;
        let radius = 10.0 + rng.random::<f32>() * 10.0;
        let drift = (rng.random::<f32>() - 0.5) * 60.0;
        Self {
            id,
            pos: Vec2::new(x, METEOR_SPAWN_Y),
            vel: Vec2::new(drift, 100.0),
            radius,
            active: true,
        }
    }

    /// Move with the current velocity, then accelerate
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel.y += GRAVITY * METEOR_GRAVITY_SCALE * dt;
    }

    pub fn out_of_scene(&self) -> bool {
        self.pos.y >= METEOR_FLOOR
    }
}

// === Explosions ===

pub const EXPLOSION_RADIUS: f32 = 60.0;
pub const EXPLOSION_LIFE: f32 = 0.5;
/// Share of an explosion's life during which it hurts
pub const EXPLOSION_DAMAGE_FRACTION: f32 = 0.35;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub id: u32,
    pub pos: Vec2,
    pub life: f32,
    pub max_life: f32,
    /// Blast radius
    pub radius: f32,
}

impl Explosion {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            life: 0.0,
            max_life: EXPLOSION_LIFE,
            radius: EXPLOSION_RADIUS,
        }
    }

    pub fn is_damaging(&self) -> bool {
        self.life < self.max_life * EXPLOSION_DAMAGE_FRACTION
    }

    pub fn reaches(&self, point: Vec2) -> bool {
        self.pos.distance(point) <= self.radius
    }

    /// Drawn ring radius (grows while fading)
    pub fn ring_radius(&self) -> f32 {
        self.radius * (0.4 + 0.8 * self.progress())
    }
}

impl Lifetime for Explosion {
    fn life(&self) -> f32 {
        self.life
    }
    fn max_life(&self) -> f32 {
        self.max_life
    }
    fn life_mut(&mut self) -> &mut f32 {
        &mut self.life
    }
}

// === Fireflies ===

pub const FIREFLY_COUNT: usize = 25;
const FIREFLY_MIN_Y: f32 = 320.0;
const FIREFLY_MAX_Y: f32 = VIEW_H - 40.0;
const FIREFLY_EDGE: f32 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Firefly {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Firefly {
    /// Fly somewhere over the hills starting at `min_y`
    pub fn random<R: Rng + ?Sized>(id: u32, min_y: f32, rng: &mut R) -> Self {
        Self {
            id,
            pos: Vec2::new(
                rng.random::<f32>() * VIEW_W,
                min_y + rng.random::<f32>() * 200.0,
            ),
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 40.0,
                (rng.random::<f32>() - 0.5) * 20.0,
            ),
        }
    }

    /// Initial swarm
    pub fn swarm<R: Rng + ?Sized>(rng: &mut R) -> Vec<Self> {
        (0..FIREFLY_COUNT)
            .map(|i| Self::random(i as u32 + 1, 300.0, rng))
            .collect()
    }

    /// Random walk, bouncing off the meadow edges
    pub fn wander<R: Rng + ?Sized>(&mut self, dt: f32, rng: &mut R) {
        self.vel.x += (rng.random::<f32>() - 0.5) * 10.0 * dt;
        self.vel.y += (rng.random::<f32>() - 0.5) * 10.0 * dt;
        self.vel.x = self.vel.x.clamp(-60.0, 60.0);
        self.vel.y = self.vel.y.clamp(-40.0, 40.0);
        self.pos += self.vel * dt;

        if self.pos.x < FIREFLY_EDGE {
            self.pos.x = FIREFLY_EDGE;
            self.vel.x = self.vel.x.abs();
        }
        if self.pos.x > VIEW_W - FIREFLY_EDGE {
            self.pos.x = VIEW_W - FIREFLY_EDGE;
            self.vel.x = -self.vel.x.abs();
        }
        if self.pos.y < FIREFLY_MIN_Y {
            self.pos.y = FIREFLY_MIN_Y;
            self.vel.y = self.vel.y.abs();
        }
        if self.pos.y > FIREFLY_MAX_Y {
            self.pos.y = FIREFLY_MAX_Y;
            self.vel.y = -self.vel.y.abs();
        }
    }
}

// === Wind gusts ===

pub const MAX_WIND_GUSTS: u32 = 12;
pub const WIND_SPAWN_INTERVAL: f32 = 0.1;
/// Gusts are dropped once this far left
const WIND_EXIT_X: f32 = -120.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindGust {
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    pub life: f32,
    pub max_life: f32,
    pub scale: f32,
}

impl WindGust {
    pub fn random<R: Rng + ?Sized>(id: u32, rng: &mut R) -> Self {
        let y = 60.0 + rng.random::<f32>() * (VIEW_H - 160.0);
        let speed = 60.0 + rng.random::<f32>() * 80.0;
        let scale = 0.7 + rng.random::<f32>() * 0.8;
        Self {
            id,
            pos: Vec2::new(VIEW_W + 40.0, y),
            speed,
            life: 0.0,
            max_life: (VIEW_W + 100.0) / speed,
            scale,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.pos.x -= self.speed * dt;
        self.age(dt);
    }

    pub fn is_gone(&self) -> bool {
        self.pos.x <= WIND_EXIT_X || self.is_expired()
    }
}

impl Lifetime for WindGust {
    fn life(&self) -> f32 {
        self.life
    }
    fn max_life(&self) -> f32 {
        self.max_life
    }
    fn life_mut(&mut self) -> &mut f32 {
        &mut self.life
    }
}

// === Shooting stars ===

pub const MAX_SHOOTING_STARS: u32 = 20;
pub const SHOOTING_STAR_INTERVAL: f32 = 0.6;
pub const SHOOTING_STAR_LIFE: f32 = 1.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShootingStar {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
}

impl ShootingStar {
    /// Starts near the top right, streaking at -35°
    pub fn random<R: Rng + ?Sized>(id: u32, rng: &mut R) -> Self {
        let y = 40.0 + rng.random::<f32>() * 160.0;
        let x = VIEW_W - rng.random::<f32>() * 200.0;
        let speed = 300.0 + rng.random::<f32>() * 200.0;
        let angle = (-35.0f32).to_radians();
        Self {
            id,
            pos: Vec2::new(x, y),
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 0.0,
            max_life: SHOOTING_STAR_LIFE,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.age(dt);
    }
}

impl Lifetime for ShootingStar {
    fn life(&self) -> f32 {
        self.life
    }
    fn max_life(&self) -> f32 {
        self.max_life
    }
    fn life_mut(&mut self) -> &mut f32 {
        &mut self.life
    }
}

// === Toasts ===

/// Floating label above a player ("Close +3")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u32,
    /// Index of the player it floats above
    pub player: usize,
    pub text: String,
    pub life: f32,
    pub max_life: f32,
}

impl Toast {
    pub fn new(id: u32, player: usize, text: impl Into<String>, max_life: f32) -> Self {
        Self {
            id,
            player,
            text: text.into(),
            life: 0.0,
            max_life,
        }
    }

    /// Vertical offset from the player's feet
    pub fn rise(&self) -> f32 {
        -20.0 - self.progress() * 20.0
    }
}

impl Lifetime for Toast {
    fn life(&self) -> f32 {
        self.life
    }
    fn max_life(&self) -> f32 {
        self.max_life
    }
    fn life_mut(&mut self) -> &mut f32 {
        &mut self.life
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_timer() {
        let mut timer = SpawnTimer::new(0.1);
        assert!(!timer.tick(0.05));
        assert!(timer.tick(0.06));
        timer.reset(1.0);
        assert!(!timer.tick(0.5));
    }

    #[test]
    fn test_meteor_interval_speeds_up() {
        assert_eq!(meteor_interval(0.0), 1.5);
        assert!((meteor_interval(25.0) - 1.0).abs() < 1e-6);
        assert_eq!(meteor_interval(500.0), 0.4);
    }

    #[test]
    fn test_meteor_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(7);
        for id in 0..100 {
            let m = Meteor::random(id, &mut rng);
            assert!(m.pos.x >= 0.0 && m.pos.x < VIEW_W);
            assert_eq!(m.pos.y, METEOR_SPAWN_Y);
            assert!(m.radius >= 10.0 && m.radius < 20.0);
            assert!(m.vel.x.abs() <= 30.0);
            assert_eq!(m.vel.y, 100.0);
        }
    }

    #[test]
    fn test_meteor_accelerates_after_moving() {
        let mut m = Meteor {
            id: 1,
            pos: Vec2::ZERO,
            vel: Vec2::new(0.0, 100.0),
            radius: 10.0,
            active: true,
        };
        m.advance(0.1);
        assert!((m.pos.y - 10.0).abs() < 1e-4);
        assert!((m.vel.y - 220.0).abs() < 1e-3);
    }

    #[test]
    fn test_explosion_damage_window() {
        let mut e = Explosion::new(1, Vec2::ZERO);
        assert!(e.is_damaging());
        e.age(0.17);
        assert!(e.is_damaging());
        e.age(0.02);
        assert!(!e.is_damaging());
        assert!(e.reaches(Vec2::new(60.0, 0.0)));
        assert!(!e.reaches(Vec2::new(60.5, 0.0)));
    }

    #[test]
    fn test_wind_gust_leaves_scene() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut gust = WindGust::random(1, &mut rng);
        assert_eq!(gust.pos.x, VIEW_W + 40.0);
        let mut frames = 0;
        while !gust.is_gone() {
            gust.advance(0.032);
            frames += 1;
            assert!(frames < 10_000);
        }
        assert!(gust.life <= gust.max_life);
    }

    #[test]
    fn test_shooting_star_heads_down_left() {
        let mut rng = Pcg32::seed_from_u64(11);
        let s = ShootingStar::random(1, &mut rng);
        // Screen y grows downward: -35° points up-right in screen space
        assert!(s.vel.x > 0.0);
        assert!(s.vel.y < 0.0);
        let speed = s.vel.length();
        assert!((300.0..=500.0).contains(&speed));
    }

    #[test]
    fn test_fireflies_stay_in_meadow() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut swarm = Firefly::swarm(&mut rng);
        assert_eq!(swarm.len(), FIREFLY_COUNT);
        for _ in 0..2000 {
            for f in swarm.iter_mut() {
                f.wander(0.032, &mut rng);
            }
        }
        for f in &swarm {
            assert!(f.pos.x >= FIREFLY_EDGE && f.pos.x <= VIEW_W - FIREFLY_EDGE);
            assert!(f.pos.y >= FIREFLY_MIN_Y && f.pos.y <= FIREFLY_MAX_Y);
        }
    }

    proptest! {
        #[test]
        fn prop_life_stays_within_bounds(steps in proptest::collection::vec(0.0f32..0.05, 1..80)) {
            let mut toasts = vec![
                Toast::new(1, 0, "Close +3", 0.9),
                Toast::new(2, 1, "Airtime +2", 0.8),
            ];
            for dt in steps {
                age_and_prune(&mut toasts, dt);
                for t in &toasts {
                    prop_assert!(t.life >= 0.0 && t.life < t.max_life);
                }
            }
        }
    }
}
