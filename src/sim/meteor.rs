//! Meteor Dodge: two players on the hills, meteors bursting on the crests
//!
//! `MeteorGame` owns the whole run. It advances on its own play clock so
//! spawn pacing and invulnerability only count time spent playing.

use std::fmt::{Display, Formatter};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::actor::{Actor, ActorInput, Facing, step};
use super::driver::FrameTime;
use super::entities::{
    Explosion, Lifetime, MAX_METEORS, Meteor, SpawnTimer, Toast, age_and_prune, meteor_interval,
};
use super::terrain::{Terrain, crest_at};
use crate::tuning::Tuning;

pub const PLAYER_LIVES: u8 = 3;
pub const PLAYER_ONE_SPAWN: Vec2 = Vec2::new(250.0, 515.0);
pub const PLAYER_TWO_SPAWN: Vec2 = Vec2::new(950.0, 525.0);
/// Jumps at least this long score a bonus on landing
pub const AIRTIME_MIN: f32 = 0.75;
pub const AIRTIME_POINTS: u32 = 2;
/// Invulnerability after losing a life (seconds)
pub const HIT_INVULNERABILITY: f32 = 1.0;
/// Extra distance beyond the blast that still counts as a close call
pub const CLOSE_BAND: f32 = 24.0;
pub const PERFECT_BAND: f32 = 10.0;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeteorPhase {
    /// Waiting for the start prompt
    #[default]
    Ready,
    Playing,
    /// Every player is out of lives
    GameOver,
}

/// Run result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    PlayerOne,
    PlayerTwo,
    Tie,
}

impl Display for Winner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::PlayerOne => write!(f, "Player 1 Wins"),
            Winner::PlayerTwo => write!(f, "Player 2 Wins"),
            Winner::Tie => write!(f, "Tie"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeteorPlayer {
    pub actor: Actor,
    pub lives: u8,
    pub score: u32,
    /// Consecutive dodges since the last hit
    pub streak: u32,
    pub invulnerable_until: f32,
    /// Play time at which the last life was lost
    pub death_at: Option<f32>,
}

impl MeteorPlayer {
    pub fn spawn(pos: Vec2, facing: Facing) -> Self {
        Self {
            actor: Actor::spawn(pos, facing),
            lives: PLAYER_LIVES,
            score: 0,
            streak: 0,
            invulnerable_until: 0.0,
            death_at: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn is_invulnerable(&self, now: f32) -> bool {
        now < self.invulnerable_until
    }

    fn pair() -> [Self; 2] {
        [
            Self::spawn(PLAYER_ONE_SPAWN, Facing::Right),
            Self::spawn(PLAYER_TWO_SPAWN, Facing::Left),
        ]
    }
}

/// Points for surviving a blast at `dist` from its centre, if any
fn dodge_points(dist: f32, blast_radius: f32) -> Option<(u32, Option<(&'static str, f32)>)> {
    if dist <= blast_radius {
        None
    } else if dist <= blast_radius + PERFECT_BAND {
        Some((5, Some(("Perfect +5", 0.9))))
    } else if dist <= blast_radius + CLOSE_BAND {
        Some((3, Some(("Close +3", 0.9))))
    } else {
        Some((1, None))
    }
}

pub struct MeteorGame {
    seed: u64,
    rng: Pcg32,
    tuning: Tuning,
    terrain: Terrain,
    phase: MeteorPhase,
    players: [MeteorPlayer; 2],
    meteors: Vec<Meteor>,
    explosions: Vec<Explosion>,
    toasts: Vec<Toast>,
    spawn_timer: SpawnTimer,
    /// Play time of the current run (seconds)
    clock: f32,
    /// Animation time, advancing in every phase
    idle_phase: f32,
    meteors_dodged: u32,
    next_id: u32,
}

impl MeteorGame {
    pub fn new(seed: u64) -> Self {
        Self::with_setup(seed, Tuning::default(), Terrain::hills())
    }

    pub fn with_setup(seed: u64, tuning: Tuning, terrain: Terrain) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            terrain,
            phase: MeteorPhase::Ready,
            players: MeteorPlayer::pair(),
            meteors: Vec::new(),
            explosions: Vec::new(),
            toasts: Vec::new(),
            spawn_timer: SpawnTimer::default(),
            clock: 0.0,
            idle_phase: 0.0,
            meteors_dodged: 0,
            next_id: 1,
        }
    }

    /// Leave the start prompt
    pub fn start(&mut self) {
        if self.phase == MeteorPhase::Ready {
            self.phase = MeteorPhase::Playing;
            log::info!("Meteor Dodge started (seed {})", self.seed);
        }
    }

    /// Fresh run with the same seed and terrain
    pub fn restart(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.players = MeteorPlayer::pair();
        self.meteors.clear();
        self.explosions.clear();
        self.toasts.clear();
        self.spawn_timer = SpawnTimer::default();
        self.clock = 0.0;
        self.meteors_dodged = 0;
        self.next_id = 1;
        self.phase = MeteorPhase::Playing;
        log::info!("Meteor Dodge restarted");
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn toast(&mut self, player: usize, text: impl Into<String>, max_life: f32) {
        let id = self.next_id();
        self.toasts.push(Toast::new(id, player, text, max_life));
    }

    /// Advance one frame; only `time.dt` is used
    pub fn tick(&mut self, inputs: &[ActorInput; 2], time: FrameTime) {
        let dt = time.dt;
        self.idle_phase += dt;
        age_and_prune(&mut self.toasts, dt);

        if self.phase != MeteorPhase::Playing {
            return;
        }

        self.clock += dt;
        let now = FrameTime::new(dt, self.clock);

        self.spawn_meteors(dt);
        self.step_players(inputs, now);
        self.advance_meteors(dt);
        self.advance_explosions(now);

        if self.players.iter().all(|p| !p.is_alive()) {
            self.phase = MeteorPhase::GameOver;
            log::info!(
                "Meteor Dodge over after {:.1}s: {} ({} - {})",
                self.clock,
                self.winner(),
                self.players[0].score,
                self.players[1].score
            );
        }
    }

    fn spawn_meteors(&mut self, dt: f32) {
        if !self.spawn_timer.tick(dt) {
            return;
        }
        self.spawn_timer.reset(meteor_interval(self.clock));

        self.meteors.retain(|m| m.active);
        if self.meteors.len() > MAX_METEORS {
            let excess = self.meteors.len() - MAX_METEORS;
            self.meteors.drain(..excess);
        }
        let id = self.next_id();
        let meteor = Meteor::random(id, &mut self.rng);
        self.meteors.push(meteor);
    }

    fn step_players(&mut self, inputs: &[ActorInput; 2], now: FrameTime) {
        let mut airtime = Vec::new();
        for (index, (player, input)) in self.players.iter_mut().zip(inputs).enumerate() {
            if !player.is_alive() {
                continue;
            }
            let prev = player.actor;
            let mut next = step(&prev, input, now, self.terrain.ridges_mut(), &self.tuning);

            // Landed this frame, possibly jumping again straight away
            let relaunched = prev.airborne_since.is_some() && next.airborne_since != prev.airborne_since;
            if let Some(start) = prev.airborne_since.filter(|_| next.grounded || relaunched) {
                if now.elapsed - start >= AIRTIME_MIN && !player.is_invulnerable(now.elapsed) {
                    player.score += AIRTIME_POINTS;
                    airtime.push(index);
                }
                if next.grounded {
                    next.airborne_since = None;
                }
            }
            player.actor = next;
        }
        for index in airtime {
            self.toast(index, "Airtime +2", 0.8);
        }
    }

    fn advance_meteors(&mut self, dt: f32) {
        let mut impacts = Vec::new();
        for meteor in self.meteors.iter_mut() {
            meteor.advance(dt);
            if !meteor.active {
                continue;
            }
            let Some(crest) = crest_at(self.terrain.ridges_mut(), meteor.pos.x) else {
                continue;
            };
            if meteor.pos.y + meteor.radius >= crest {
                meteor.active = false;
                impacts.push(Vec2::new(meteor.pos.x, crest));
            }
        }
        self.meteors.retain(|m| m.active && !m.out_of_scene());

        for at in impacts {
            self.burst(at);
        }
    }

    /// Meteor hit a crest at `at`: spawn the blast and score everyone who dodged
    fn burst(&mut self, at: Vec2) {
        let id = self.next_id();
        let explosion = Explosion::new(id, at);
        let radius = explosion.radius;
        self.explosions.push(explosion);

        let mut labels = Vec::new();
        for (index, player) in self.players.iter_mut().enumerate() {
            if !player.is_alive() || player.actor.vel.y < 0.0 {
                continue;
            }
            let dist = player.actor.pos.distance(at);
            let Some((gained, label)) = dodge_points(dist, radius) else {
                continue;
            };
            if let Some((text, life)) = label {
                labels.push((index, text.to_string(), life));
            }
            let bonus = player.streak * 2;
            if bonus > 0 {
                labels.push((index, format!("Streak +{bonus}"), 0.8));
            }
            player.score += gained + bonus;
            player.streak += 1;
        }
        for (index, text, life) in labels {
            self.toast(index, text, life);
        }
        self.meteors_dodged += 1;
    }

    fn advance_explosions(&mut self, now: FrameTime) {
        age_and_prune(&mut self.explosions, now.dt);

        for player in self.players.iter_mut() {
            if !player.is_alive() || player.is_invulnerable(now.elapsed) {
                continue;
            }
            let hit = self
                .explosions
                .iter()
                .any(|e| e.is_damaging() && e.reaches(player.actor.pos));
            if hit {
                player.lives -= 1;
                player.invulnerable_until = now.elapsed + HIT_INVULNERABILITY;
                player.streak = 0;
                if player.lives == 0 {
                    player.death_at = Some(now.elapsed);
                }
            }
        }
    }

    pub fn winner(&self) -> Winner {
        let (p1, p2) = (self.players[0].score, self.players[1].score);
        match p1.cmp(&p2) {
            std::cmp::Ordering::Greater => Winner::PlayerOne,
            std::cmp::Ordering::Less => Winner::PlayerTwo,
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }

    pub fn phase(&self) -> MeteorPhase {
        self.phase
    }

    pub fn players(&self) -> &[MeteorPlayer; 2] {
        &self.players
    }

    pub fn meteors(&self) -> &[Meteor] {
        &self.meteors
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Seconds survived in the current run
    pub fn time_survived(&self) -> f32 {
        self.clock
    }

    pub fn meteors_dodged(&self) -> u32 {
        self.meteors_dodged
    }

    pub fn idle_phase(&self) -> f32 {
        self.idle_phase
    }

    /// Fraction of a toast's life for fade-out, by toast id
    pub fn toast_progress(&self, id: u32) -> Option<f32> {
        self.toasts.iter().find(|t| t.id == id).map(|t| t.progress())
    }
}
