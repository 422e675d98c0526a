//! Kinematic actor walking, jumping and falling on terrain ridges
//!
//! `step` is a pure function of the previous actor, the held input and the
//! frame time. Ridge caches are only memoization and never change results.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::driver::FrameTime;
use super::terrain::{Ridge, ground_below};
use crate::consts::VIEW_W;
use crate::tuning::Tuning;

/// Direction the figure faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1 for left, +1 for right
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Held directions for one actor during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorInput {
    pub left: bool,
    pub right: bool,
    /// Jump
    pub up: bool,
    /// Drop through the current surface
    pub down: bool,
}

impl ActorInput {
    pub fn horizontal_held(&self) -> bool {
        self.left || self.right
    }
}

/// The playable figure's physical state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    /// Feet position in scene units (y grows downward)
    pub pos: Vec2,
    pub vel: Vec2,
    pub grounded: bool,
    pub facing: Facing,
    /// Ground collision is ignored until this time (seconds)
    pub drop_until: f32,
    /// When the current jump started, cleared by whoever scores airtime
    #[serde(default)]
    pub airborne_since: Option<f32>,
}

impl Actor {
    pub fn spawn(pos: Vec2, facing: Facing) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            grounded: false,
            facing,
            drop_until: 0.0,
            airborne_since: None,
        }
    }

    /// Whether ground collision is suppressed at `now`
    #[inline]
    pub fn dropping(&self, now: f32) -> bool {
        now < self.drop_until
    }
}

/// Advance an actor by one frame
pub fn step(
    prev: &Actor,
    input: &ActorInput,
    time: FrameTime,
    ground: &mut [Ridge],
    tuning: &Tuning,
) -> Actor {
    let dt = time.dt;
    let now = time.elapsed;
    let mut next = Actor {
        grounded: false,
        ..*prev
    };

    // Horizontal input
    if input.left {
        next.vel.x -= tuning.move_accel * dt;
        next.facing = Facing::Left;
    }
    if input.right {
        next.vel.x += tuning.move_accel * dt;
        next.facing = Facing::Right;
    }
    next.vel.x = next.vel.x.clamp(-tuning.max_speed_x, tuning.max_speed_x);

    // Gravity, then integrate with the updated velocity
    next.vel.y += tuning.gravity * dt;
    next.pos += next.vel * dt;

    // Scene bounds
    if next.pos.x < 0.0 {
        next.pos.x = 0.0;
        next.vel.x = 0.0;
    }
    if next.pos.x > VIEW_W {
        next.pos.x = VIEW_W;
        next.vel.x = 0.0;
    }

    // Drop-through starts from the previous frame's footing
    if prev.grounded && input.down {
        next.drop_until = now + tuning.drop_window;
        next.grounded = false;
        next.pos.y += tuning.drop_nudge;
        next.vel.y = next.vel.y.max(tuning.drop_min_vy);
    }

    // Ground catch while descending outside a drop
    let descending = next.vel.y >= 0.0;
    if descending && !next.dropping(now) {
        let tol = tuning.catch_tolerance;
        let feet = next.pos.y;
        if let Some(ground_y) = ground_below(ground, next.pos.x, feet, tol) {
            if feet >= ground_y - tol {
                next.pos.y = ground_y;
                next.vel.y = 0.0;
                next.grounded = true;
            }
        }
    }

    if input.up && next.grounded {
        next.vel.y = -tuning.jump_speed;
        next.grounded = false;
        next.airborne_since = Some(now);
    }

    // Friction only when no direction is held
    if !input.horizontal_held() {
        let friction = if next.grounded {
            tuning.friction_ground
        } else {
            tuning.friction_air
        };
        let decel = friction * dt;
        if next.vel.x > 0.0 {
            next.vel.x = (next.vel.x - decel).max(0.0);
        } else if next.vel.x < 0.0 {
            next.vel.x = (next.vel.x + decel).min(0.0);
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CATCH_TOLERANCE;
    use crate::sim::curve::Curve;
    use crate::sim::terrain::{Terrain, heights_at};
    use proptest::prelude::*;

    const DT: f32 = 0.016;

    fn flat(ys: &[f32]) -> Terrain {
        let curves = ys
            .iter()
            .map(|y| Curve::parse(&format!("M0,{y} L1200,{y}")).unwrap())
            .collect();
        Terrain::from_curves(curves)
    }

    /// Step repeatedly, returning every intermediate actor
    fn run(
        actor: Actor,
        input: ActorInput,
        terrain: &mut Terrain,
        start: f32,
        steps: usize,
    ) -> Vec<(f32, Actor)> {
        let tuning = Tuning::default();
        let mut out = Vec::with_capacity(steps);
        let mut current = actor;
        let mut now = start;
        for _ in 0..steps {
            now += DT;
            current = step(
                &current,
                &input,
                FrameTime::new(DT, now),
                terrain.ridges_mut(),
                &tuning,
            );
            out.push((now, current));
        }
        out
    }

    #[test]
    fn test_rest_on_surface_is_stable() {
        let mut terrain = flat(&[515.0]);
        let actor = Actor::spawn(Vec2::new(250.0, 515.0), Facing::Right);
        let next = step(
            &actor,
            &ActorInput::default(),
            FrameTime::new(DT, DT),
            terrain.ridges_mut(),
            &Tuning::default(),
        );
        assert_eq!(next.pos, Vec2::new(250.0, 515.0));
        assert!(next.grounded);
        assert_eq!(next.vel, Vec2::ZERO);
    }

    #[test]
    fn test_free_fall_lands_on_surface() {
        let mut terrain = flat(&[480.0]);
        let actor = Actor::spawn(Vec2::new(600.0, 100.0), Facing::Right);
        let frames = run(actor, ActorInput::default(), &mut terrain, 0.0, 120);

        let landed = frames
            .iter()
            .position(|(_, a)| a.grounded)
            .expect("actor should land");
        let mut last_y = 100.0;
        for (_, a) in &frames[..landed] {
            assert!(a.pos.y > last_y, "falls further every step");
            last_y = a.pos.y;
        }
        let (_, on_ground) = frames[landed];
        assert_eq!(on_ground.pos.y, 480.0);
        assert_eq!(on_ground.vel.y, 0.0);
        for (_, a) in &frames[landed..] {
            assert!(a.grounded);
            assert_eq!(a.pos.y, 480.0);
        }
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut terrain = flat(&[500.0]);
        let tuning = Tuning::default();
        let standing = Actor {
            grounded: true,
            ..Actor::spawn(Vec2::new(300.0, 500.0), Facing::Right)
        };
        let jump = ActorInput {
            up: true,
            ..Default::default()
        };

        let airborne = step(&standing, &jump, FrameTime::new(DT, 1.0), terrain.ridges_mut(), &tuning);
        assert_eq!(airborne.vel.y, -tuning.jump_speed);
        assert!(!airborne.grounded);
        assert_eq!(airborne.airborne_since, Some(1.0));

        // Still holding jump mid-air only gravity acts
        let later = step(&airborne, &jump, FrameTime::new(DT, 1.0 + DT), terrain.ridges_mut(), &tuning);
        assert!((later.vel.y - (-tuning.jump_speed + tuning.gravity * DT)).abs() < 1e-3);
        assert_eq!(later.airborne_since, Some(1.0));
    }

    #[test]
    fn test_drop_through_window() {
        // Standing on 400 with another surface 40 below
        let mut terrain = flat(&[400.0, 440.0]);
        let start = 2.0;
        let standing = Actor {
            grounded: true,
            ..Actor::spawn(Vec2::new(600.0, 400.0), Facing::Right)
        };
        let down = ActorInput {
            down: true,
            ..Default::default()
        };
        let frames = run(standing, down, &mut terrain, start, 40);

        let drop_until = frames[0].1.drop_until;
        assert!((drop_until - (start + DT + 0.25)).abs() < 1e-4);
        assert!(frames[0].1.pos.y > 400.0);
        assert!(frames[0].1.vel.y >= 50.0);

        for (now, a) in &frames {
            if *now < drop_until {
                assert!(!a.grounded, "no ground contact inside the drop window");
            }
        }
        let (now, caught) = frames
            .iter()
            .find(|(_, a)| a.grounded)
            .copied()
            .expect("collision resumes after the window");
        assert!(now >= drop_until);
        assert!(now < drop_until + 2.0 * DT);
        assert_eq!(caught.pos.y, 440.0);
    }

    #[test]
    fn test_friction_never_overshoots() {
        let mut terrain = flat(&[500.0]);
        let sliding = Actor {
            vel: Vec2::new(10.0, 0.0),
            grounded: true,
            ..Actor::spawn(Vec2::new(300.0, 500.0), Facing::Right)
        };
        let next = step(
            &sliding,
            &ActorInput::default(),
            FrameTime::new(DT, DT),
            terrain.ridges_mut(),
            &Tuning::default(),
        );
        assert_eq!(next.vel.x, 0.0);
    }

    #[test]
    fn test_walls_clamp_and_stop() {
        let mut terrain = flat(&[500.0]);
        let at_wall = Actor {
            vel: Vec2::new(-400.0, 0.0),
            ..Actor::spawn(Vec2::new(1.0, 500.0), Facing::Left)
        };
        let left = ActorInput {
            left: true,
            ..Default::default()
        };
        let next = step(&at_wall, &left, FrameTime::new(DT, DT), terrain.ridges_mut(), &Tuning::default());
        assert_eq!(next.pos.x, 0.0);
        assert_eq!(next.vel.x, 0.0);
        assert_eq!(next.facing, Facing::Left);
    }

    #[test]
    fn test_speed_cap() {
        let mut terrain = flat(&[500.0]);
        let right = ActorInput {
            right: true,
            ..Default::default()
        };
        let actor = Actor::spawn(Vec2::new(100.0, 500.0), Facing::Left);
        let frames = run(actor, right, &mut terrain, 0.0, 30);
        assert!(frames.iter().all(|(_, a)| a.vel.x <= 450.0));
        assert_eq!(frames.last().unwrap().1.vel.x, 450.0);
        assert_eq!(frames.last().unwrap().1.facing, Facing::Right);
    }

    #[test]
    fn test_lands_on_nearest_hill() {
        let mut terrain = Terrain::hills();
        let actor = Actor::spawn(Vec2::new(0.0, 300.0), Facing::Right);
        let frames = run(actor, ActorInput::default(), &mut terrain, 0.0, 120);
        let (_, landed) = frames.iter().find(|(_, a)| a.grounded).copied().unwrap();
        // Back ridge starts at y=500, the highest surface at x=0
        assert!((landed.pos.y - 500.0).abs() < 2.0);
    }

    proptest! {
        #[test]
        fn prop_no_penetration_and_in_bounds(
            x in 0.0f32..1200.0,
            y in 0.0f32..470.0,
            vx in -450.0f32..450.0,
            left in any::<bool>(),
            right in any::<bool>(),
        ) {
            let mut terrain = flat(&[480.0]);
            let actor = Actor { vel: Vec2::new(vx, 0.0), ..Actor::spawn(Vec2::new(x, y), Facing::Right) };
            let input = ActorInput { left, right, ..Default::default() };
            for (_, a) in run(actor, input, &mut terrain, 0.0, 90) {
                prop_assert!(a.pos.x >= 0.0 && a.pos.x <= 1200.0);
                prop_assert!(a.pos.y <= 480.0 + CATCH_TOLERANCE);
            }
        }

        #[test]
        fn prop_rest_on_hills_is_stable(x in 0.0f32..=1200.0, dt in 0.0f32..=0.032) {
            let mut terrain = Terrain::hills();
            let tuning = Tuning::default();
            let heights = heights_at(terrain.ridges_mut(), x);
            // One frame of fall plus the catch tolerance
            let reach = tuning.gravity * dt * dt + tuning.catch_tolerance;
            for &h in &heights {
                // Where ridges cross, the lower one within reach takes the actor
                if heights.iter().any(|&other| other > h && other <= h + reach) {
                    continue;
                }
                let actor = Actor {
                    grounded: true,
                    ..Actor::spawn(Vec2::new(x, h), Facing::Right)
                };
                let next = step(
                    &actor,
                    &ActorInput::default(),
                    FrameTime::new(dt, 1.0),
                    terrain.ridges_mut(),
                    &tuning,
                );
                prop_assert_eq!(next.pos, actor.pos);
                prop_assert_eq!(next.vel, Vec2::ZERO);
                prop_assert!(next.grounded);
            }
        }
    }
}
