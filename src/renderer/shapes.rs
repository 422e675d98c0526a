//! Shape builders for scene entities

use glam::Vec2;
use std::f32::consts::PI;

use super::{Color, DrawCmd, Stroke, fade, palette};
use crate::sim::entities::Lifetime;
use crate::sim::{
    Actor, CubicSegment, Explosion, Firefly, GrassTuft, Meteor, ShootingStar, Toast, WindGust,
};

/// Grass blade length along the surface normal
const BLADE: f32 = 14.0;
const BLADE_SPREAD: f32 = 10.0;
const BLADE_FAN: f32 = 0.35;

/// Stick figure standing with its feet at `pos`
pub fn figure(actor: &Actor, sway: f32, alpha: f32) -> Vec<DrawCmd> {
    let base = actor.pos + Vec2::new(sway, 0.0);
    let dir = actor.facing.sign();
    let stroke = Stroke::new(fade(palette::FIGURE, alpha), 2.0);
    let hip = base + Vec2::new(0.0, -14.0);
    let neck = base + Vec2::new(0.0, -34.0);

    // Legs swing while running
    let stride = (actor.vel.x.abs() / 450.0).min(1.0) * 6.0;
    vec![
        DrawCmd::Circle {
            center: base + Vec2::new(0.0, -42.0),
            radius: 8.0,
            fill: None,
            stroke: Some(stroke),
        },
        DrawCmd::Line { from: neck, to: hip, stroke },
        DrawCmd::Line {
            from: hip,
            to: base + Vec2::new(-6.0 - stride, 0.0),
            stroke,
        },
        DrawCmd::Line {
            from: hip,
            to: base + Vec2::new(6.0 + stride, 0.0),
            stroke,
        },
        DrawCmd::Line {
            from: neck + Vec2::new(0.0, 4.0),
            to: neck + Vec2::new(12.0 * dir, 12.0),
            stroke,
        },
        DrawCmd::Line {
            from: neck + Vec2::new(0.0, 4.0),
            to: neck + Vec2::new(-8.0 * dir, 14.0),
            stroke,
        },
    ]
}

/// Idle sway for a figure standing still
pub fn idle_sway(actor: &Actor, phase: f32, index: usize) -> f32 {
    if actor.grounded && actor.vel.x.abs() < 1.0 {
        (phase * 2.0 + index as f32).sin() * 3.0
    } else {
        0.0
    }
}

/// Three blades fanned around the surface normal
pub fn grass_tuft(tuft: &GrassTuft) -> [DrawCmd; 3] {
    let stroke = Stroke::new(palette::GRASS, 1.5);
    let normal = tuft.angle - PI / 2.0;
    let blade = |angle: f32, len: f32| DrawCmd::Line {
        from: tuft.pos,
        to: tuft.pos + Vec2::from_angle(angle) * len,
        stroke,
    };
    [
        blade(normal, BLADE),
        blade(normal - BLADE_FAN, BLADE - BLADE_SPREAD / 2.0),
        blade(normal + BLADE_FAN, BLADE - BLADE_SPREAD / 2.0),
    ]
}

pub fn meteor(m: &Meteor) -> [DrawCmd; 2] {
    [
        DrawCmd::Circle {
            center: m.pos,
            radius: m.radius,
            fill: None,
            stroke: Some(Stroke::new(palette::METEOR, 2.0)),
        },
        DrawCmd::Circle {
            center: m.pos,
            radius: m.radius * 0.6,
            fill: None,
            stroke: Some(Stroke::new(palette::METEOR, 1.0)),
        },
    ]
}

/// Expanding, fading blast ring
pub fn explosion(e: &Explosion) -> DrawCmd {
    let alpha = 1.0 - e.progress();
    DrawCmd::Circle {
        center: e.pos,
        radius: e.ring_radius(),
        fill: Some(fade(palette::METEOR, alpha * 0.25)),
        stroke: Some(Stroke::new(fade(palette::METEOR, alpha), 2.0)),
    }
}

/// Glowing dot; `phase` drives the flicker
pub fn firefly(f: &Firefly, phase: f32) -> [DrawCmd; 2] {
    let flicker = 0.6 + 0.4 * (phase * 3.0 + f.id as f32).sin();
    [
        DrawCmd::Circle {
            center: f.pos,
            radius: 6.0,
            fill: Some(fade(palette::FIREFLY, 0.15 * flicker)),
            stroke: None,
        },
        DrawCmd::Circle {
            center: f.pos,
            radius: 2.0,
            fill: Some(fade(palette::FIREFLY, flicker)),
            stroke: None,
        },
    ]
}

/// A curl of wind, fading in and out over its life
pub fn wind_gust(g: &WindGust) -> DrawCmd {
    let s = g.scale;
    let p = |x: f32, y: f32| g.pos + Vec2::new(x, y) * s;
    let alpha = (g.progress() * PI).sin();
    DrawCmd::Path {
        segments: vec![
            CubicSegment::new(p(0.0, 0.0), p(20.0, -8.0), p(40.0, 8.0), p(60.0, 0.0)),
            CubicSegment::new(p(60.0, 0.0), p(78.0, -8.0), p(84.0, -22.0), p(72.0, -24.0)),
            CubicSegment::new(p(72.0, -24.0), p(62.0, -26.0), p(60.0, -12.0), p(70.0, -10.0)),
        ],
        fill: None,
        stroke: Some(Stroke::new(fade(palette::WIND, alpha), 1.5)),
    }
}

/// Streak with a tail pointing back along its path
pub fn shooting_star(s: &ShootingStar) -> DrawCmd {
    let alpha = 1.0 - s.progress();
    let tail = s.vel.normalize_or_zero() * -60.0;
    DrawCmd::Line {
        from: s.pos,
        to: s.pos + tail,
        stroke: Stroke::new(fade(palette::STAR, alpha), 2.0),
    }
}

/// Score label rising above `feet`
pub fn toast(t: &Toast, feet: Vec2) -> DrawCmd {
    DrawCmd::Text {
        pos: feet + Vec2::new(0.0, -60.0 + t.rise()),
        text: t.text.clone(),
        size: 14.0,
        color: fade(palette::TEXT, 1.0 - t.progress()),
    }
}

/// Hill body (filled to the bottom of the scene) and its ridge line
pub fn hill(segments: &[CubicSegment], color: Color) -> [DrawCmd; 2] {
    [
        DrawCmd::Path {
            segments: segments.to_vec(),
            fill: Some(color),
            stroke: None,
        },
        DrawCmd::Path {
            segments: segments.to_vec(),
            fill: None,
            stroke: Some(Stroke::new(palette::RIDGE, 2.0)),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Facing;

    #[test]
    fn test_figure_faces_direction() {
        let right = Actor::spawn(Vec2::new(100.0, 500.0), Facing::Right);
        let left = Actor::spawn(Vec2::new(100.0, 500.0), Facing::Left);
        let arm_x = |cmds: Vec<DrawCmd>| match &cmds[4] {
            DrawCmd::Line { to, .. } => to.x,
            other => panic!("unexpected {other:?}"),
        };
        assert!(arm_x(figure(&right, 0.0, 1.0)) > 100.0);
        assert!(arm_x(figure(&left, 0.0, 1.0)) < 100.0);
    }

    #[test]
    fn test_grass_points_away_from_flat_ground() {
        let tuft = GrassTuft { pos: Vec2::new(50.0, 500.0), angle: 0.0 };
        for cmd in grass_tuft(&tuft) {
            match cmd {
                DrawCmd::Line { from, to, .. } => {
                    assert_eq!(from, tuft.pos);
                    assert!(to.y < from.y);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_explosion_fades() {
        let mut e = Explosion::new(1, Vec2::ZERO);
        e.age(0.49);
        match explosion(&e) {
            DrawCmd::Circle { stroke: Some(s), radius, .. } => {
                assert!(s.color[3] < 0.05);
                assert!(radius > e.radius);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_idle_sway_only_when_still() {
        let mut actor = Actor::spawn(Vec2::ZERO, Facing::Right);
        actor.grounded = true;
        assert!(idle_sway(&actor, 1.0, 0).abs() > 0.0);
        actor.vel.x = 100.0;
        assert_eq!(idle_sway(&actor, 1.0, 0), 0.0);
    }
}
