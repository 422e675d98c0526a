//! Whole-frame display lists for each scene

use glam::Vec2;

use super::shapes;
use super::{Color, DrawCmd, Stroke, fade, palette};
use crate::consts::{VIEW_H, VIEW_W};
use crate::sim::night::{CABINET_X, JAR_OFFSET, JAR_X, TELESCOPE_X};
use crate::sim::pong::{BALL_RADIUS, COURT_H, COURT_W, PADDLE_H, PADDLE_W};
use crate::sim::{MeteorGame, MeteorPhase, NightScene, Overlay, Pong, Terrain};

const HILL_COLORS: [Color; 3] = [palette::HILL_FRONT, palette::HILL_MIDDLE, palette::HILL_BACK];
/// Telescope eyepiece size
const EYEPIECE: f32 = 448.0;

fn text(pos: Vec2, text: impl Into<String>, size: f32) -> DrawCmd {
    DrawCmd::Text {
        pos,
        text: text.into(),
        size,
        color: palette::TEXT,
    }
}

/// Hills back to front
fn hills(out: &mut Vec<DrawCmd>, terrain: &Terrain) {
    for (ridge, color) in terrain.ridges().iter().zip(HILL_COLORS).rev() {
        out.extend(shapes::hill(ridge.curve.segments(), color));
    }
}

pub fn meteor_frame(game: &MeteorGame) -> Vec<DrawCmd> {
    let mut out = vec![DrawCmd::Clear(palette::DAY_SKY)];
    hills(&mut out, game.terrain());

    for m in game.meteors() {
        out.extend(shapes::meteor(m));
    }
    for e in game.explosions() {
        out.push(shapes::explosion(e));
    }

    let now = game.time_survived();
    for (i, p) in game.players().iter().enumerate() {
        let alpha = if !p.is_alive() {
            0.3
        } else if p.is_invulnerable(now) && (game.idle_phase() * 12.0).sin() < 0.0 {
            0.4
        } else {
            1.0
        };
        let sway = shapes::idle_sway(&p.actor, game.idle_phase(), i);
        out.extend(shapes::figure(&p.actor, sway, alpha));
        out.push(text(p.actor.pos + Vec2::new(0.0, -60.0), format!("{}♥", p.lives), 12.0));
    }
    for t in game.toasts() {
        if let Some(p) = game.players().get(t.player) {
            out.push(shapes::toast(t, p.actor.pos));
        }
    }

    let [p1, p2] = game.players();
    match game.phase() {
        MeteorPhase::Ready => {
            out.push(text(Vec2::new(VIEW_W / 2.0, 200.0), "Meteor Dodge", 36.0));
            out.push(text(
                Vec2::new(VIEW_W / 2.0, 240.0),
                "Survive falling meteors. Explosions on the hills will hurt.",
                16.0,
            ));
            out.push(text(Vec2::new(VIEW_W / 2.0, 270.0), "Press Enter to start", 16.0));
        }
        MeteorPhase::Playing => {
            out.push(text(Vec2::new(60.0, 24.0), format!("P1: {}", p1.score), 16.0));
            out.push(text(Vec2::new(VIEW_W - 60.0, 24.0), format!("P2: {}", p2.score), 16.0));
        }
        MeteorPhase::GameOver => {
            out.push(DrawCmd::Rect {
                min: Vec2::new(VIEW_W / 2.0 - 220.0, 150.0),
                size: Vec2::new(440.0, 170.0),
                fill: palette::PANEL,
            });
            out.push(text(Vec2::new(VIEW_W / 2.0, 195.0), "Game Over", 32.0));
            out.push(text(
                Vec2::new(VIEW_W / 2.0, 235.0),
                format!("Time survived: {:.1}s - {}", game.time_survived(), game.winner()),
                16.0,
            ));
            out.push(text(
                Vec2::new(VIEW_W / 2.0, 262.0),
                format!(
                    "P1 {} - P2 {}   ({} meteors dodged)",
                    p1.score,
                    p2.score,
                    game.meteors_dodged()
                ),
                14.0,
            ));
            out.push(text(Vec2::new(VIEW_W / 2.0, 295.0), "Press Enter to play again", 14.0));
        }
    }
    out
}

/// Table, jar, telescope and arcade cabinet
fn props(out: &mut Vec<DrawCmd>, scene: &NightScene) {
    let prop = Stroke::new(palette::FIGURE, 2.0);

    // Cabinet
    let cab = Vec2::new(CABINET_X, 540.0);
    out.push(DrawCmd::Rect {
        min: cab + Vec2::new(-30.0, -90.0),
        size: Vec2::new(60.0, 90.0),
        fill: [0.15, 0.12, 0.25, 1.0],
    });
    out.push(DrawCmd::Rect {
        min: cab + Vec2::new(-20.0, -80.0),
        size: Vec2::new(40.0, 30.0),
        fill: [0.2, 0.9, 0.6, 0.5],
    });

    // Telescope on a tripod
    let scope = Vec2::new(TELESCOPE_X, 540.0);
    out.push(DrawCmd::Line { from: scope, to: scope + Vec2::new(-12.0, -40.0), stroke: prop });
    out.push(DrawCmd::Line { from: scope, to: scope + Vec2::new(12.0, -40.0), stroke: prop });
    out.push(DrawCmd::Line {
        from: scope + Vec2::new(-20.0, -30.0),
        to: scope + Vec2::new(25.0, -60.0),
        stroke: Stroke::new(palette::FIGURE, 5.0),
    });

    // Table
    out.push(DrawCmd::Rect {
        min: Vec2::new(940.0, 540.0),
        size: Vec2::new(260.0, 12.0),
        fill: [1.0, 1.0, 1.0, 0.08],
    });

    let jar = if scene.jar_held() {
        scene.player().pos + JAR_OFFSET
    } else {
        Vec2::new(JAR_X, 524.0)
    };
    out.push(DrawCmd::Circle {
        center: jar,
        radius: 9.0,
        fill: Some(fade(palette::FIREFLY, 0.1 + 0.02 * scene.zen().min(20) as f32)),
        stroke: Some(prop),
    });
}

fn eyepiece(out: &mut Vec<DrawCmd>, scene: &NightScene) {
    let origin = Vec2::new((VIEW_W - EYEPIECE) / 2.0, (VIEW_H - EYEPIECE) / 2.0 - 20.0);
    let center = origin + Vec2::splat(EYEPIECE / 2.0);
    let view = scene.telescope();

    out.push(DrawCmd::Rect { min: Vec2::ZERO, size: Vec2::new(VIEW_W, VIEW_H), fill: palette::PANEL });
    out.push(DrawCmd::Clip { min: origin, size: Vec2::splat(EYEPIECE) });
    out.push(DrawCmd::Rect { min: origin, size: Vec2::splat(EYEPIECE), fill: palette::SKY });
    for s in scene.stars() {
        out.push(DrawCmd::Circle {
            center: center + s.pos - view.pan,
            radius: 2.0,
            fill: Some(palette::STAR),
            stroke: None,
        });
    }
    let cross = Stroke::new(palette::METEOR, 1.0);
    out.push(DrawCmd::Circle { center, radius: 8.0, fill: None, stroke: Some(cross) });
    out.push(DrawCmd::Line {
        from: center + Vec2::new(0.0, -10.0),
        to: center + Vec2::new(0.0, 10.0),
        stroke: cross,
    });
    out.push(DrawCmd::Line {
        from: center + Vec2::new(-10.0, 0.0),
        to: center + Vec2::new(10.0, 0.0),
        stroke: cross,
    });
    out.push(DrawCmd::EndClip);

    let (title, detail) = view.readout(scene.stars());
    let below = origin.y + EYEPIECE;
    out.push(text(Vec2::new(VIEW_W / 2.0, below + 24.0), title, 18.0));
    if let Some(detail) = detail {
        out.push(text(Vec2::new(VIEW_W / 2.0, below + 46.0), detail, 13.0));
    }
    out.push(text(
        Vec2::new(VIEW_W / 2.0, origin.y - 12.0),
        "Pan with mouse drag or arrows. Enter to toggle focus. Escape to exit.",
        12.0,
    ));
}

/// Pong court centred in the scene
pub fn pong_court(out: &mut Vec<DrawCmd>, pong: &Pong) {
    let origin = Vec2::new((VIEW_W - COURT_W) / 2.0, (VIEW_H - COURT_H) / 2.0);
    out.push(DrawCmd::Rect { min: Vec2::ZERO, size: Vec2::new(VIEW_W, VIEW_H), fill: palette::PANEL });
    out.push(DrawCmd::Rect {
        min: origin,
        size: Vec2::new(COURT_W, COURT_H),
        fill: [0.0, 0.0, 0.0, 0.5],
    });
    for (x, y) in [(Pong::player_x(), pong.player_y), (Pong::ai_x(), pong.ai_y)] {
        out.push(DrawCmd::Rect {
            min: origin + Vec2::new(x, y),
            size: Vec2::new(PADDLE_W, PADDLE_H),
            fill: palette::TEXT,
        });
    }
    out.push(DrawCmd::Circle {
        center: origin + pong.ball,
        radius: BALL_RADIUS,
        fill: Some(palette::TEXT),
        stroke: None,
    });
    out.push(text(
        Vec2::new(VIEW_W / 2.0, origin.y - 12.0),
        "Pong - W/S or arrows to move, Escape to exit",
        12.0,
    ));
}

pub fn night_frame(scene: &NightScene) -> Vec<DrawCmd> {
    let mut out = vec![DrawCmd::Clear(palette::SKY)];
    let view = Vec2::new(VIEW_W, VIEW_H);
    for s in scene.stars() {
        out.push(DrawCmd::Circle {
            center: s.backdrop_pos(view),
            radius: 1.8,
            fill: Some(fade(palette::STAR, 0.5)),
            stroke: None,
        });
    }
    for s in scene.shooting_stars() {
        out.push(shapes::shooting_star(s));
    }
    for g in scene.winds() {
        out.push(shapes::wind_gust(g));
    }

    hills(&mut out, scene.terrain());
    for tuft in scene.grass() {
        out.extend(shapes::grass_tuft(tuft));
    }
    props(&mut out, scene);

    let phase = scene.idle_phase();
    let player = scene.player();
    out.extend(shapes::figure(player, shapes::idle_sway(player, phase, 0), 1.0));
    if let Some((second, name)) = scene.second() {
        out.extend(shapes::figure(second, shapes::idle_sway(second, phase, 1), 1.0));
        out.push(text(second.pos + Vec2::new(0.0, -60.0), name, 12.0));
    }
    for f in scene.fireflies() {
        out.extend(shapes::firefly(f, phase));
    }

    out.push(text(Vec2::new(VIEW_W - 70.0, 24.0), format!("Zen: {}", scene.zen()), 16.0));
    if let Some(prompt) = scene.prompt() {
        out.push(text(player.pos + Vec2::new(0.0, -70.0), prompt, 12.0));
    }

    match scene.overlay() {
        Overlay::None => {}
        Overlay::Telescope => eyepiece(&mut out, scene),
        Overlay::Arcade => pong_court(&mut out, scene.pong()),
    }

    if !scene.started() {
        out.push(DrawCmd::Rect { min: Vec2::ZERO, size: view, fill: palette::PANEL });
        out.push(text(Vec2::new(VIEW_W / 2.0, 200.0), "Starry Night", 36.0));
        out.push(text(
            Vec2::new(VIEW_W / 2.0, 240.0),
            "Wander the hills, catch fireflies with the jar, and gaze at the stars.",
            16.0,
        ));
        out.push(text(Vec2::new(VIEW_W / 2.0, 270.0), "Press Enter to start", 16.0));
    }
    out
}
