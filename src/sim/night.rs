//! Starry Night: a calm sandbox on the hills
//!
//! Wander, catch fireflies with the jar, look through the telescope or play
//! the arcade cabinet. Opening an overlay suspends the hill physics.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::actor::{Actor, ActorInput, Facing, step};
use super::driver::FrameTime;
use super::entities::{
    Firefly, MAX_SHOOTING_STARS, MAX_WIND_GUSTS, SHOOTING_STAR_INTERVAL, ShootingStar, SpawnTimer,
    WIND_SPAWN_INTERVAL, WindGust, prune_expired,
};
use super::pong::{Pong, PongInput};
use super::terrain::{GrassTuft, Terrain};
use crate::settings::SceneSettings;
use crate::tuning::Tuning;

pub const JAR_X: f32 = 1130.0;
pub const TELESCOPE_X: f32 = 1040.0;
pub const CABINET_X: f32 = 120.0;
/// Horizontal reach of the jar and telescope
pub const HOTSPOT_RANGE: f32 = 30.0;
/// The cabinet is wider, so it answers from further away
pub const CABINET_RANGE: f32 = 40.0;
/// Jar position relative to the holder's feet
pub const JAR_OFFSET: Vec2 = Vec2::new(16.0, -20.0);
pub const CATCH_RADIUS: f32 = 20.0;
/// Telescope pan per key press
pub const PAN_STEP: f32 = 20.0;
/// Crosshair must be this close to a star to identify it
pub const STAR_PICK_RADIUS: f32 = 12.0;

const SECOND_SPAWN: Vec2 = Vec2::new(950.0, 525.0);
/// Catalogue coordinates span [-300, 300] x [-180, 180]
const SKY_HALF: Vec2 = Vec2::new(300.0, 180.0);

/// Full-screen view on top of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Telescope,
    Arcade,
}

/// Discrete player actions (key presses, drags)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Grab or put down the jar
    Interact,
    /// Open a nearby overlay or toggle telescope focus
    Use,
    /// Close the current overlay
    Close,
    /// Telescope pan by whole steps, e.g. (-1, 0) for left
    Pan(Vec2),
    /// Pointer drag in telescope units
    Drag(Vec2),
}

/// A named star in the sky catalogue
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub id: u32,
    pub name: &'static str,
    pub fact: &'static str,
    /// Sky coordinates centred on the telescope's rest position
    pub pos: Vec2,
}

impl Star {
    /// Where the star sits in the backdrop behind the hills
    pub fn backdrop_pos(&self, view: Vec2) -> Vec2 {
        (self.pos + SKY_HALF) / (SKY_HALF * 2.0) * view
    }
}

const CATALOGUE: [(&str, &str); 16] = [
    ("Sirius", "The brightest star in the night sky, about 8.6 light years away."),
    ("Canopus", "Second brightest star, used by spacecraft for attitude control."),
    ("Arcturus", "An orange giant and the brightest star in the northern celestial hemisphere."),
    ("Vega", "Once the northern pole star and will be again in about 12,000 years."),
    ("Capella", "Actually four stars in two binary pairs."),
    ("Rigel", "A blue supergiant tens of thousands of times more luminous than the Sun."),
    ("Procyon", "Its name means 'before the dog': it rises just ahead of Sirius."),
    ("Betelgeuse", "A red supergiant so large it would swallow the orbit of Mars."),
    ("Altair", "Spins so fast that it is visibly flattened at the poles."),
    ("Aldebaran", "The red eye of Taurus, the bull."),
    ("Antares", "Its name means 'rival of Mars' for its red colour."),
    ("Spica", "A close binary whose stars orbit each other in four days."),
    ("Pollux", "The closest giant star to the Sun, with a known planet."),
    ("Deneb", "One of the most distant stars visible to the naked eye."),
    ("Regulus", "The heart of Leo, rotating close to breaking apart."),
    ("Polaris", "The North Star, almost exactly above Earth's north pole."),
];

/// Named stars at seed-dependent sky positions
pub fn star_catalogue(seed: u64) -> Vec<Star> {
    let mut rng = Pcg32::seed_from_u64(seed.wrapping_add(0x5eed));
    CATALOGUE
        .iter()
        .enumerate()
        .map(|(i, &(name, fact))| Star {
            id: i as u32 + 1,
            name,
            fact,
            pos: Vec2::new(
                rng.random_range(-SKY_HALF.x..SKY_HALF.x),
                rng.random_range(-SKY_HALF.y..SKY_HALF.y),
            ),
        })
        .collect()
}

/// Telescope eyepiece state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TelescopeView {
    pub pan: Vec2,
    pub focused: bool,
}

impl TelescopeView {
    pub fn pan_steps(&mut self, steps: Vec2) {
        self.pan += steps * PAN_STEP;
    }

    /// Dragging moves the sky with the pointer
    pub fn drag(&mut self, delta: Vec2) {
        self.pan -= delta;
    }

    /// Star under the crosshair, if one is close enough
    pub fn nearest<'a>(&self, stars: &'a [Star]) -> Option<&'a Star> {
        stars
            .iter()
            .map(|s| (s, s.pos.distance(self.pan)))
            .filter(|(_, d)| *d <= STAR_PICK_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(s, _)| s)
    }

    /// Caption under the eyepiece
    pub fn readout(&self, stars: &[Star]) -> (String, Option<String>) {
        match self.nearest(stars) {
            Some(star) => {
                let detail = if self.focused {
                    star.fact.to_string()
                } else {
                    "Press Enter to focus".to_string()
                };
                (star.name.to_string(), Some(detail))
            }
            None => ("Move the crosshair over a star".to_string(), None),
        }
    }
}

pub struct NightScene {
    seed: u64,
    rng: Pcg32,
    tuning: Tuning,
    terrain: Terrain,
    grass: Vec<GrassTuft>,
    stars: Vec<Star>,
    started: bool,
    player: Actor,
    second: Option<Actor>,
    second_name: String,
    fireflies: Vec<Firefly>,
    winds: Vec<WindGust>,
    shooting_stars: Vec<ShootingStar>,
    wind_timer: SpawnTimer,
    star_timer: SpawnTimer,
    wind_target: u32,
    star_target: u32,
    jar_held: bool,
    zen: u32,
    overlay: Overlay,
    telescope: TelescopeView,
    pong: Pong,
    clock: f32,
    idle_phase: f32,
    next_id: u32,
}

impl NightScene {
    pub fn new(seed: u64, settings: &SceneSettings) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let fireflies = Firefly::swarm(&mut rng);
        let terrain = Terrain::hills();
        let grass = terrain.grass_tufts();
        let mut scene = Self {
            seed,
            rng,
            tuning: Tuning::default(),
            terrain,
            grass,
            stars: star_catalogue(seed),
            started: false,
            player: Actor::spawn(Vec2::new(250.0, 515.0), Facing::Right),
            second: None,
            second_name: String::new(),
            next_id: fireflies.len() as u32 + 1,
            fireflies,
            winds: Vec::new(),
            shooting_stars: Vec::new(),
            wind_timer: SpawnTimer::default(),
            star_timer: SpawnTimer::default(),
            wind_target: 0,
            star_target: 0,
            jar_held: false,
            zen: 0,
            overlay: Overlay::None,
            telescope: TelescopeView::default(),
            pong: Pong::new(),
            clock: 0.0,
            idle_phase: 0.0,
        };
        scene.apply_settings(settings);
        scene
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Take new spawn targets and second-player choice
    pub fn apply_settings(&mut self, settings: &SceneSettings) {
        self.wind_target = settings.wind_gusts.min(MAX_WIND_GUSTS);
        self.star_target = settings.shooting_stars.min(MAX_SHOOTING_STARS);
        self.second_name = settings.second_player_name.clone();
        match (settings.second_player, self.second.is_some()) {
            (true, false) => {
                self.second = Some(Actor::spawn(SECOND_SPAWN, Facing::Left));
                log::info!("{} joined the night scene", self.second_name);
            }
            (false, true) => self.second = None,
            _ => {}
        }
    }

    pub fn start(&mut self) {
        if !self.started {
            self.started = true;
            log::info!("Night scene started (seed {})", self.seed);
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn near(&self, x: f32, range: f32) -> bool {
        self.player.grounded && (self.player.pos.x - x).abs() < range
    }

    pub fn near_jar(&self) -> bool {
        self.near(JAR_X, HOTSPOT_RANGE)
    }

    pub fn near_telescope(&self) -> bool {
        self.near(TELESCOPE_X, HOTSPOT_RANGE)
    }

    pub fn near_cabinet(&self) -> bool {
        self.near(CABINET_X, CABINET_RANGE)
    }

    /// Hint shown above a hotspot the player is standing at
    pub fn prompt(&self) -> Option<&'static str> {
        if self.overlay != Overlay::None {
            None
        } else if self.near_telescope() {
            Some("Press Enter to use telescope")
        } else if self.near_cabinet() {
            Some("Press Enter to play")
        } else if self.near_jar() {
            Some(if self.jar_held { "E to put the jar down" } else { "E to grab the jar" })
        } else {
            None
        }
    }

    pub fn interact(&mut self, action: Interaction) {
        match (self.overlay, action) {
            (Overlay::None, Interaction::Interact) => {
                if self.near_jar() {
                    self.jar_held = !self.jar_held;
                    log::debug!("Jar {}", if self.jar_held { "grabbed" } else { "put down" });
                }
            }
            (Overlay::None, Interaction::Use) => {
                if self.near_telescope() {
                    self.overlay = Overlay::Telescope;
                    self.telescope.focused = false;
                    log::info!("Telescope opened");
                } else if self.near_cabinet() {
                    self.overlay = Overlay::Arcade;
                    self.pong = Pong::new();
                    log::info!("Arcade opened");
                }
            }
            (Overlay::Telescope, Interaction::Use) => {
                self.telescope.focused = !self.telescope.focused;
            }
            (Overlay::Telescope, Interaction::Pan(steps)) => self.telescope.pan_steps(steps),
            (Overlay::Telescope, Interaction::Drag(delta)) => self.telescope.drag(delta),
            (Overlay::Telescope | Overlay::Arcade, Interaction::Close) => {
                self.overlay = Overlay::None;
                self.telescope.focused = false;
            }
            _ => {}
        }
    }

    pub fn tick(&mut self, inputs: &[ActorInput; 2], time: FrameTime) {
        let dt = time.dt;
        self.idle_phase += dt;
        if !self.started {
            return;
        }
        match self.overlay {
            Overlay::Telescope => return,
            Overlay::Arcade => {
                let input = PongInput {
                    up: inputs[0].up || inputs[1].up,
                    down: inputs[0].down || inputs[1].down,
                };
                self.pong.tick(input, dt);
                return;
            }
            Overlay::None => {}
        }

        self.clock += dt;
        let now = FrameTime::new(dt, self.clock);

        self.player = step(&self.player, &inputs[0], now, self.terrain.ridges_mut(), &self.tuning);
        if let Some(second) = self.second.as_mut() {
            *second = step(second, &inputs[1], now, self.terrain.ridges_mut(), &self.tuning);
        }

        for fly in self.fireflies.iter_mut() {
            fly.wander(dt, &mut self.rng);
        }
        self.catch_fireflies();

        self.update_winds(dt);
        self.update_shooting_stars(dt);
    }

    fn catch_fireflies(&mut self) {
        if !self.jar_held || self.player.vel.y >= 0.0 {
            return;
        }
        let jar = self.player.pos + JAR_OFFSET;
        for fly in self.fireflies.iter_mut() {
            if fly.pos.distance(jar) < CATCH_RADIUS {
                self.zen += 1;
                *fly = Firefly::random(fly.id, 320.0, &mut self.rng);
            }
        }
    }

    fn update_winds(&mut self, dt: f32) {
        let ready = self.wind_timer.tick(dt);
        if ready && (self.winds.len() as u32) < self.wind_target {
            self.wind_timer.reset(WIND_SPAWN_INTERVAL);
            let id = self.next_id();
            let gust = WindGust::random(id, &mut self.rng);
            self.winds.push(gust);
        }
        for gust in self.winds.iter_mut() {
            gust.advance(dt);
        }
        self.winds.retain(|g| !g.is_gone());
    }

    fn update_shooting_stars(&mut self, dt: f32) {
        let ready = self.star_timer.tick(dt);
        if ready && (self.shooting_stars.len() as u32) < self.star_target {
            self.star_timer.reset(SHOOTING_STAR_INTERVAL);
            let id = self.next_id();
            let star = ShootingStar::random(id, &mut self.rng);
            self.shooting_stars.push(star);
        }
        for star in self.shooting_stars.iter_mut() {
            star.advance(dt);
        }
        prune_expired(&mut self.shooting_stars);
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn second(&self) -> Option<(&Actor, &str)> {
        self.second.as_ref().map(|a| (a, self.second_name.as_str()))
    }

    pub fn fireflies(&self) -> &[Firefly] {
        &self.fireflies
    }

    pub fn winds(&self) -> &[WindGust] {
        &self.winds
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting_stars
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn grass(&self) -> &[GrassTuft] {
        &self.grass
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn jar_held(&self) -> bool {
        self.jar_held
    }

    pub fn zen(&self) -> u32 {
        self.zen
    }

    pub fn overlay(&self) -> Overlay {
        self.overlay
    }

    pub fn telescope(&self) -> &TelescopeView {
        &self.telescope
    }

    pub fn pong(&self) -> &Pong {
        &self.pong
    }

    pub fn idle_phase(&self) -> f32 {
        self.idle_phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;
    const IDLE: [ActorInput; 2] = [
        ActorInput { left: false, right: false, up: false, down: false },
        ActorInput { left: false, right: false, up: false, down: false },
    ];

    fn scene() -> NightScene {
        let mut scene = NightScene::new(7, &SceneSettings::default());
        scene.start();
        scene
    }

    /// Drop the player at `x` and let them land
    fn stand_at(scene: &mut NightScene, x: f32) {
        scene.player = Actor::spawn(Vec2::new(x, 300.0), Facing::Right);
        for _ in 0..120 {
            scene.tick(&IDLE, FrameTime::new(DT, 0.0));
        }
        assert!(scene.player.grounded);
    }

    #[test]
    fn test_not_started_is_frozen() {
        let mut scene = NightScene::new(7, &SceneSettings::default());
        let flies = scene.fireflies().to_vec();
        for _ in 0..10 {
            scene.tick(&IDLE, FrameTime::new(DT, 0.0));
        }
        assert_eq!(scene.fireflies(), flies.as_slice());
        assert_eq!(scene.player().pos, Vec2::new(250.0, 515.0));
    }

    #[test]
    fn test_jar_toggles_only_nearby() {
        let mut scene = scene();
        stand_at(&mut scene, 600.0);
        scene.interact(Interaction::Interact);
        assert!(!scene.jar_held());

        stand_at(&mut scene, JAR_X + 10.0);
        assert_eq!(scene.prompt(), Some("E to grab the jar"));
        scene.interact(Interaction::Interact);
        assert!(scene.jar_held());
        scene.interact(Interaction::Interact);
        assert!(!scene.jar_held());
    }

    #[test]
    fn test_catch_firefly_while_rising() {
        let mut scene = scene();
        scene.jar_held = true;
        // Above the swarm so only the parked fly is in reach
        scene.player.pos = Vec2::new(600.0, 250.0);
        scene.player.vel = Vec2::new(0.0, -500.0);
        scene.catch_fireflies_at_jar();
        assert_eq!(scene.zen(), 1);
        assert!(scene.fireflies[0].pos.distance(scene.player.pos + JAR_OFFSET) > CATCH_RADIUS);

        // Falling never catches
        scene.player.vel.y = 100.0;
        scene.catch_fireflies_at_jar();
        assert_eq!(scene.zen(), 1);
    }

    impl NightScene {
        /// Park the first firefly inside the jar and run the catch check
        fn catch_fireflies_at_jar(&mut self) {
            self.fireflies[0].pos = self.player.pos + JAR_OFFSET;
            self.catch_fireflies();
        }
    }

    #[test]
    fn test_telescope_overlay_suspends_physics() {
        let mut scene = scene();
        stand_at(&mut scene, TELESCOPE_X);
        assert_eq!(scene.prompt(), Some("Press Enter to use telescope"));
        scene.interact(Interaction::Use);
        assert_eq!(scene.overlay(), Overlay::Telescope);
        assert!(!scene.telescope().focused);

        let frozen = *scene.player();
        let right = ActorInput { right: true, ..Default::default() };
        scene.tick(&[right, right], FrameTime::new(DT, 0.0));
        assert_eq!(*scene.player(), frozen);

        scene.interact(Interaction::Pan(Vec2::new(-1.0, 0.0)));
        scene.interact(Interaction::Pan(Vec2::new(0.0, 1.0)));
        assert_eq!(scene.telescope().pan, Vec2::new(-20.0, 20.0));
        scene.interact(Interaction::Drag(Vec2::new(5.0, 5.0)));
        assert_eq!(scene.telescope().pan, Vec2::new(-25.0, 15.0));

        scene.interact(Interaction::Use);
        assert!(scene.telescope().focused);
        scene.interact(Interaction::Close);
        assert_eq!(scene.overlay(), Overlay::None);
        assert!(!scene.telescope().focused);
    }

    #[test]
    fn test_cabinet_opens_pong() {
        let mut scene = scene();
        stand_at(&mut scene, CABINET_X);
        scene.interact(Interaction::Use);
        assert_eq!(scene.overlay(), Overlay::Arcade);
        let ball = scene.pong().ball;
        scene.tick(&IDLE, FrameTime::new(DT, 0.0));
        assert_ne!(scene.pong().ball, ball);
        scene.interact(Interaction::Close);
        assert_eq!(scene.overlay(), Overlay::None);
    }

    #[test]
    fn test_cabinet_reach_is_wider() {
        let mut scene = scene();
        stand_at(&mut scene, CABINET_X + 35.0);
        assert!(scene.near_cabinet());
        assert_eq!(scene.prompt(), Some("Press Enter to play"));

        stand_at(&mut scene, TELESCOPE_X + 35.0);
        assert!(!scene.near_telescope());

        stand_at(&mut scene, CABINET_X + 45.0);
        assert!(!scene.near_cabinet());
    }

    #[test]
    fn test_nearest_star_under_crosshair() {
        let stars = star_catalogue(3);
        let mut view = TelescopeView { pan: stars[4].pos, focused: false };
        assert_eq!(view.nearest(&stars).map(|s| s.name), Some(stars[4].name));
        assert_eq!(view.readout(&stars).1.as_deref(), Some("Press Enter to focus"));
        view.focused = true;
        assert_eq!(view.readout(&stars).1.as_deref(), Some(stars[4].fact));

        view.pan = Vec2::new(1000.0, 1000.0);
        assert!(view.nearest(&stars).is_none());
    }

    #[test]
    fn test_catalogue_depends_on_seed() {
        assert_eq!(star_catalogue(1), star_catalogue(1));
        assert_ne!(star_catalogue(1), star_catalogue(2));
        for star in star_catalogue(5) {
            assert!(star.pos.x.abs() <= 300.0 && star.pos.y.abs() <= 180.0);
            let bg = star.backdrop_pos(Vec2::new(1200.0, 600.0));
            assert!((0.0..=1200.0).contains(&bg.x) && (0.0..=600.0).contains(&bg.y));
        }
    }

    #[test]
    fn test_wind_gusts_fill_to_target() {
        let mut scene = scene();
        for _ in 0..200 {
            scene.tick(&IDLE, FrameTime::new(DT, 0.0));
            assert!(scene.winds().len() <= 6);
        }
        assert_eq!(scene.winds().len(), 6);

        let calm = SceneSettings { wind_gusts: 0, ..SceneSettings::default() };
        let mut scene = NightScene::new(7, &calm);
        scene.start();
        for _ in 0..200 {
            scene.tick(&IDLE, FrameTime::new(DT, 0.0));
        }
        assert!(scene.winds().is_empty());
    }

    #[test]
    fn test_shooting_stars_respect_target() {
        let mut scene = scene();
        for _ in 0..200 {
            scene.tick(&IDLE, FrameTime::new(DT, 0.0));
        }
        assert!(scene.shooting_stars().is_empty());

        scene.apply_settings(&SceneSettings { shooting_stars: 2, ..SceneSettings::default() });
        let mut seen = 0;
        for _ in 0..300 {
            scene.tick(&IDLE, FrameTime::new(DT, 0.0));
            assert!(scene.shooting_stars().len() <= 2);
            seen = seen.max(scene.shooting_stars().len());
            for s in scene.shooting_stars() {
                assert!(s.life < s.max_life);
            }
        }
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_second_player_moves_independently() {
        let settings = SceneSettings { second_player: true, ..SceneSettings::default() };
        let mut scene = NightScene::new(7, &settings);
        scene.start();
        let left = ActorInput { left: true, ..Default::default() };
        for _ in 0..30 {
            scene.tick(&[ActorInput::default(), left], FrameTime::new(DT, 0.0));
        }
        let (second, name) = scene.second().unwrap();
        assert!(second.pos.x < 950.0);
        assert_eq!(name, "Player 2");
        assert_eq!(scene.player().pos.x, 250.0);
    }
}
