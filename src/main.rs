//! Starry Hills entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use starry_hills::SceneSettings;
    use starry_hills::audio::{AudioManager, SoundEffect};
    use starry_hills::platform::{Control, InputState, KeyBindings, TouchControls};
    use starry_hills::renderer::{CanvasRenderer, DrawCmd, meteor_frame, night_frame};
    use starry_hills::sim::{FrameDriver, Interaction, MeteorGame, MeteorPhase, NightScene, Overlay};

    const VOLUME_STEP: f32 = 0.05;

    enum Scene {
        Meteor(MeteorGame),
        Night(NightScene),
    }

    /// Everything the per-frame callbacks touch
    struct World {
        scene: Scene,
        input: InputState,
        touch: TouchControls,
    }

    /// Counters compared across a frame to trigger sound effects
    #[derive(Clone, Copy, PartialEq)]
    struct Cues {
        explosions: usize,
        lives: u32,
        zen: u32,
        game_over: bool,
    }

    impl World {
        fn cues(&self) -> Cues {
            match &self.scene {
                Scene::Meteor(game) => Cues {
                    explosions: game.explosions().len(),
                    lives: game.players().iter().map(|p| p.lives as u32).sum(),
                    zen: 0,
                    game_over: game.phase() == MeteorPhase::GameOver,
                },
                Scene::Night(scene) => Cues {
                    explosions: 0,
                    lives: 0,
                    zen: scene.zen(),
                    game_over: false,
                },
            }
        }

        fn frame(&self) -> Vec<DrawCmd> {
            match &self.scene {
                Scene::Meteor(game) => meteor_frame(game),
                Scene::Night(scene) => night_frame(scene),
            }
        }
    }

    /// App instance holding all state
    struct App {
        world: World,
        driver: FrameDriver<World>,
        renderer: CanvasRenderer,
        bindings: KeyBindings,
        settings: SceneSettings,
        audio: AudioManager,
        /// First user gesture unlocks audio
        gesture_seen: bool,
    }

    impl App {
        fn new(renderer: CanvasRenderer, night: bool, seed: u64) -> Self {
            let settings = SceneSettings::load();
            let (scene, bindings) = if night {
                (
                    Scene::Night(NightScene::new(seed, &settings)),
                    KeyBindings::night(settings.second_player),
                )
            } else {
                (Scene::Meteor(MeteorGame::new(seed)), KeyBindings::meteor())
            };

            let mut driver = FrameDriver::new();
            driver.register("scene", |world: &mut World, time| {
                let inputs = world.input.with_touch(&world.touch);
                match &mut world.scene {
                    Scene::Meteor(game) => game.tick(&inputs, time),
                    Scene::Night(scene) => scene.tick(&inputs, time),
                }
            });

            Self {
                world: World {
                    scene,
                    input: InputState::new(),
                    touch: TouchControls::default(),
                },
                driver,
                renderer,
                bindings,
                settings,
                audio: AudioManager::new(),
                gesture_seen: false,
            }
        }

        fn on_gesture(&mut self) {
            if !self.gesture_seen {
                self.gesture_seen = true;
                self.audio.resume();
                if matches!(self.world.scene, Scene::Night(_)) {
                    self.audio.apply_settings(&self.settings);
                }
            }
        }

        fn key_down(&mut self, key: &str) {
            self.on_gesture();
            match &mut self.world.scene {
                Scene::Meteor(_) => {
                    if key == "Enter" || key == " " {
                        self.one_shot(Control::Use);
                        return;
                    }
                }
                Scene::Night(scene) => {
                    if !scene.started() {
                        scene.start();
                        return;
                    }
                    if scene.overlay() == Overlay::Telescope {
                        let pan = self.bindings.lookup(key).and_then(|(_, c)| pan_direction(c));
                        if let Some(steps) = pan {
                            scene.interact(Interaction::Pan(steps));
                            return;
                        }
                    }
                }
            }
            match self.world.input.key_down(&self.bindings, key) {
                Some(control) => self.one_shot(control),
                None if matches!(self.world.scene, Scene::Night(_)) => self.settings_key(key),
                None => {}
            }
        }

        /// Discrete action from a key or touch button
        fn one_shot(&mut self, control: Control) {
            match &mut self.world.scene {
                Scene::Meteor(game) => {
                    if control == Control::Use {
                        match game.phase() {
                            MeteorPhase::Ready => game.start(),
                            MeteorPhase::GameOver => game.restart(),
                            MeteorPhase::Playing => {}
                        }
                    }
                }
                Scene::Night(scene) => {
                    if !scene.started() {
                        scene.start();
                        return;
                    }
                    match control {
                        Control::Interact => scene.interact(Interaction::Interact),
                        Control::Use => scene.interact(Interaction::Use),
                        Control::Close => scene.interact(Interaction::Close),
                        _ => {}
                    }
                }
            }
        }

        /// Night-scene preference shortcuts
        fn settings_key(&mut self, key: &str) {
            let mut next = self.settings.clone();
            match key {
                "m" | "M" => next.ambient_on = !next.ambient_on,
                "+" | "=" => next.set_volume(next.volume + VOLUME_STEP),
                "-" | "_" => next.set_volume(next.volume - VOLUME_STEP),
                "p" | "P" => next.second_player = !next.second_player,
                "g" | "G" => next.wind_gusts = (next.wind_gusts + 2) % 14,
                "h" | "H" => next.shooting_stars = (next.shooting_stars + 4) % 24,
                _ => return,
            }
            self.settings = next.clamped();
            self.settings.save();
            self.audio.apply_settings(&self.settings);
            if let Scene::Night(scene) = &mut self.world.scene {
                scene.apply_settings(&self.settings);
            }
            self.bindings = KeyBindings::night(self.settings.second_player);
            self.world.input.clear();
        }

        fn key_up(&mut self, key: &str) {
            self.world.input.key_up(&self.bindings, key);
        }

        /// Pointer drag pans the telescope sky
        fn drag(&mut self, delta_px: Vec2) {
            let scale = self.renderer.viewport().scale;
            if let Scene::Night(scene) = &mut self.world.scene {
                if scene.overlay() == Overlay::Telescope && scale > 0.0 {
                    scene.interact(Interaction::Drag(delta_px / scale));
                }
            }
        }

        fn touch_start(&mut self, id: i32, pos: Vec2, screen: Vec2) {
            self.on_gesture();
            let waiting = match &self.world.scene {
                Scene::Meteor(game) => game.phase() != MeteorPhase::Playing,
                Scene::Night(scene) => !scene.started(),
            };
            if waiting {
                self.one_shot(Control::Use);
                return;
            }

            let Some(control) = self.world.touch.touch_start(id, pos, screen) else {
                return;
            };
            // Grab doubles as the way out of an overlay
            let control = match &self.world.scene {
                Scene::Night(scene)
                    if control == Control::Interact && scene.overlay() != Overlay::None =>
                {
                    Control::Close
                }
                _ => control,
            };
            self.one_shot(control);
        }

        fn touch_move(&mut self, id: i32, pos: Vec2) {
            self.world.touch.touch_move(id, pos);
        }

        fn touch_end(&mut self, id: i32) {
            self.world.touch.touch_end(id);
        }

        fn frame(&mut self, timestamp_ms: f64) {
            let before = self.world.cues();
            self.driver.frame(&mut self.world, timestamp_ms);
            let after = self.world.cues();
            if after != before {
                self.play_cues(before, after);
            }

            if let Err(e) = self.renderer.render(&self.world.frame()) {
                log::warn!("Render error: {:?}", e);
            }
        }

        fn play_cues(&self, before: Cues, after: Cues) {
            if after.explosions > before.explosions {
                self.audio.play(SoundEffect::Burst);
            }
            if after.lives < before.lives {
                self.audio.play(SoundEffect::Hit);
            }
            if after.zen > before.zen {
                self.audio.play(SoundEffect::Catch);
            }
            if after.game_over && !before.game_over {
                self.audio.play(SoundEffect::GameOver);
            }
        }
    }

    /// Telescope pan step for a direction key
    fn pan_direction(control: Control) -> Option<Vec2> {
        match control {
            Control::Left => Some(Vec2::new(-1.0, 0.0)),
            Control::Right => Some(Vec2::new(1.0, 0.0)),
            Control::Up => Some(Vec2::new(0.0, -1.0)),
            Control::Down => Some(Vec2::new(0.0, 1.0)),
            _ => None,
        }
    }

    /// Canvas backing size in device pixels
    fn canvas_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        (
            (canvas.client_width() as f64 * dpr) as u32,
            (canvas.client_height() as f64 * dpr) as u32,
        )
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Starry Hills starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;

        let mut renderer = CanvasRenderer::new(canvas.clone())?;
        let (width, height) = canvas_size(&canvas);
        renderer.resize(width, height);

        let night = window.location().hash().is_ok_and(|h| h == "#night");
        let seed = js_sys::Date::now() as u64;
        let app = Rc::new(RefCell::new(App::new(renderer, night, seed)));
        log::info!(
            "{} scene initialized with seed: {}",
            if night { "Night" } else { "Meteor" },
            seed
        );

        setup_keyboard(&window, app.clone())?;
        setup_pointer(&canvas, app.clone())?;
        setup_touch(&canvas, app.clone())?;
        setup_resize(&window, &canvas, app.clone())?;
        setup_focus(&window, app.clone())?;

        request_animation_frame(app);
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                let mut a = app.borrow_mut();
                if a.bindings.captures(&key) || key == " " {
                    event.prevent_default();
                }
                if !event.repeat() {
                    a.key_down(&key);
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            app.borrow_mut().key_up(&event.key());
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_pointer(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().on_gesture();
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            // Primary button held
            if event.buttons() & 1 == 1 {
                let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio()) as f32;
                let delta = Vec2::new(event.movement_x() as f32, event.movement_y() as f32) * dpr;
                app.borrow_mut().drag(delta);
            }
        });
        canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Identifier and canvas-relative position of every touch that changed
    fn changed_touches(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Vec<(i32, Vec2)> {
        let rect = canvas.get_bounding_client_rect();
        let list = event.changed_touches();
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(|t| {
                let pos = Vec2::new(
                    (t.client_x() as f64 - rect.left()) as f32,
                    (t.client_y() as f64 - rect.top()) as f32,
                );
                (t.identifier(), pos)
            })
            .collect()
    }

    fn setup_touch(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let screen = Vec2::new(
                    canvas_clone.client_width() as f32,
                    canvas_clone.client_height() as f32,
                );
                let mut a = app.borrow_mut();
                for (id, pos) in changed_touches(&canvas_clone, &event) {
                    a.touch_start(id, pos, screen);
                }
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut a = app.borrow_mut();
                for (id, pos) in changed_touches(&canvas_clone, &event) {
                    a.touch_move(id, pos);
                }
            });
            canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let canvas_clone = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            event.prevent_default();
            let mut a = app.borrow_mut();
            for (id, _) in changed_touches(&canvas_clone, &event) {
                a.touch_end(id);
            }
        });
        canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_resize(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        app: Rc<RefCell<App>>,
    ) -> Result<(), JsValue> {
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = canvas_size(&canvas);
            app.borrow_mut().renderer.resize(width, height);
        });
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Release held keys when the page loses focus
    fn setup_focus(window: &web_sys::Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut a = app.borrow_mut();
            a.world.input.clear();
            a.world.touch.release_all();
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, time);
        });
        if window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .is_err()
        {
            log::warn!("requestAnimationFrame failed; frame loop stopped");
        }
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, time: f64) {
        app.borrow_mut().frame(time);
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use starry_hills::Tuning;
    use starry_hills::renderer::meteor_frame;
    use starry_hills::sim::{ActorInput, FrameDriver, MeteorGame, MeteorPhase, Terrain};

    env_logger::init();
    log::info!("Starry Hills (native) starting...");
    log::info!("Native mode runs a headless Meteor Dodge round - use `trunk serve` for the web version");

    // Optional tuning file as the first argument
    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {path}");
                tuning
            }
            Err(e) => {
                log::error!("Ignoring tuning file {path}: {e}");
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut game = MeteorGame::with_setup(42, tuning, Terrain::hills());
    game.start();

    // Player one hops right, player two stands still
    let mut driver: FrameDriver<MeteorGame> = FrameDriver::new();
    driver.register("meteor", |game, time| {
        let hop = ActorInput {
            right: true,
            up: (time.elapsed * 2.0).fract() < 0.1,
            ..Default::default()
        };
        game.tick(&[hop, ActorInput::default()], time);
    });

    let mut frames = 0u32;
    let mut now_ms = 0.0;
    while game.phase() != MeteorPhase::GameOver && frames < 60 * 180 {
        driver.frame(&mut game, now_ms);
        now_ms += 1000.0 / 60.0;
        frames += 1;
    }

    let [p1, p2] = game.players();
    log::info!(
        "{} frames, {:.1}s survived, {} meteors dodged, {} draw commands in last frame",
        frames,
        game.time_survived(),
        game.meteors_dodged(),
        meteor_frame(&game).len()
    );
    println!(
        "{} | P1 {} pts ({} lives) | P2 {} pts ({} lives)",
        game.winner(),
        p1.score,
        p1.lives,
        p2.score,
        p2.lives
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
