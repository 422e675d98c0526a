//! Platform input layer
//!
//! Maps browser key names and touch positions to per-player actor input and
//! discrete scene actions. Kept free of `web_sys` so it runs natively too.

use glam::Vec2;

use crate::sim::actor::ActorInput;

/// Minimum joystick tilt that counts as a direction
pub const JOYSTICK_THRESHOLD: f32 = 0.3;

/// Logical control bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Left,
    Right,
    Up,
    Down,
    /// Grab/put down (E)
    Interact,
    /// Open hotspot or toggle focus (Enter)
    Use,
    /// Close overlay (Escape)
    Close,
}

impl Control {
    /// Held controls feed actor input; the rest fire once per press
    pub fn is_held(self) -> bool {
        matches!(self, Control::Left | Control::Right | Control::Up | Control::Down)
    }
}

/// Key name to (player index, control) table
#[derive(Debug, Clone)]
pub struct KeyBindings {
    entries: Vec<(&'static str, usize, Control)>,
}

const WASD: [(&str, Control); 4] = [
    ("a", Control::Left),
    ("d", Control::Right),
    ("w", Control::Up),
    ("s", Control::Down),
];

const ARROWS: [(&str, Control); 4] = [
    ("ArrowLeft", Control::Left),
    ("ArrowRight", Control::Right),
    ("ArrowUp", Control::Up),
    ("ArrowDown", Control::Down),
];

impl KeyBindings {
    /// Meteor Dodge: WASD is player one, arrows player two
    pub fn meteor() -> Self {
        let mut entries: Vec<_> = WASD.iter().map(|&(k, c)| (k, 0, c)).collect();
        entries.extend(ARROWS.iter().map(|&(k, c)| (k, 1, c)));
        Self { entries }
    }

    /// Night scene: arrows drive player one unless a second player is on
    pub fn night(second_player: bool) -> Self {
        let arrow_player = usize::from(second_player);
        let mut entries: Vec<_> = WASD.iter().map(|&(k, c)| (k, 0, c)).collect();
        entries.extend(ARROWS.iter().map(|&(k, c)| (k, arrow_player, c)));
        entries.extend([
            ("e", 0, Control::Interact),
            ("E", 0, Control::Interact),
            ("Enter", 0, Control::Use),
            ("Escape", 0, Control::Close),
        ]);
        Self { entries }
    }

    pub fn lookup(&self, key: &str) -> Option<(usize, Control)> {
        self.entries
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|&(_, player, control)| (player, control))
    }

    /// Keys whose browser default (scrolling) should be suppressed
    pub fn captures(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }
}

/// Held-key state for up to two players
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    players: [ActorInput; 2],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press; returns the control if it is a one-shot action
    pub fn key_down(&mut self, bindings: &KeyBindings, key: &str) -> Option<Control> {
        let (player, control) = bindings.lookup(key)?;
        if control.is_held() {
            self.set(player, control, true);
            None
        } else {
            Some(control)
        }
    }

    pub fn key_up(&mut self, bindings: &KeyBindings, key: &str) {
        if let Some((player, control)) = bindings.lookup(key) {
            self.set(player, control, false);
        }
    }

    fn set(&mut self, player: usize, control: Control, down: bool) {
        let Some(input) = self.players.get_mut(player) else {
            return;
        };
        match control {
            Control::Left => input.left = down,
            Control::Right => input.right = down,
            Control::Up => input.up = down,
            Control::Down => input.down = down,
            Control::Interact | Control::Use | Control::Close => {}
        }
    }

    /// Release everything (focus lost)
    pub fn clear(&mut self) {
        self.players = Default::default();
    }

    pub fn actor_inputs(&self) -> [ActorInput; 2] {
        self.players
    }

    /// Overlay touch controls on top of player one's keys
    pub fn with_touch(&self, touch: &TouchControls) -> [ActorInput; 2] {
        let mut inputs = self.players;
        let t = touch.actor_input();
        let p1 = &mut inputs[0];
        p1.left |= t.left;
        p1.right |= t.right;
        p1.up |= t.up;
        p1.down |= t.down;
        inputs
    }
}

/// Clamp a touch offset to the stick base and scale into [-1, 1]
pub fn normalize_stick(center: Vec2, radius: f32, touch: Vec2) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }
    (touch - center).clamp_length_max(radius) / radius
}

/// Stick base radius in screen pixels
pub const STICK_RADIUS: f32 = 50.0;

/// Screen region a touch started in
///
/// The left half is the joystick. The right half is a 2x2 grid of buttons:
/// grab and use on top, down and jump below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchZone {
    Stick,
    Grab,
    Use,
    Down,
    Jump,
}

impl TouchZone {
    pub fn at(pos: Vec2, screen: Vec2) -> Self {
        let half = screen / 2.0;
        if pos.x < half.x {
            return TouchZone::Stick;
        }
        let left_column = pos.x < half.x + half.x / 2.0;
        match (pos.y < half.y, left_column) {
            (true, true) => TouchZone::Grab,
            (true, false) => TouchZone::Use,
            (false, true) => TouchZone::Down,
            (false, false) => TouchZone::Jump,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveTouch {
    id: i32,
    zone: TouchZone,
    origin: Vec2,
}

/// On-screen joystick and buttons, tracked per finger
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchControls {
    /// Normalized stick position
    pub stick: Vec2,
    pub jump: bool,
    pub down: bool,
    active: Vec<ActiveTouch>,
}

impl TouchControls {
    pub fn actor_input(&self) -> ActorInput {
        ActorInput {
            left: self.stick.x < -JOYSTICK_THRESHOLD,
            right: self.stick.x > JOYSTICK_THRESHOLD,
            up: self.jump,
            down: self.down,
        }
    }

    /// A finger went down; grab and use fire once and are returned
    pub fn touch_start(&mut self, id: i32, pos: Vec2, screen: Vec2) -> Option<Control> {
        let zone = TouchZone::at(pos, screen);
        match zone {
            TouchZone::Grab => return Some(Control::Interact),
            TouchZone::Use => return Some(Control::Use),
            TouchZone::Stick => {
                // A second stick finger takes over from the first
                self.active.retain(|t| t.zone != TouchZone::Stick);
                self.stick = Vec2::ZERO;
            }
            TouchZone::Jump => self.jump = true,
            TouchZone::Down => self.down = true,
        }
        self.active.push(ActiveTouch { id, zone, origin: pos });
        None
    }

    pub fn touch_move(&mut self, id: i32, pos: Vec2) {
        if let Some(t) = self.active.iter().find(|t| t.id == id && t.zone == TouchZone::Stick) {
            self.stick = normalize_stick(t.origin, STICK_RADIUS, pos);
        }
    }

    /// A finger lifted; only the control it was holding is released
    pub fn touch_end(&mut self, id: i32) {
        let Some(index) = self.active.iter().position(|t| t.id == id) else {
            return;
        };
        let ended = self.active.remove(index);
        let still_held = self.active.iter().any(|t| t.zone == ended.zone);
        match ended.zone {
            TouchZone::Stick => self.release_stick(),
            TouchZone::Jump => self.jump = still_held,
            TouchZone::Down => self.down = still_held,
            TouchZone::Grab | TouchZone::Use => {}
        }
    }

    pub fn release_stick(&mut self) {
        self.stick = Vec2::ZERO;
    }

    /// Drop every finger (focus lost, touch cancelled)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meteor_bindings_split_players() {
        let keys = KeyBindings::meteor();
        assert_eq!(keys.lookup("a"), Some((0, Control::Left)));
        assert_eq!(keys.lookup("ArrowUp"), Some((1, Control::Up)));
        assert_eq!(keys.lookup("e"), None);
    }

    #[test]
    fn test_night_arrows_follow_second_player_setting() {
        assert_eq!(KeyBindings::night(false).lookup("ArrowLeft"), Some((0, Control::Left)));
        assert_eq!(KeyBindings::night(true).lookup("ArrowLeft"), Some((1, Control::Left)));
        assert_eq!(KeyBindings::night(false).lookup("Enter"), Some((0, Control::Use)));
    }

    #[test]
    fn test_held_and_one_shot_keys() {
        let keys = KeyBindings::night(true);
        let mut state = InputState::new();
        assert_eq!(state.key_down(&keys, "d"), None);
        assert_eq!(state.key_down(&keys, "ArrowUp"), None);
        assert_eq!(state.key_down(&keys, "e"), Some(Control::Interact));
        assert_eq!(state.key_down(&keys, "F5"), None);

        let inputs = state.actor_inputs();
        assert!(inputs[0].right && !inputs[0].up);
        assert!(inputs[1].up);

        state.key_up(&keys, "d");
        assert!(!state.actor_inputs()[0].right);
        state.clear();
        assert_eq!(state.actor_inputs(), [ActorInput::default(); 2]);
    }

    #[test]
    fn test_stick_is_clamped_and_normalized() {
        let center = Vec2::new(100.0, 100.0);
        let v = normalize_stick(center, 50.0, Vec2::new(300.0, 100.0));
        assert!((v - Vec2::new(1.0, 0.0)).length() < 1e-6);
        let v = normalize_stick(center, 50.0, Vec2::new(110.0, 120.0));
        assert!((v - Vec2::new(0.2, 0.4)).length() < 1e-6);
    }

    #[test]
    fn test_stick_threshold() {
        let mut touch = TouchControls {
            stick: Vec2::new(-0.31, 0.9),
            ..Default::default()
        };
        let input = touch.actor_input();
        assert!(input.left && !input.right && !input.down);
        touch.stick = Vec2::new(0.3, 0.0);
        assert!(!touch.actor_input().right);

        touch.jump = true;
        let merged = InputState::new().with_touch(&touch);
        assert!(merged[0].up);
        assert!(!merged[1].up);
    }

    const SCREEN: Vec2 = Vec2::new(800.0, 400.0);

    #[test]
    fn test_touch_zones() {
        assert_eq!(TouchZone::at(Vec2::new(100.0, 350.0), SCREEN), TouchZone::Stick);
        assert_eq!(TouchZone::at(Vec2::new(450.0, 100.0), SCREEN), TouchZone::Grab);
        assert_eq!(TouchZone::at(Vec2::new(700.0, 100.0), SCREEN), TouchZone::Use);
        assert_eq!(TouchZone::at(Vec2::new(450.0, 300.0), SCREEN), TouchZone::Down);
        assert_eq!(TouchZone::at(Vec2::new(700.0, 300.0), SCREEN), TouchZone::Jump);
    }

    #[test]
    fn test_lifting_jump_keeps_stick() {
        let mut touch = TouchControls::default();
        assert_eq!(touch.touch_start(1, Vec2::new(100.0, 300.0), SCREEN), None);
        touch.touch_move(1, Vec2::new(160.0, 300.0));
        assert_eq!(touch.touch_start(2, Vec2::new(700.0, 300.0), SCREEN), None);
        let input = touch.actor_input();
        assert!(input.right && input.up);

        touch.touch_end(2);
        let input = touch.actor_input();
        assert!(input.right, "stick finger is still down");
        assert!(!input.up);

        touch.touch_end(1);
        assert_eq!(touch.actor_input(), ActorInput::default());
    }

    #[test]
    fn test_touch_down_and_buttons() {
        let mut touch = TouchControls::default();
        assert_eq!(touch.touch_start(3, Vec2::new(450.0, 300.0), SCREEN), None);
        assert!(touch.actor_input().down);
        assert_eq!(
            touch.touch_start(4, Vec2::new(450.0, 100.0), SCREEN),
            Some(Control::Interact)
        );
        assert_eq!(touch.touch_start(5, Vec2::new(700.0, 100.0), SCREEN), Some(Control::Use));
        // Button fingers lifting do not release down
        touch.touch_end(4);
        touch.touch_end(5);
        assert!(touch.actor_input().down);

        // Moving a button finger does not move the stick
        touch.touch_move(3, Vec2::new(0.0, 0.0));
        assert_eq!(touch.stick, Vec2::ZERO);

        touch.release_all();
        assert!(!touch.actor_input().down);
    }

    #[test]
    fn test_two_jump_fingers() {
        let mut touch = TouchControls::default();
        touch.touch_start(1, Vec2::new(700.0, 300.0), SCREEN);
        touch.touch_start(2, Vec2::new(750.0, 350.0), SCREEN);
        touch.touch_end(1);
        assert!(touch.jump);
        touch.touch_end(2);
        assert!(!touch.jump);
    }
}
