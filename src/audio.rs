//! Audio using the Web Audio API
//!
//! A soft ambient drone for the night scene plus a few synthesized effects
//! for Meteor Dodge. Everything is generated with oscillators.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::SceneSettings;

/// Drone pitch (Hz)
const DRONE_FREQ: f32 = 432.0;
/// Tremolo rate (Hz)
const LFO_FREQ: f32 = 0.15;
/// Tremolo depth relative to the drone volume
const LFO_DEPTH: f32 = 0.6;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Meteor bursts on a crest
    Burst,
    /// Player caught in a blast
    Hit,
    /// Firefly caught in the jar
    Catch,
    /// Every player is out
    GameOver,
}

struct Drone {
    osc: OscillatorNode,
    gain: GainNode,
    lfo: OscillatorNode,
    lfo_gain: GainNode,
}

/// Audio manager for both scenes
pub struct AudioManager {
    ctx: Option<AudioContext>,
    drone: Option<Drone>,
    volume: f32,
    sfx_volume: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            drone: None,
            volume: 0.15,
            sfx_volume: 0.6,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }
    }

    /// Follow the drone switch and volume from settings
    pub fn apply_settings(&mut self, settings: &SceneSettings) {
        self.set_volume(settings.volume);
        match (settings.ambient_on, self.drone.is_some()) {
            (true, false) => self.start_ambient(),
            (false, true) => self.stop_ambient(),
            _ => {}
        }
    }

    /// Drone volume (0.0 - 1.0), applied live
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(drone) = &self.drone {
            drone.gain.gain().set_value(self.volume);
            drone.lfo_gain.gain().set_value(self.volume * LFO_DEPTH);
        }
    }

    pub fn ambient_playing(&self) -> bool {
        self.drone.is_some()
    }

    /// Sine drone with a slow amplitude wobble
    pub fn start_ambient(&mut self) {
        if self.drone.is_some() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        self.resume();

        let Some(drone) = Self::build_drone(ctx, self.volume) else {
            log::warn!("Could not build ambient drone");
            return;
        };
        drone.osc.start().ok();
        drone.lfo.start().ok();
        self.drone = Some(drone);
        log::info!("Ambient drone started");
    }

    fn build_drone(ctx: &AudioContext, volume: f32) -> Option<Drone> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        let lfo = ctx.create_oscillator().ok()?;
        let lfo_gain = ctx.create_gain().ok()?;

        osc.set_type(OscillatorType::Sine);
        osc.frequency().set_value(DRONE_FREQ);
        gain.gain().set_value(volume);
        lfo.set_type(OscillatorType::Sine);
        lfo.frequency().set_value(LFO_FREQ);
        lfo_gain.gain().set_value(volume * LFO_DEPTH);

        lfo.connect_with_audio_node(&lfo_gain).ok()?;
        lfo_gain.connect_with_audio_param(&gain.gain()).ok()?;
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some(Drone { osc, gain, lfo, lfo_gain })
    }

    pub fn stop_ambient(&mut self) {
        if let Some(drone) = self.drone.take() {
            drone.osc.stop().ok();
            drone.lfo.stop().ok();
            drone.gain.disconnect().ok();
            log::info!("Ambient drone stopped");
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.sfx_volume;
        let Some(ctx) = &self.ctx else { return };
        self.resume();

        match effect {
            SoundEffect::Burst => self.play_burst(ctx, vol),
            SoundEffect::Hit => self.play_hit(ctx, vol),
            SoundEffect::Catch => self.play_catch(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Low rumble falling in pitch
    fn play_burst(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.35)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(40.0, t + 0.35)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    /// Short square buzz
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency().set_value_at_time(110.0, t + 0.08).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.25).ok();
    }

    /// Rising chime
    fn play_catch(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 660.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(1320.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.35).ok();
    }

    /// Descending three-note phrase
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (i, freq) in [392.0, 311.0, 262.0].into_iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
                return;
            };
            let start = t + i as f64 * 0.22;
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().set_value_at_time(vol * 0.3, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.2)
                .ok();
            osc.start().ok();
            osc.stop_with_when(start + 0.22).ok();
        }
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        self.stop_ambient();
    }
}
