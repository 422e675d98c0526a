//! Night scene preferences
//!
//! Persisted as JSON under `starry_hills_settings`. Out-of-range values from
//! storage are clamped on load.

use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, default_store, load_json, save_json};
use crate::sim::entities::{MAX_SHOOTING_STARS, MAX_WIND_GUSTS};

/// Scene settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    // === Sky ===
    /// Wind gusts kept drifting across the sky (0 - 12)
    pub wind_gusts: u32,
    /// Shooting stars in flight at once (0 - 20)
    pub shooting_stars: u32,

    // === Audio ===
    /// Ambient drone playing
    pub ambient_on: bool,
    /// Drone volume (0.0 - 1.0)
    pub volume: f32,

    // === Players ===
    /// Arrow keys drive a second figure
    pub second_player: bool,
    pub second_player_name: String,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            wind_gusts: 6,
            shooting_stars: 0,

            ambient_on: false,
            volume: 0.15,

            second_player: false,
            second_player_name: "Player 2".to_string(),
        }
    }
}

impl SceneSettings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "starry_hills_settings";

    /// Bring every field into its valid range
    pub fn clamped(mut self) -> Self {
        self.wind_gusts = self.wind_gusts.min(MAX_WIND_GUSTS);
        self.shooting_stars = self.shooting_stars.min(MAX_SHOOTING_STARS);
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.15
        };
        let name = self.second_player_name.trim();
        self.second_player_name = if name.is_empty() {
            "Player 2".to_string()
        } else {
            name.to_string()
        };
        self
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        *self = std::mem::take(self).clamped();
    }

    pub fn load_from(store: &dyn KeyValueStore) -> Self {
        match load_json::<Self>(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings.clamped()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, store: &mut dyn KeyValueStore) {
        if save_json(store, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        } else {
            log::warn!("Settings could not be saved");
        }
    }

    /// Load from the platform store
    pub fn load() -> Self {
        Self::load_from(default_store().as_ref())
    }

    /// Save to the platform store
    pub fn save(&self) {
        self.save_to(default_store().as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults() {
        let s = SceneSettings::default();
        assert_eq!(s.wind_gusts, 6);
        assert_eq!(s.shooting_stars, 0);
        assert_eq!(s.volume, 0.15);
        assert!(!s.ambient_on);
    }

    #[test]
    fn test_save_and_load() {
        let mut store = MemoryStore::new();
        let settings = SceneSettings {
            wind_gusts: 3,
            shooting_stars: 12,
            ambient_on: true,
            ..SceneSettings::default()
        };
        settings.save_to(&mut store);
        assert_eq!(SceneSettings::load_from(&store), settings);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let mut store = MemoryStore::new();
        store.set(
            SceneSettings::STORAGE_KEY,
            r#"{ "wind_gusts": 40, "shooting_stars": 99, "volume": 3.5, "second_player_name": "  " }"#,
        );
        let s = SceneSettings::load_from(&store);
        assert_eq!(s.wind_gusts, 12);
        assert_eq!(s.shooting_stars, 20);
        assert_eq!(s.volume, 1.0);
        assert_eq!(s.second_player_name, "Player 2");
    }

    #[test]
    fn test_missing_entry_uses_defaults() {
        let store = MemoryStore::new();
        assert_eq!(SceneSettings::load_from(&store), SceneSettings::default());
    }
}
