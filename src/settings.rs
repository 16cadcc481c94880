//! Player preferences
//!
//! Persisted separately from scores, as one JSON value in the key/value store.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore};
use crate::sim::{DeviceClass, GameMode, GameSpeed, WorldConfig};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty selector shared by both games
    pub game_speed: GameSpeed,
    /// Desktop or touch device (runner input latency compensation)
    pub device_class: DeviceClass,
    /// Last game played
    pub last_mode: GameMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_speed: GameSpeed::default(),
            device_class: DeviceClass::Desktop,
            last_mode: GameMode::Flap,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "avatar_arcade_settings";

    /// World configuration these preferences select for `mode`
    pub fn world_config(&self, mode: GameMode, width: f32, height: f32) -> WorldConfig {
        WorldConfig::for_mode(mode, self.game_speed, self.device_class, width, height)
    }

    /// Load settings; missing or malformed data yields defaults
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let settings: Self = persistence::load_json(store, Self::STORAGE_KEY);
        log::info!(
            "Settings: speed {}, {:?}, last game {}",
            settings.game_speed.level(),
            settings.device_class,
            settings.last_mode.as_str()
        );
        settings
    }

    /// Save settings; a failed write is logged and otherwise ignored
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) {
        if persistence::store_json_or_log(store, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}
