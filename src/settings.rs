//! Game settings and configuration
//!
//! User preferences for the window, keybindings and controller pairing, stored
//! as RON next to the executable.

use bevy::prelude::*;
use bevy::window::{MonitorSelection, PresentMode, WindowMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::keybindings::Keybindings;
use crate::states::play_match::tuning::CombatTuning;

/// Default settings file name.
pub const SETTINGS_FILE: &str = "settings.ron";

/// User-configurable game settings
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub window_mode: WindowModeOption,
    pub resolution: ResolutionOption,
    pub vsync: bool,
    pub keybindings: Keybindings,
    /// Slots without a controller sit out (slot 0 still has the keyboard if allowed)
    pub require_controller: bool,
    /// Let player 1 play on the keyboard
    pub keyboard_fallback: bool,
    /// Pre-match countdown in seconds
    pub countdown_secs: f32,
    /// Overrides the tuning file when present
    pub tuning: Option<CombatTuning>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            window_mode: WindowModeOption::Windowed,
            resolution: ResolutionOption::HD720,
            vsync: true,
            keybindings: Keybindings::default(),
            require_controller: false,
            keyboard_fallback: true,
            countdown_secs: crate::states::play_match::constants::PREMATCH_COUNTDOWN,
            tuning: None,
        }
    }
}

impl GameSettings {
    fn settings_path() -> PathBuf {
        PathBuf::from(SETTINGS_FILE)
    }

    /// Load settings from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let settings: GameSettings = ron::from_str(&contents)?;
        if settings.countdown_secs < 0.0 {
            return Err(ConfigError::Invalid(
                "countdown_secs must not be negative".to_string(),
            ));
        }
        if let Some(tuning) = &settings.tuning {
            tuning.validate()?;
        }
        Ok(settings)
    }

    /// Load settings from the default file, or fall back to defaults.
    pub fn load() -> Self {
        Self::load_or_default(&Self::settings_path())
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("Failed to load settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        fs::write(path, contents)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::settings_path())
    }
}

/// Window mode options
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowModeOption {
    Windowed,
    BorderlessFullscreen,
}

impl WindowModeOption {
    pub fn to_bevy(&self) -> WindowMode {
        match self {
            WindowModeOption::Windowed => WindowMode::Windowed,
            WindowModeOption::BorderlessFullscreen => {
                WindowMode::BorderlessFullscreen(MonitorSelection::Current)
            }
        }
    }
}

/// Resolution presets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOption {
    HD720,
    HD1080,
    QHD1440,
}

impl ResolutionOption {
    pub fn dimensions(&self) -> (f32, f32) {
        match self {
            ResolutionOption::HD720 => (1280.0, 720.0),
            ResolutionOption::HD1080 => (1920.0, 1080.0),
            ResolutionOption::QHD1440 => (2560.0, 1440.0),
        }
    }
}

impl GameSettings {
    /// Primary window described by these settings.
    pub fn window(&self) -> Window {
        let (width, height) = self.resolution.dimensions();
        Window {
            title: "Skybrawl".to_string(),
            resolution: (width, height).into(),
            mode: self.window_mode.to_bevy(),
            present_mode: if self.vsync {
                PresentMode::AutoVsync
            } else {
                PresentMode::AutoNoVsync
            },
            resizable: true,
            ..default()
        }
    }
}

/// Plugin for managing game settings
///
/// Expects [`GameSettings`] to be inserted already (see `main`), otherwise loads the
/// default file.
pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        let settings = match app.world().get_resource::<GameSettings>() {
            Some(settings) => settings.clone(),
            None => GameSettings::load(),
        };
        let keybindings = settings.keybindings.clone();

        app.insert_resource(settings)
            .insert_resource(keybindings)
            .add_systems(Update, (save_settings_on_change, sync_keybindings));
    }
}

/// Save settings whenever they change after startup
fn save_settings_on_change(settings: Res<GameSettings>) {
    if settings.is_changed() && !settings.is_added() {
        if let Err(e) = settings.save() {
            error!("Failed to save settings: {}", e);
        }
    }
}

/// Keep the Keybindings resource in sync with GameSettings
fn sync_keybindings(settings: Res<GameSettings>, mut keybindings: ResMut<Keybindings>) {
    if settings.is_changed() && !settings.is_added() {
        *keybindings = settings.keybindings.clone();
        info!("Synced keybindings from settings");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roundtrip_through_file() {
        let path = std::env::temp_dir().join("skybrawl_settings_roundtrip.ron");
        let settings = GameSettings {
            require_controller: true,
            countdown_secs: 1.5,
            ..default()
        };
        settings.save_to(&path).expect("save");
        let loaded = GameSettings::load_from(&path).expect("load");
        assert_eq!(loaded, settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: GameSettings = ron::from_str("(vsync: false)").expect("parse");
        assert!(!settings.vsync);
        assert!(settings.keyboard_fallback);
    }

    #[test]
    fn test_tuning_override_is_validated() {
        let path = std::env::temp_dir().join("skybrawl_settings_tuning.ron");
        fs::write(&path, "(tuning: Some((knockback: (hit_threshold: 0))))").expect("write");
        assert!(matches!(
            GameSettings::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, "(tuning: Some((knockback: (hit_threshold: 5))))").expect("write");
        let settings = GameSettings::load_from(&path).expect("load");
        assert_eq!(settings.tuning.map(|t| t.knockback.hit_threshold), Some(5));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_unreadable_file_falls_back() {
        let path = std::env::temp_dir().join("skybrawl_settings_broken.ron");
        fs::write(&path, "(vsync: ").expect("write");
        assert_eq!(GameSettings::load_or_default(&path), GameSettings::default());
        let _ = fs::remove_file(&path);
    }
}
