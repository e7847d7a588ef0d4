//! Keybinding system for the keyboard fallback
//!
//! Slot 0 may be driven from the keyboard when no controller is paired (or alongside
//! one). Every combat action is remappable and saved with the settings.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Combat actions that can be bound to keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    Down,
    Jump,
    Dash,
    LightAttack,
    HeavyAttack,
}

impl GameAction {
    pub fn description(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "Move Left",
            GameAction::MoveRight => "Move Right",
            GameAction::Down => "Down / Drop Through",
            GameAction::Jump => "Jump",
            GameAction::Dash => "Dash",
            GameAction::LightAttack => "Light Attack",
            GameAction::HeavyAttack => "Heavy Attack",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            GameAction::MoveLeft | GameAction::MoveRight | GameAction::Down => "Movement",
            GameAction::Jump | GameAction::Dash => "Mobility",
            GameAction::LightAttack | GameAction::HeavyAttack => "Attacks",
        }
    }

    pub fn all() -> Vec<GameAction> {
        vec![
            GameAction::MoveLeft,
            GameAction::MoveRight,
            GameAction::Down,
            GameAction::Jump,
            GameAction::Dash,
            GameAction::LightAttack,
            GameAction::HeavyAttack,
        ]
    }
}

/// Serializable wrapper for KeyCode (stores as string)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct SerializableKeyCode(String);

impl From<KeyCode> for SerializableKeyCode {
    fn from(key: KeyCode) -> Self {
        Self(format!("{:?}", key))
    }
}

impl TryFrom<SerializableKeyCode> for KeyCode {
    type Error = String;

    fn try_from(sk: SerializableKeyCode) -> Result<Self, Self::Error> {
        let key = match sk.0.as_str() {
            "Space" => KeyCode::Space,
            "Enter" => KeyCode::Enter,
            "Tab" => KeyCode::Tab,
            "ShiftLeft" => KeyCode::ShiftLeft,
            "ShiftRight" => KeyCode::ShiftRight,
            "ControlLeft" => KeyCode::ControlLeft,
            "ControlRight" => KeyCode::ControlRight,
            "AltLeft" => KeyCode::AltLeft,
            "KeyA" => KeyCode::KeyA,
            "KeyB" => KeyCode::KeyB,
            "KeyC" => KeyCode::KeyC,
            "KeyD" => KeyCode::KeyD,
            "KeyE" => KeyCode::KeyE,
            "KeyF" => KeyCode::KeyF,
            "KeyG" => KeyCode::KeyG,
            "KeyH" => KeyCode::KeyH,
            "KeyI" => KeyCode::KeyI,
            "KeyJ" => KeyCode::KeyJ,
            "KeyK" => KeyCode::KeyK,
            "KeyL" => KeyCode::KeyL,
            "KeyM" => KeyCode::KeyM,
            "KeyN" => KeyCode::KeyN,
            "KeyO" => KeyCode::KeyO,
            "KeyP" => KeyCode::KeyP,
            "KeyQ" => KeyCode::KeyQ,
            "KeyR" => KeyCode::KeyR,
            "KeyS" => KeyCode::KeyS,
            "KeyT" => KeyCode::KeyT,
            "KeyU" => KeyCode::KeyU,
            "KeyV" => KeyCode::KeyV,
            "KeyW" => KeyCode::KeyW,
            "KeyX" => KeyCode::KeyX,
            "KeyY" => KeyCode::KeyY,
            "KeyZ" => KeyCode::KeyZ,
            "Digit1" => KeyCode::Digit1,
            "Digit2" => KeyCode::Digit2,
            "Digit3" => KeyCode::Digit3,
            "Digit4" => KeyCode::Digit4,
            "Comma" => KeyCode::Comma,
            "Period" => KeyCode::Period,
            "Slash" => KeyCode::Slash,
            "Semicolon" => KeyCode::Semicolon,
            "ArrowUp" => KeyCode::ArrowUp,
            "ArrowDown" => KeyCode::ArrowDown,
            "ArrowLeft" => KeyCode::ArrowLeft,
            "ArrowRight" => KeyCode::ArrowRight,
            "Numpad0" => KeyCode::Numpad0,
            "Numpad1" => KeyCode::Numpad1,
            "Numpad2" => KeyCode::Numpad2,
            "Numpad3" => KeyCode::Numpad3,
            other => return Err(format!("unsupported key name '{}'", other)),
        };
        Ok(key)
    }
}

/// Key binding with primary and optional secondary key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeyBinding {
    #[serde(with = "keycode_serde")]
    pub primary: KeyCode,
    #[serde(with = "option_keycode_serde", default)]
    pub secondary: Option<KeyCode>,
}

mod keycode_serde {
    use super::*;
    use serde::{de::Error, Deserializer, Serializer};

    pub fn serialize<S>(key: &KeyCode, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sk: SerializableKeyCode = (*key).into();
        sk.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<KeyCode, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sk = SerializableKeyCode::deserialize(deserializer)?;
        KeyCode::try_from(sk).map_err(D::Error::custom)
    }
}

mod option_keycode_serde {
    use super::*;
    use serde::{de::Error, Deserializer, Serializer};

    pub fn serialize<S>(key: &Option<KeyCode>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match key {
            Some(k) => {
                let sk: SerializableKeyCode = (*k).into();
                serializer.serialize_some(&sk)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<KeyCode>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt_sk: Option<SerializableKeyCode> = Option::deserialize(deserializer)?;
        opt_sk
            .map(|sk| KeyCode::try_from(sk).map_err(D::Error::custom))
            .transpose()
    }
}

impl KeyBinding {
    pub fn new(primary: KeyCode) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(primary: KeyCode, secondary: KeyCode) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    pub fn matches(&self, key: KeyCode) -> bool {
        self.primary == key || self.secondary == Some(key)
    }
}

/// Complete keybindings configuration
#[derive(Debug, Clone, Resource, Serialize, Deserialize, PartialEq)]
pub struct Keybindings {
    bindings: HashMap<GameAction, KeyBinding>,
}

impl Default for Keybindings {
    fn default() -> Self {
        Self::create_defaults()
    }
}

impl Keybindings {
    /// Create default keybindings
    pub fn create_defaults() -> Self {
        let mut bindings = HashMap::new();

        bindings.insert(
            GameAction::MoveLeft,
            KeyBinding::with_secondary(KeyCode::KeyA, KeyCode::ArrowLeft),
        );
        bindings.insert(
            GameAction::MoveRight,
            KeyBinding::with_secondary(KeyCode::KeyD, KeyCode::ArrowRight),
        );
        bindings.insert(
            GameAction::Down,
            KeyBinding::with_secondary(KeyCode::KeyS, KeyCode::ArrowDown),
        );
        bindings.insert(
            GameAction::Jump,
            KeyBinding::with_secondary(KeyCode::Space, KeyCode::KeyW),
        );
        bindings.insert(GameAction::Dash, KeyBinding::new(KeyCode::ShiftLeft));
        bindings.insert(GameAction::LightAttack, KeyBinding::new(KeyCode::KeyJ));
        bindings.insert(GameAction::HeavyAttack, KeyBinding::new(KeyCode::KeyK));

        Self { bindings }
    }

    /// Get the binding for an action
    pub fn get(&self, action: GameAction) -> Option<&KeyBinding> {
        self.bindings.get(&action)
    }

    /// Set a new binding for an action
    pub fn set(&mut self, action: GameAction, binding: KeyBinding) {
        self.bindings.insert(action, binding);
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Self::create_defaults();
    }

    /// Check if an action is currently held
    pub fn action_pressed(&self, action: GameAction, keyboard: &ButtonInput<KeyCode>) -> bool {
        self.get(action).is_some_and(|binding| {
            keyboard.pressed(binding.primary)
                || binding.secondary.is_some_and(|key| keyboard.pressed(key))
        })
    }

    /// Check if a key is already bound to any action (for conflict detection)
    pub fn is_key_bound(
        &self,
        key: KeyCode,
        exclude_action: Option<GameAction>,
    ) -> Option<GameAction> {
        self.bindings
            .iter()
            .find(|(action, binding)| Some(**action) != exclude_action && binding.matches(key))
            .map(|(action, _)| *action)
    }

    /// Get display string for a binding
    pub fn binding_display(&self, action: GameAction) -> String {
        match self.get(action) {
            Some(binding) => match binding.secondary {
                Some(secondary) => format!("{:?} / {:?}", binding.primary, secondary),
                None => format!("{:?}", binding.primary),
            },
            None => "Unbound".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_has_a_default() {
        let bindings = Keybindings::default();
        for action in GameAction::all() {
            assert!(bindings.get(action).is_some(), "{:?} unbound", action);
        }
    }

    #[test]
    fn test_ron_round_trip_uses_key_names() {
        let bindings = Keybindings::default();
        let text = ron::to_string(&bindings).expect("serializes");
        assert!(text.contains("\"KeyJ\""));
        let back: Keybindings = ron::from_str(&text).expect("deserializes");
        assert_eq!(back, bindings);
    }

    #[test]
    fn test_unknown_key_name_is_rejected() {
        let result: Result<KeyBinding, _> = ron::from_str("(primary: \"NoSuchKey\")");
        assert!(result.is_err());
    }

    #[test]
    fn test_conflict_detection() {
        let bindings = Keybindings::default();
        assert_eq!(bindings.is_key_bound(KeyCode::KeyJ, None), Some(GameAction::LightAttack));
        assert_eq!(bindings.is_key_bound(KeyCode::KeyJ, Some(GameAction::LightAttack)), None);
        assert_eq!(bindings.is_key_bound(KeyCode::F5, None), None);
    }
}
