//! Input Sampling
//!
//! Physical devices (gamepads, virtual headless controllers, the keyboard) each write
//! a held-state frame every tick. Sampling turns the frame of whatever source the
//! pairing table gives a slot into a [`CombatantInput`] with press edges.

use bevy::input::gamepad::{Gamepad, GamepadButton};
use bevy::prelude::*;

use crate::keybindings::{GameAction, Keybindings};
use crate::pairing::DevicePairing;
use super::components::{Combatant, CombatantInput, ControlState, GameplayGate};

/// Stick deflection below this is treated as centered.
pub const STICK_DEADZONE: f32 = 0.2;

/// Vertical axis below this counts as holding "down".
pub const DOWN_THRESHOLD: f32 = -0.5;

/// Digital buttons of an input source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub jump: bool,
    pub dash: bool,
    pub light: bool,
    pub heavy: bool,
}

impl Buttons {
    fn or(self, other: Buttons) -> Buttons {
        Buttons {
            jump: self.jump || other.jump,
            dash: self.dash || other.dash,
            light: self.light || other.light,
            heavy: self.heavy || other.heavy,
        }
    }

    /// Buttons held now but not in `previous`.
    fn pressed_since(self, previous: Buttons) -> Buttons {
        Buttons {
            jump: self.jump && !previous.jump,
            dash: self.dash && !previous.dash,
            light: self.light && !previous.light,
            heavy: self.heavy && !previous.heavy,
        }
    }
}

/// Held state of one input source this tick and last tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub axis: Vec2,
    pub held: Buttons,
    pub previous: Buttons,
}

impl InputFrame {
    /// Start a new tick: what was held becomes the previous state.
    pub fn roll(&mut self) {
        self.previous = self.held;
    }

    pub fn set(&mut self, axis: Vec2, held: Buttons) {
        self.axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
        self.held = held;
    }

    pub fn pressed(&self) -> Buttons {
        self.held.pressed_since(self.previous)
    }

    /// Combine two sources held by the same player.
    pub fn merge(&self, other: &InputFrame) -> InputFrame {
        InputFrame {
            axis: (self.axis + other.axis).clamp(Vec2::NEG_ONE, Vec2::ONE),
            held: self.held.or(other.held),
            previous: self.previous.or(other.previous),
        }
    }

    pub fn to_combatant_input(&self) -> CombatantInput {
        let pressed = self.pressed();
        CombatantInput {
            axis: self.axis,
            down: self.axis.y <= DOWN_THRESHOLD,
            jump_pressed: pressed.jump,
            dash_pressed: pressed.dash,
            light_pressed: pressed.light,
            heavy_pressed: pressed.heavy,
        }
    }
}

/// Input frame of a controller entity (a gamepad or a headless virtual controller).
#[derive(Component, Debug, Clone, Default)]
pub struct ControllerFrame(pub InputFrame);

/// Input frame of the keyboard fallback.
#[derive(Resource, Debug, Clone, Default)]
pub struct KeyboardFrame(pub InputFrame);

/// Shift every frame's held state into its previous state.
pub fn roll_input_frames(
    mut controllers: Query<&mut ControllerFrame>,
    mut keyboard: ResMut<KeyboardFrame>,
) {
    for mut frame in controllers.iter_mut() {
        frame.0.roll();
    }
    keyboard.0.roll();
}

fn deadzone(value: f32) -> f32 {
    if value.abs() < STICK_DEADZONE {
        0.0
    } else {
        value
    }
}

/// Read connected gamepads into their controller frames.
pub fn read_gamepads(mut gamepads: Query<(&Gamepad, &mut ControllerFrame)>) {
    for (gamepad, mut frame) in gamepads.iter_mut() {
        let stick = gamepad.left_stick();
        let dpad = gamepad.dpad();
        let axis = Vec2::new(deadzone(stick.x) + dpad.x, deadzone(stick.y) + dpad.y);
        let held = Buttons {
            jump: gamepad.pressed(GamepadButton::South),
            dash: gamepad.pressed(GamepadButton::RightTrigger)
                || gamepad.pressed(GamepadButton::LeftTrigger),
            light: gamepad.pressed(GamepadButton::West),
            heavy: gamepad.pressed(GamepadButton::North),
        };
        frame.0.set(axis, held);
    }
}

/// Read the keyboard into the fallback frame.
pub fn read_keyboard(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<Keybindings>,
    mut frame: ResMut<KeyboardFrame>,
) {
    let held = |action| bindings.action_pressed(action, &keys);
    let mut axis = Vec2::ZERO;
    if held(GameAction::MoveLeft) {
        axis.x -= 1.0;
    }
    if held(GameAction::MoveRight) {
        axis.x += 1.0;
    }
    if held(GameAction::Down) {
        axis.y -= 1.0;
    }
    let buttons = Buttons {
        jump: held(GameAction::Jump),
        dash: held(GameAction::Dash),
        light: held(GameAction::LightAttack),
        heavy: held(GameAction::HeavyAttack),
    };
    frame.0.set(axis, buttons);
}

/// Fill each combatant's [`CombatantInput`] from its paired source.
pub fn sample_combatant_input(
    gate: Res<GameplayGate>,
    pairing: Res<DevicePairing>,
    keyboard: Res<KeyboardFrame>,
    controllers: Query<&ControllerFrame>,
    mut combatants: Query<(&Combatant, &mut CombatantInput)>,
) {
    for (combatant, mut input) in combatants.iter_mut() {
        if combatant.control == ControlState::Inert || !gate.enabled {
            *input = CombatantInput::default();
            continue;
        }

        let controller = pairing
            .controller_for(combatant.slot)
            .and_then(|entity| controllers.get(entity).ok())
            .map(|frame| frame.0);
        let keyboard = pairing
            .has_keyboard_fallback(combatant.slot)
            .then_some(keyboard.0);

        let frame = match (controller, keyboard) {
            (Some(pad), Some(keys)) => pad.merge(&keys),
            (Some(pad), None) => pad,
            (None, Some(keys)) => keys,
            (None, None) => InputFrame::default(),
        };
        *input = frame.to_combatant_input();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_edge_only_on_first_tick() {
        let mut frame = InputFrame::default();
        let jump = Buttons { jump: true, ..default() };

        frame.roll();
        frame.set(Vec2::ZERO, jump);
        assert!(frame.to_combatant_input().jump_pressed);

        frame.roll();
        frame.set(Vec2::ZERO, jump);
        assert!(!frame.to_combatant_input().jump_pressed);
    }

    #[test]
    fn test_down_from_axis() {
        let mut frame = InputFrame::default();
        frame.set(Vec2::new(0.0, -1.0), Buttons::default());
        assert!(frame.to_combatant_input().down);
        frame.set(Vec2::new(0.0, -0.3), Buttons::default());
        assert!(!frame.to_combatant_input().down);
    }

    #[test]
    fn test_merge_clamps_axis_and_ors_buttons() {
        let mut pad = InputFrame::default();
        pad.set(Vec2::new(1.0, 0.0), Buttons { light: true, ..default() });
        let mut keys = InputFrame::default();
        keys.set(Vec2::new(1.0, -1.0), Buttons { heavy: true, ..default() });

        let merged = pad.merge(&keys).to_combatant_input();
        assert_eq!(merged.axis, Vec2::new(1.0, -1.0));
        assert!(merged.light_pressed && merged.heavy_pressed);
    }
}
