use bevy::prelude::{GamepadButton, KeyCode, MouseButton, Reflect};
use leafwing_input_manager::prelude::*;

// This is the list of "things in the game I want to be able to do based on input"
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum Action {
    Fire,
    Pause,
}

// Stores "which actions are currently activated"
pub fn create_input_map() -> InputMap<Action> {
    let mut input_map = InputMap::default();

    input_map.insert(Action::Fire, KeyCode::Space);
    input_map.insert(Action::Fire, MouseButton::Left);
    input_map.insert(Action::Fire, GamepadButton::South);

    input_map.insert(Action::Pause, KeyCode::Escape);
    input_map.insert(Action::Pause, KeyCode::KeyP);
    input_map.insert(Action::Pause, GamepadButton::Start);

    input_map
}
