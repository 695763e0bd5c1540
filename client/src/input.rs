use bevy::{
    input::mouse::AccumulatedMouseMotion,
    prelude::*,
    window::{CursorGrabMode, CursorOptions, PrimaryWindow},
};
use leafwing_input_manager::prelude::*;
use nalgebra::Vector2;
use sim::InputState;

#[derive(Reflect, Actionlike, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputAction {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Spawn,
    Quit,
}

pub(super) fn plugin(app: &mut App) {
    app.add_plugins(InputManagerPlugin::<InputAction>::default());

    app.register_type::<InputAction>();

    app.insert_resource(default_input_map());
    app.insert_resource(ActionState::<InputAction>::default());

    app.add_systems(Startup, grab_cursor);
}

fn default_input_map() -> InputMap<InputAction> {
    let mut input_map = InputMap::<InputAction>::default();
    input_map.insert(InputAction::Forward, KeyCode::KeyW);
    input_map.insert(InputAction::Back, KeyCode::KeyS);
    input_map.insert(InputAction::Left, KeyCode::KeyA);
    input_map.insert(InputAction::Right, KeyCode::KeyD);
    input_map.insert(InputAction::Jump, KeyCode::Space);
    input_map.insert(InputAction::Spawn, KeyCode::KeyX);
    input_map.insert(InputAction::Quit, KeyCode::Escape);
    input_map
}

/// Hide and lock the cursor so mouse motion only turns the camera.
fn grab_cursor(mut cursor: Single<&mut CursorOptions, With<PrimaryWindow>>) {
    cursor.grab_mode = CursorGrabMode::Locked;
    cursor.visible = false;
}

/// Snapshot this frame's input for the simulation.
///
/// Movement and jump report the held state; jump additionally reports its press edge so a tap
/// shorter than one physics step is not lost. Spawn and quit fire on the press only.
pub(super) fn frame_input(
    actions: &ActionState<InputAction>,
    mouse: &AccumulatedMouseMotion,
) -> InputState {
    InputState {
        forward: actions.pressed(&InputAction::Forward),
        back: actions.pressed(&InputAction::Back),
        left: actions.pressed(&InputAction::Left),
        right: actions.pressed(&InputAction::Right),
        jump: actions.pressed(&InputAction::Jump),
        jump_pressed: actions.just_pressed(&InputAction::Jump),
        spawn_pressed: actions.just_pressed(&InputAction::Spawn),
        quit_pressed: actions.just_pressed(&InputAction::Quit),
        mouse_delta: Vector2::new(mouse.delta.x, mouse.delta.y),
    }
}
