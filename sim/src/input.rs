use nalgebra::Vector2;

/// Snapshot of the player's input for one render frame.
///
/// Held flags describe the key state at the end of the frame. `*_pressed` flags are edge
/// triggered: true only on the frame the key went down.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub jump_pressed: bool,
    pub spawn_pressed: bool,
    pub quit_pressed: bool,
    /// Mouse motion since the previous frame, in screen units (+Y is down).
    pub mouse_delta: Vector2<f32>,
}

impl InputState {
    /// Fold the next frame's snapshot into one that may not have been fully consumed.
    ///
    /// Held flags take the newer value. Edge flags and mouse motion accumulate until a physics
    /// tick consumes them, so a frame that runs zero steps does not lose a key press or a look.
    pub fn merge_frame(&mut self, next: InputState) {
        self.forward = next.forward;
        self.back = next.back;
        self.left = next.left;
        self.right = next.right;
        self.jump = next.jump;
        self.jump_pressed |= next.jump_pressed;
        self.spawn_pressed = next.spawn_pressed;
        self.quit_pressed = next.quit_pressed;
        self.mouse_delta += next.mouse_delta;
    }
}
