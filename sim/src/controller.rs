//! Input-to-force translation for the controlled entity.
//!
//! [`PlayerController`] is the world's [`TickHook`]: it runs once per physics step, reads the
//! frame's [`InputState`] and the camera, and pushes the player's body around with central
//! forces and impulses. Running per step rather than per frame keeps the applied force in
//! lockstep with the number of steps actually integrated.

use nalgebra::Vector3;
use rapier3d::prelude::{RigidBody, RigidBodyHandle, RigidBodySet};

use crate::{CameraRig, ControllerTuning, InputState, TickHook};

/// Everything the controller reads or updates from outside the physics world.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TickState {
    pub input: InputState,
    pub camera: CameraRig,
    /// Written once per frame by the ground probe; gates jumping.
    pub grounded: bool,
}

/// Receiver of the controller's output.
pub trait ForceTarget {
    fn add_central_force(&mut self, force: Vector3<f32>);
    fn apply_central_impulse(&mut self, impulse: Vector3<f32>);
}

impl ForceTarget for RigidBody {
    fn add_central_force(&mut self, force: Vector3<f32>) {
        self.add_force(force, true);
    }

    fn apply_central_impulse(&mut self, impulse: Vector3<f32>) {
        self.apply_impulse(impulse, true);
    }
}

#[derive(Clone, Debug)]
pub struct PlayerController {
    body: RigidBodyHandle,
    tuning: ControllerTuning,
    jump_was_held: bool,
}

impl PlayerController {
    pub fn new(body: RigidBodyHandle, tuning: ControllerTuning) -> Self {
        Self {
            body,
            tuning,
            jump_was_held: false,
        }
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn set_body(&mut self, body: RigidBodyHandle) {
        self.body = body;
    }

    pub fn tuning(&self) -> &ControllerTuning {
        &self.tuning
    }

    /// Apply mouse look, consuming the accumulated delta.
    ///
    /// When a frame runs several steps only the first sees the motion.
    pub fn look(&self, state: &mut TickState) {
        let delta = std::mem::take(&mut state.input.mouse_delta);
        if delta.norm() > self.tuning.look_deadzone {
            state
                .camera
                .look(delta, self.tuning.look_sensitivity, self.tuning.pitch_limit);
        }
    }

    /// Translate held keys into forces and a jump edge into an impulse.
    ///
    /// Forward beats back and left beats right when both of a pair are held.
    pub fn drive<B: ForceTarget>(&mut self, state: &mut TickState, body: &mut B) {
        let input = &mut state.input;
        let force = self.tuning.move_force;

        if let Some(forward) = horizontal(state.camera.forward()) {
            if input.forward {
                body.add_central_force(forward * force);
            } else if input.back {
                body.add_central_force(-forward * force);
            }
        }

        if let Some(right) = horizontal(state.camera.right()) {
            if input.left {
                body.add_central_force(-right * force);
            } else if input.right {
                body.add_central_force(right * force);
            }
        }

        let pressed = std::mem::take(&mut input.jump_pressed);
        let jump = pressed || (input.jump && !self.jump_was_held);
        self.jump_was_held = input.jump;

        if jump && state.grounded {
            body.apply_central_impulse(Vector3::new(0.0, self.tuning.jump_impulse, 0.0));
        }
    }
}

impl TickHook for PlayerController {
    type State = TickState;

    fn on_tick(&mut self, state: &mut TickState, bodies: &mut RigidBodySet, _dt: f32) {
        self.look(state);
        match bodies.get_mut(self.body) {
            Some(body) => self.drive(state, body),
            None => self.jump_was_held = state.input.jump,
        }
    }
}

/// Project onto the XZ plane and normalize. `None` if the vector is (nearly) vertical.
fn horizontal(v: Vector3<f32>) -> Option<Vector3<f32>> {
    Vector3::new(v.x, 0.0, v.z).try_normalize(1.0e-6)
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector2};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        forces: Vec<Vector3<f32>>,
        impulses: Vec<Vector3<f32>>,
    }

    impl ForceTarget for Recorder {
        fn add_central_force(&mut self, force: Vector3<f32>) {
            self.forces.push(force);
        }

        fn apply_central_impulse(&mut self, impulse: Vector3<f32>) {
            self.impulses.push(impulse);
        }
    }

    fn controller() -> PlayerController {
        PlayerController::new(RigidBodyHandle::invalid(), ControllerTuning::default())
    }

    fn state(input: InputState, grounded: bool) -> TickState {
        TickState {
            input,
            camera: CameraRig::new(Point3::origin(), 0.0, -0.6),
            grounded,
        }
    }

    #[test]
    fn forward_force_is_horizontal_and_scaled() {
        let mut c = controller();
        let mut s = state(
            InputState {
                forward: true,
                ..Default::default()
            },
            true,
        );
        let mut body = Recorder::default();
        c.drive(&mut s, &mut body);

        let force = c.tuning().move_force;
        assert_eq!(body.forces.len(), 1);
        assert!((body.forces[0] - Vector3::new(0.0, 0.0, -force)).norm() < 1.0e-3);
    }

    #[test]
    fn forward_wins_over_back_and_left_wins_over_right() {
        let mut c = controller();
        let mut s = state(
            InputState {
                forward: true,
                back: true,
                left: true,
                right: true,
                ..Default::default()
            },
            true,
        );
        let mut body = Recorder::default();
        c.drive(&mut s, &mut body);

        let force = c.tuning().move_force;
        assert_eq!(body.forces.len(), 2);
        assert!((body.forces[0] - Vector3::new(0.0, 0.0, -force)).norm() < 1.0e-3);
        assert!((body.forces[1] - Vector3::new(-force, 0.0, 0.0)).norm() < 1.0e-3);
    }

    #[test]
    fn back_force_is_negated_forward() {
        let mut c = controller();
        let mut s = state(
            InputState {
                back: true,
                ..Default::default()
            },
            true,
        );
        let mut body = Recorder::default();
        c.drive(&mut s, &mut body);

        assert!((body.forces[0] - Vector3::new(0.0, 0.0, c.tuning().move_force)).norm() < 1.0e-3);
    }

    #[test]
    fn holding_jump_for_five_steps_applies_one_impulse() {
        let mut c = controller();
        let mut s = state(
            InputState {
                jump: true,
                jump_pressed: true,
                ..Default::default()
            },
            true,
        );
        let mut body = Recorder::default();
        for _ in 0..5 {
            c.drive(&mut s, &mut body);
        }

        assert_eq!(body.impulses.len(), 1);
        assert!((body.impulses[0].y - c.tuning().jump_impulse).abs() < 1.0e-6);
    }

    #[test]
    fn held_key_without_frame_edge_still_triggers_once() {
        let mut c = controller();
        let mut s = state(
            InputState {
                jump: true,
                ..Default::default()
            },
            true,
        );
        let mut body = Recorder::default();
        for _ in 0..5 {
            c.drive(&mut s, &mut body);
        }
        assert_eq!(body.impulses.len(), 1);

        // Release, then press again.
        s.input.jump = false;
        c.drive(&mut s, &mut body);
        s.input.jump = true;
        c.drive(&mut s, &mut body);
        assert_eq!(body.impulses.len(), 2);
    }

    #[test]
    fn jump_is_ignored_while_airborne() {
        let mut c = controller();
        let mut s = state(
            InputState {
                jump: true,
                jump_pressed: true,
                ..Default::default()
            },
            false,
        );
        let mut body = Recorder::default();
        c.drive(&mut s, &mut body);
        s.grounded = true;
        c.drive(&mut s, &mut body);

        assert!(body.impulses.is_empty());
    }

    #[test]
    fn mouse_jitter_inside_deadzone_is_ignored() {
        let c = controller();
        let mut s = state(
            InputState {
                mouse_delta: Vector2::new(0.3, 0.3),
                ..Default::default()
            },
            true,
        );
        let before = s.camera;
        c.look(&mut s);

        assert_eq!(s.camera, before);
        assert_eq!(s.input.mouse_delta, Vector2::zeros());
    }

    #[test]
    fn mouse_delta_is_applied_once_per_frame() {
        let c = controller();
        let mut s = state(
            InputState {
                mouse_delta: Vector2::new(10.0, 0.0),
                ..Default::default()
            },
            true,
        );
        c.look(&mut s);
        let after_first = s.camera;
        c.look(&mut s);

        let expected_yaw = -10.0 * c.tuning().look_sensitivity;
        assert!((after_first.yaw - expected_yaw).abs() < 1.0e-6);
        assert_eq!(s.camera, after_first);
    }

    #[test]
    fn missing_body_still_tracks_jump_edge() {
        let mut c = controller();
        let mut bodies = RigidBodySet::new();
        let mut s = state(
            InputState {
                jump: true,
                ..Default::default()
            },
            true,
        );
        c.on_tick(&mut s, &mut bodies, 0.016);
        assert!(c.jump_was_held);
    }
}
