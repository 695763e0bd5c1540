/*!
Simulation tuning.

[`SimConfig`] groups every tunable the core reads at runtime. Its `Default` is built from
[`crate::constants`], so code that does not care about tuning can use `SimConfig::default()`
and tests can override single fields with struct update syntax.

Notes
- Distances are in meters, mass in kilograms, time as `Duration`.
- The same `fixed_step` drives both the accumulator and the integrator.
*/

use std::time::Duration;

use nalgebra::Vector3;

use crate::constants::{
    CAMERA_EYE_HEIGHT, FIXED_STEP, GRAVITY_Y, GROUND_EPS, GROUND_RAY_LENGTH, JUMP_IMPULSE,
    LOOK_DEADZONE, LOOK_SENSITIVITY, MAX_CATCH_UP_STEPS, MAX_PROJECTILES, MOVE_FORCE,
    PITCH_LIMIT, PROJECTILE_MASS, PROJECTILE_SIZE, PROJECTILE_SPAWN_DISTANCE, PROJECTILE_SPEED,
};

/// Parameters of the input-to-force translation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ControllerTuning {
    pub move_force: f32,
    pub jump_impulse: f32,
    pub look_sensitivity: f32,
    pub look_deadzone: f32,
    pub pitch_limit: f32,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            move_force: MOVE_FORCE,
            jump_impulse: JUMP_IMPULSE,
            look_sensitivity: LOOK_SENSITIVITY,
            look_deadzone: LOOK_DEADZONE,
            pitch_limit: PITCH_LIMIT,
        }
    }
}

/// Parameters of the ground probe.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GroundProbe {
    /// Length of the downward ray from the player center.
    pub ray_length: f32,
    /// Hit fraction below which the player counts as grounded.
    pub epsilon: f32,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            ray_length: GROUND_RAY_LENGTH,
            epsilon: GROUND_EPS,
        }
    }
}

/// Launched boxes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectileTuning {
    pub speed: f32,
    pub spawn_distance: f32,
    pub mass: f32,
    pub size: f32,
    pub max_live: usize,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: PROJECTILE_SPEED,
            spawn_distance: PROJECTILE_SPAWN_DISTANCE,
            mass: PROJECTILE_MASS,
            size: PROJECTILE_SIZE,
            max_live: MAX_PROJECTILES,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub gravity: Vector3<f32>,
    pub fixed_step: Duration,
    pub max_catch_up_steps: u32,
    pub controller: ControllerTuning,
    pub ground: GroundProbe,
    pub camera_eye_height: f32,
    pub projectile: ProjectileTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: Vector3::new(0.0, GRAVITY_Y, 0.0),
            fixed_step: FIXED_STEP,
            max_catch_up_steps: MAX_CATCH_UP_STEPS,
            controller: ControllerTuning::default(),
            ground: GroundProbe::default(),
            camera_eye_height: CAMERA_EYE_HEIGHT,
            projectile: ProjectileTuning::default(),
        }
    }
}
