use std::time::Duration;

/// Vertical gravity in meters per second squared (negative is down).
pub const GRAVITY_Y: f32 = -20.0;

/// Duration of one physics step.
///
/// This is the only step length ever handed to the physics pipeline. The accumulator consumes
/// frame time in units of this value and the integration `dt` is derived from it, so the two
/// can never disagree.
pub const FIXED_STEP: Duration = Duration::from_nanos(16_666_667);

/// Maximum number of physics steps run in a single render frame.
///
/// A frame that would need more than this drops the excess simulated time instead of trying to
/// catch up, which would otherwise make every following frame slower still.
pub const MAX_CATCH_UP_STEPS: u32 = 5;

/// Continuous force applied to the player while a movement key is held (newtons).
pub const MOVE_FORCE: f32 = 1200.0;

/// Upward impulse applied on a grounded jump (newton-seconds).
pub const JUMP_IMPULSE: f32 = 300.0;

/// Radians of camera rotation per unit of mouse delta.
pub const LOOK_SENSITIVITY: f32 = 0.004;

/// Mouse deltas with a length at or below this are treated as sensor jitter and ignored.
pub const LOOK_DEADZONE: f32 = 0.5;

/// Pitch is clamped to `[-PITCH_LIMIT, PITCH_LIMIT]` radians so the view never flips.
pub const PITCH_LIMIT: f32 = 1.55;

/// Length of the downward ground probe cast from the player center (meters).
pub const GROUND_RAY_LENGTH: f32 = 50.0;

/// Hit fraction along the ground probe below which the player counts as grounded.
///
/// With [`GROUND_RAY_LENGTH`] this is 1.5m below the player center.
pub const GROUND_EPS: f32 = 0.03;

/// Offset from the player center to the camera eye point (meters).
pub const CAMERA_EYE_HEIGHT: f32 = 0.8;

/// Launch speed of a projectile box along the camera forward (meters per second).
pub const PROJECTILE_SPEED: f32 = 30.0;

/// Distance in front of the camera at which projectile boxes appear (meters).
pub const PROJECTILE_SPAWN_DISTANCE: f32 = 3.0;

/// Mass of a projectile box (kilograms).
pub const PROJECTILE_MASS: f32 = 10.0;

/// Edge length of a projectile box (meters).
pub const PROJECTILE_SIZE: f32 = 0.75;

/// Live projectile cap. Spawning past this despawns the oldest projectile first.
pub const MAX_PROJECTILES: usize = 32;

/// Default collider restitution.
pub const DEFAULT_RESTITUTION: f32 = 0.3;

/// Default collider friction.
pub const DEFAULT_FRICTION: f32 = 1.0;

/// Linear damping on the player body so held movement settles at a walking pace.
pub const PLAYER_LINEAR_DAMPING: f32 = 2.0;
