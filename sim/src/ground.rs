use nalgebra::{Point3, Vector3};
use rapier3d::prelude::RigidBodyHandle;

use crate::{GroundProbe, PhysicsWorld, RayHit, TickHook};

/// Classify a ground probe result. No hit means airborne.
pub fn is_grounded(hit: Option<&RayHit>, epsilon: f32) -> bool {
    hit.is_some_and(|hit| hit.fraction < epsilon)
}

/// Cast the ground probe straight down from `origin`, skipping the caster's own body.
///
/// This is a query only; no body is touched.
pub fn probe_ground<H: TickHook>(
    world: &PhysicsWorld<H>,
    origin: Point3<f32>,
    caster: RigidBodyHandle,
    probe: &GroundProbe,
) -> bool {
    let down = Vector3::new(0.0, -probe.ray_length, 0.0);
    let hit = world.ray_test(origin, down, Some(caster));
    is_grounded(hit.as_ref(), probe.epsilon)
}
